//! Speech synthesis request descriptors

/// Default synthesis endpoint
pub const DEFAULT_TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";
/// Source language of every request
pub const SPEECH_LANGUAGE: &str = "ja";
/// Appended after the encoded text; the endpoint clips very short inputs without it
pub const TRAILING_TERMINATORS: &str = "。。。。。。。。。。";

const INPUT_ENCODING: &str = "UTF-8";
const CLIENT: &str = "tw-ob";

/// A fetchable audio source for one chat message.
///
/// Building one performs no I/O; the voice connection fetches it on play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    url: String,
    query_text: String,
}

impl SpeechRequest {
    /// Full GET URL of the audio stream
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Value of the `q` parameter: encoded text plus the trailing terminators
    pub fn query_text(&self) -> &str {
        &self.query_text
    }
}

/// Builds [`SpeechRequest`]s against one endpoint
#[derive(Debug, Clone)]
pub struct SpeechRequestBuilder {
    endpoint: String,
}

impl Default for SpeechRequestBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TTS_ENDPOINT)
    }
}

impl SpeechRequestBuilder {
    /// Create a builder for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint base URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Describe the synthesis of already-sanitized `text`
    pub fn build(&self, text: &str) -> SpeechRequest {
        let query_text = format!("{}{}", urlencoding::encode(text), TRAILING_TERMINATORS);
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{}ie={}&client={}&tl={}&q={}",
            self.endpoint, separator, INPUT_ENCODING, CLIENT, SPEECH_LANGUAGE, query_text
        );
        SpeechRequest { url, query_text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminators_follow_encoded_text() {
        let request = SpeechRequestBuilder::default().build("a b");
        assert_eq!(request.query_text(), "a%20b。。。。。。。。。。");
        assert!(request.query_text().ends_with(&"。".repeat(10)));
    }

    #[test]
    fn test_non_ascii_is_percent_encoded() {
        let request = SpeechRequestBuilder::default().build("あ");
        assert_eq!(request.query_text(), "%E3%81%82。。。。。。。。。。");
    }

    #[test]
    fn test_url_parameters() {
        let request = SpeechRequestBuilder::default().build("hi&bye");
        assert_eq!(
            request.url(),
            "https://translate.google.com/translate_tts?ie=UTF-8&client=tw-ob&tl=ja&q=hi%26bye。。。。。。。。。。"
        );
    }

    #[test]
    fn test_endpoint_with_existing_query() {
        let request = SpeechRequestBuilder::new("http://localhost/tts?key=1").build("x");
        assert!(request.url().starts_with("http://localhost/tts?key=1&ie=UTF-8"));
    }
}
