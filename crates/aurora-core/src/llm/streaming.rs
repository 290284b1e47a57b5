//! Streaming response support
//!
//! Server-Sent Events (SSE) parsing for `streamGenerateContent?alt=sse`. Each
//! `data:` line carries a complete [`GenerateContentResponse`] JSON object.

use std::fmt;

use super::types::GenerateContentResponse;

/// Text substituted for a failed stream
pub const STREAM_ERROR_SENTINEL: &str = " [Error generating stream]";

/// A fragment produced by a generation stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFragment {
    /// Incremental answer text
    Text(String),
    /// The stream failed; always the last fragment
    Failed(String),
}

impl StreamFragment {
    /// Text to display: the fragment itself, or the sentinel on failure
    pub fn as_text(&self) -> &str {
        match self {
            StreamFragment::Text(text) => text,
            StreamFragment::Failed(_) => STREAM_ERROR_SENTINEL,
        }
    }

    /// Check if this fragment terminates a failed stream
    pub fn is_error(&self) -> bool {
        matches!(self, StreamFragment::Failed(_))
    }

    /// Consume into display text
    pub fn into_text(self) -> String {
        match self {
            StreamFragment::Text(text) => text,
            StreamFragment::Failed(_) => STREAM_ERROR_SENTINEL.to_string(),
        }
    }
}

impl fmt::Display for StreamFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}

/// Event from SSE line parsing
#[derive(Debug, Clone)]
pub enum SseEvent {
    /// A response chunk was received
    Chunk(GenerateContentResponse),
    /// Error parsing chunk
    Error(String),
}

/// Parse a Server-Sent Events line into an SseEvent
pub fn parse_sse_line(line: &str) -> Option<SseEvent> {
    let line = line.trim();

    // Skip empty lines, comments and non-data fields
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() {
        return None;
    }

    match serde_json::from_str::<GenerateContentResponse>(data) {
        Ok(GenerateContentResponse {
            error: Some(error), ..
        }) => Some(SseEvent::Error(format!("Service error: {}", error))),
        Ok(chunk) => Some(SseEvent::Chunk(chunk)),
        Err(e) => Some(SseEvent::Error(format!("Failed to parse chunk: {}", e))),
    }
}

/// Accumulates body bytes and hands out complete lines.
///
/// Bytes are kept until a newline arrives so multi-byte characters split
/// across network chunks decode correctly.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes and drain every complete line
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
        }
        lines
    }

    /// Remaining bytes once the body has ended
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        let rest = String::from_utf8_lossy(&rest).into_owned();
        if rest.trim().is_empty() { None } else { Some(rest) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sse_content_chunk() {
        let line = r#"data: {"candidates":[{"content":{"role":"model","parts":[{"text":"Hello"}]}}],"modelVersion":"gemini-2.5-flash"}"#;

        match parse_sse_line(line).unwrap() {
            SseEvent::Chunk(chunk) => {
                assert_eq!(chunk.text().as_deref(), Some("Hello"));
                assert_eq!(chunk.model_version.as_deref(), Some("gemini-2.5-flash"));
            }
            _ => panic!("Expected Chunk event"),
        }
    }

    #[test]
    fn test_parse_sse_crlf_and_no_space() {
        let line = "data:{\"candidates\":[]}\r";
        assert!(matches!(parse_sse_line(line), Some(SseEvent::Chunk(_))));
    }

    #[test]
    fn test_parse_sse_empty_line() {
        assert!(parse_sse_line("").is_none());
        assert!(parse_sse_line("   ").is_none());
        assert!(parse_sse_line("data:").is_none());
    }

    #[test]
    fn test_parse_sse_comment_and_other_fields() {
        assert!(parse_sse_line(": keep-alive").is_none());
        assert!(parse_sse_line("event: message").is_none());
    }

    #[test]
    fn test_parse_sse_malformed() {
        let event = parse_sse_line("data: {not json").unwrap();
        assert!(matches!(event, SseEvent::Error(_)));
    }

    #[test]
    fn test_parse_sse_error_event() {
        let line = r#"data: {"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#;
        match parse_sse_line(line).unwrap() {
            SseEvent::Error(msg) => {
                assert!(msg.contains("The model is overloaded."));
                assert!(msg.contains("503"));
            }
            _ => panic!("Expected Error event"),
        }
    }

    #[test]
    fn test_line_buffer_splits_across_chunks() {
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.push(b"data: {\"a\"").is_empty());
        let lines = buffer.push(b":1}\r\n\r\ndata: x");
        assert_eq!(lines, vec!["data: {\"a\":1}\r".to_string(), "\r".to_string()]);
        assert_eq!(buffer.finish().as_deref(), Some("data: x"));
        assert!(buffer.finish().is_none());
    }

    #[test]
    fn test_line_buffer_keeps_split_utf8() {
        let mut buffer = SseLineBuffer::new();
        let text = "data: é\n".as_bytes();
        assert!(buffer.push(&text[..7]).is_empty());
        let lines = buffer.push(&text[7..]);
        assert_eq!(lines, vec!["data: é".to_string()]);
    }

    #[test]
    fn test_fragment_text() {
        let ok = StreamFragment::Text("Hi".to_string());
        assert_eq!(ok.as_text(), "Hi");
        assert!(!ok.is_error());

        let failed = StreamFragment::Failed("boom".to_string());
        assert_eq!(failed.as_text(), STREAM_ERROR_SENTINEL);
        assert_eq!(failed.to_string(), " [Error generating stream]");
        assert!(failed.is_error());
    }
}
