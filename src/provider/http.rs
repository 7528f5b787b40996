//! Shared HTTP client, SSE parsing, and auth utilities.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::PhiloError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
///
/// Per-request timeouts are set by each provider.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Parse an SSE "data:" line, returning None for "[DONE]".
pub fn parse_sse_data(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        return None;
    }
    Some(data)
}

/// Splits a byte stream into SSE lines.
///
/// Bytes are buffered until a full line is available, so a multi-byte
/// character split across network chunks is decoded whole.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    bytes: Vec<u8>,
}

impl SseLineBuffer {
    pub fn push(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    /// Next complete line, trimmed. `None` until a `\n` arrives.
    pub fn next_line(&mut self) -> Option<Result<String, PhiloError>> {
        let end = self.bytes.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.bytes.drain(..=end).collect();
        Some(decode_line(&line[..end]))
    }

    /// Whatever is left once the byte stream has ended.
    pub fn finish(&mut self) -> Option<Result<String, PhiloError>> {
        if self.bytes.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.bytes);
        Some(decode_line(&rest))
    }
}

fn decode_line(bytes: &[u8]) -> Result<String, PhiloError> {
    std::str::from_utf8(bytes)
        .map(|line| line.trim().to_string())
        .map_err(|e| PhiloError::Stream(format!("invalid UTF-8 in event stream: {e}")))
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> PhiloError {
    match status {
        401 | 403 => PhiloError::Authentication(body.to_string()),
        429 => PhiloError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => PhiloError::api(status, body),
    }
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_data_lines_are_unwrapped() {
        assert_eq!(parse_sse_data("data: {\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(parse_sse_data("data:{\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(parse_sse_data("data: [DONE]"), None);
        assert_eq!(parse_sse_data("event: ping"), None);
    }

    #[test]
    fn rate_limit_body_yields_retry_after() {
        let err = status_to_error(429, r#"{"error":{"retry_after":1.5}}"#);
        assert!(matches!(
            err,
            PhiloError::RateLimited {
                retry_after_ms: Some(1500)
            }
        ));
    }

    #[test]
    fn auth_statuses_map_to_authentication() {
        assert!(matches!(status_to_error(401, "nope"), PhiloError::Authentication(_)));
        assert!(matches!(status_to_error(500, "boom"), PhiloError::Api { status: 500, .. }));
    }

    #[test]
    fn line_buffer_joins_characters_split_across_chunks() {
        let line = "data: S\u{f3}crates\n".as_bytes();
        let split = line.iter().position(|b| *b == 0xC3).unwrap() + 1;

        let mut buffer = SseLineBuffer::default();
        buffer.push(&line[..split]);
        assert!(buffer.next_line().is_none());
        buffer.push(&line[split..]);

        assert_eq!(buffer.next_line().unwrap().unwrap(), "data: Sócrates");
        assert!(buffer.next_line().is_none());
        assert!(buffer.finish().is_none());
    }

    #[test]
    fn line_buffer_returns_unterminated_tail_on_finish() {
        let mut buffer = SseLineBuffer::default();
        buffer.push(b"data: one\r\ndata: two");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "data: one");
        assert!(buffer.next_line().is_none());
        assert_eq!(buffer.finish().unwrap().unwrap(), "data: two");
        assert!(buffer.finish().is_none());
    }

    #[test]
    fn line_buffer_rejects_invalid_utf8() {
        let mut buffer = SseLineBuffer::default();
        buffer.push(&[b'd', 0xFF, b'\n']);
        assert!(matches!(buffer.next_line(), Some(Err(PhiloError::Stream(_)))));
    }
}
