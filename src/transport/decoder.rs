use crate::types::constants::{MAX_FRAME_BYTES, stream_events};
use crate::types::{LiveChannelError, Result, SseFrame};

/// Incremental `text/event-stream` decoder.
///
/// Bytes can be fed in chunks of any size; a chunk boundary may fall inside a line, inside a
/// multi-byte character or between the `\r` and `\n` of a CRLF terminator.
#[derive(Debug)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: String,
    last_event_id: Option<String>,
    max_frame_bytes: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::with_limit(MAX_FRAME_BYTES)
    }

    /// Decoder that rejects lines and event payloads longer than `max_frame_bytes`
    pub fn with_limit(max_frame_bytes: usize) -> Self {
        Self {
            buffer: Vec::new(),
            event: None,
            data: String::new(),
            last_event_id: None,
            max_frame_bytes,
        }
    }

    /// Feeds a chunk and returns every frame completed by it.
    ///
    /// # Errors
    ///
    /// Returns [`LiveChannelError::FrameTooLarge`] once an unterminated line or an
    /// undispatched event grows past the limit; the decoder should then be discarded.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<SseFrame>> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n' || b == b'\r') {
            let terminator_len = if self.buffer[pos] == b'\r' {
                match self.buffer.get(pos + 1) {
                    Some(b'\n') => 2,
                    Some(_) => 1,
                    // Wait for the next chunk to know whether this is a CRLF.
                    None => break,
                }
            } else {
                1
            };

            let line: Vec<u8> = self.buffer.drain(..pos + terminator_len).collect();
            let line = String::from_utf8_lossy(&line[..pos]).into_owned();
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }

        if self.buffer.len() > self.max_frame_bytes || self.data.len() > self.max_frame_bytes {
            return Err(LiveChannelError::FrameTooLarge(self.max_frame_bytes));
        }
        Ok(frames)
    }

    /// Last event id seen on the stream, if any
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "id" if !value.contains('\0') => {
                self.last_event_id = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            // `retry` is ignored: reconnect timing is owned by the channel's backoff.
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }

        let mut data = std::mem::take(&mut self.data);
        data.pop();

        Some(SseFrame {
            event: event
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| stream_events::MESSAGE.to_string()),
            data,
            id: self.last_event_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_event() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"event: notification\ndata: {\"id\":1}\n\n").unwrap();
        assert_eq!(frames, vec![SseFrame::new("notification", "{\"id\":1}")]);
    }

    #[test]
    fn test_unnamed_event_defaults_to_message() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"data: hello\n\n").unwrap();
        assert_eq!(frames, vec![SseFrame::new("message", "hello")]);
    }

    #[test]
    fn test_multiline_data_is_joined() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"data: first\ndata:second\ndata\n\n").unwrap();
        assert_eq!(frames[0].data, "first\nsecond\n");
    }

    #[test]
    fn test_chunk_boundaries_anywhere() {
        let input = "event: heartbeat\r\ndata: {\"timestamp\": 1}\r\n\r\nevent: notification\r\ndata: caf\u{e9}\r\n\r\n";
        let mut decoder = SseDecoder::new();
        let mut frames = Vec::new();
        for byte in input.as_bytes() {
            frames.extend(decoder.feed(std::slice::from_ref(byte)).unwrap());
        }

        assert_eq!(
            frames,
            vec![
                SseFrame::new("heartbeat", "{\"timestamp\": 1}"),
                SseFrame::new("notification", "caf\u{e9}"),
            ]
        );
    }

    #[test]
    fn test_bare_cr_line_endings() {
        let mut decoder = SseDecoder::new();
        let mut frames = decoder.feed(b"event: heartbeat\rdata: x\r\r").unwrap();
        // The final CR may still be the start of a CRLF.
        frames.extend(decoder.feed(b"data: y\n\n").unwrap());
        assert_eq!(
            frames,
            vec![
                SseFrame::new("heartbeat", "x"),
                SseFrame::new("message", "y")
            ]
        );
    }

    #[test]
    fn test_comments_and_empty_frames_are_skipped() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b": keep-alive\n\nevent: heartbeat\n\n").unwrap();
        assert!(frames.is_empty());

        // The pending event name does not leak into the next frame.
        let frames = decoder.feed(b"data: z\n\n").unwrap();
        assert_eq!(frames, vec![SseFrame::new("message", "z")]);
    }

    #[test]
    fn test_event_id_persists_across_frames() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"id: 41\ndata: a\n\ndata: b\n\nid\ndata: c\n\n").unwrap();
        assert_eq!(frames[0].id.as_deref(), Some("41"));
        assert_eq!(frames[1].id.as_deref(), Some("41"));
        assert_eq!(frames[2].id, None);
        assert_eq!(decoder.last_event_id(), None);
    }

    #[test]
    fn test_unknown_fields_and_retry_are_ignored() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"retry: 5000\nfoo: bar\ndata: ok\n\n").unwrap();
        assert_eq!(frames, vec![SseFrame::new("message", "ok")]);
    }

    #[test]
    fn test_unterminated_line_is_bounded() {
        let mut decoder = SseDecoder::with_limit(16);
        assert!(decoder.feed(b"data: 0123456").unwrap().is_empty());

        let err = decoder.feed(b"789abcdef").unwrap_err();
        assert!(matches!(err, LiveChannelError::FrameTooLarge(16)));
    }

    #[test]
    fn test_undispatched_event_is_bounded() {
        let mut decoder = SseDecoder::with_limit(16);
        assert!(decoder.feed(b"data: 12345678\n").unwrap().is_empty());

        let err = decoder.feed(b"data: 12345678\n").unwrap_err();
        assert!(matches!(err, LiveChannelError::FrameTooLarge(16)));
    }

    #[test]
    fn test_frames_within_limit_pass() {
        let mut decoder = SseDecoder::with_limit(16);
        let frames = decoder.feed(b"data: 12345678\n\ndata: abc\n\n").unwrap();
        assert_eq!(
            frames,
            vec![SseFrame::new("message", "12345678"), SseFrame::new("message", "abc")]
        );
    }
}
