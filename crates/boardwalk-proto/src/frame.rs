use bytes::{Buf, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Two-byte terminator appended to every outbound frame. Inbound frames are
/// delimited by JSON value boundaries alone; the terminator is tolerated as
/// interstitial whitespace.
pub const FRAME_TERMINATOR: &[u8] = b"\r\n";

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("error encoding frame json: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("error decoding frame json: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Serialize one value as a wire frame: compact JSON plus `\r\n`.
pub fn encode_frame<T: Serialize>(value: &T) -> Result<Vec<u8>, FrameError> {
    let mut frame = serde_json::to_vec(value).map_err(FrameError::Encode)?;
    frame.extend_from_slice(FRAME_TERMINATOR);
    Ok(frame)
}

/// Accumulates raw transport bytes and yields exactly one JSON value per
/// call, leaving the cursor immediately after it. Frames may arrive
/// back-to-back or split at arbitrary byte boundaries.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: BytesMut,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes read from the transport.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Decode the next complete frame, if the buffer holds one.
    ///
    /// `Ok(None)` means more bytes are needed. A malformed frame is an
    /// immediate error, never skipped: misaligned framing poisons every
    /// frame behind it.
    pub fn next_frame<T: DeserializeOwned>(&mut self) -> Result<Option<T>, FrameError> {
        while let Some(&byte) = self.buf.first() {
            if byte == b'\r' || byte == b'\n' || byte == b' ' || byte == b'\t' {
                self.buf.advance(1);
            } else {
                break;
            }
        }
        if self.buf.is_empty() {
            return Ok(None);
        }

        let mut stream = serde_json::Deserializer::from_slice(&self.buf[..]).into_iter::<T>();
        let item = stream.next();
        let consumed = stream.byte_offset();
        drop(stream);

        match item {
            Some(Ok(value)) => {
                self.buf.advance(consumed);
                Ok(Some(value))
            }
            Some(Err(err)) if err.is_eof() => Ok(None),
            Some(Err(err)) => Err(FrameError::Decode(err)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn encode_appends_crlf() {
        let frame = encode_frame(&json!({"a": 1})).expect("encode");
        assert!(frame.ends_with(b"\r\n"));
        let value: Value = serde_json::from_slice(&frame[..frame.len() - 2]).expect("roundtrip");
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn decodes_back_to_back_frames_one_per_call() {
        let mut frames = FrameBuffer::new();
        frames.extend(b"{\"n\":1}\r\n{\"n\":2}\r\n{\"n\":3}");

        for expected in 1..=3 {
            let value: Value = frames
                .next_frame()
                .expect("decode")
                .expect("complete frame");
            assert_eq!(value["n"], expected);
        }
        assert!(frames.next_frame::<Value>().expect("decode").is_none());
    }

    #[test]
    fn partial_frames_wait_for_more_bytes() {
        let wire = b"{\"key\":\"value\"}\r\n";
        let mut frames = FrameBuffer::new();
        // Everything up to, but not including, the closing brace.
        frames.extend(&wire[..14]);
        assert!(frames.next_frame::<Value>().expect("decode").is_none());
        frames.extend(&wire[14..]);
        let value: Value = frames.next_frame().expect("decode").expect("frame");
        assert_eq!(value["key"], "value");
    }

    #[test]
    fn byte_at_a_time_delivery_never_errors() {
        let wire = b"{\"n\":1}\r\n{\"n\":2}\r\n";
        let mut frames = FrameBuffer::new();
        let mut seen = Vec::new();
        for byte in wire.iter() {
            frames.extend(std::slice::from_ref(byte));
            while let Some(value) = frames.next_frame::<Value>().expect("decode") {
                seen.push(value["n"].as_i64().expect("n"));
            }
        }
        assert_eq!(seen, [1, 2]);
    }

    #[test]
    fn malformed_bytes_error_immediately() {
        let mut frames = FrameBuffer::new();
        frames.extend(b"not json\r\n");
        assert!(matches!(
            frames.next_frame::<Value>(),
            Err(FrameError::Decode(_))
        ));
    }

    #[test]
    fn leading_terminators_are_skipped() {
        let mut frames = FrameBuffer::new();
        frames.extend(b"\r\n\r\n{\"ok\":true}\r\n");
        let value: Value = frames.next_frame().expect("decode").expect("frame");
        assert_eq!(value["ok"], true);
        assert!(frames.next_frame::<Value>().expect("decode").is_none());
    }
}
