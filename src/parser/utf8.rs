//! Streaming UTF-8 decoding
//!
//! Raw terminal output arrives in arbitrary byte chunks, so a multi-byte
//! character can straddle two reads. `Utf8Stream` holds back an incomplete
//! trailing sequence until the next chunk and replaces invalid bytes with
//! U+FFFD.

/// Incremental UTF-8 decoder
#[derive(Debug, Clone, Default)]
pub struct Utf8Stream {
    /// Bytes of an incomplete trailing sequence (at most 3)
    pending: Vec<u8>,
}

impl Utf8Stream {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if decoder is holding part of a character
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Decode a chunk, returning every complete character
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    if let Ok(valid) = std::str::from_utf8(valid) {
                        out.push_str(valid);
                    }
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            // Incomplete sequence at the end of the chunk
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush a dangling partial sequence as a replacement character
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }
}
