use std::collections::VecDeque;

/// Carry-over buffer for newline-delimited text arriving in arbitrary chunks
///
/// Bytes are split on `\n` before decoding. A newline byte can never occur
/// inside a multi-byte UTF-8 sequence, so a character split across two reads
/// is always complete by the time its line is decoded.
pub struct LineBuffer {
    buffer: VecDeque<u8>,
}

impl LineBuffer {
    /// Create a new buffer with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    /// Add bytes to the buffer
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract the next complete line, without its terminator
    ///
    /// Returns None if no complete line is available. A trailing `\r` is
    /// stripped; invalid UTF-8 is replaced rather than rejected.
    pub fn next_line(&mut self) -> Option<String> {
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;

        let mut line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
        line_bytes.pop();
        if line_bytes.last() == Some(&b'\r') {
            line_bytes.pop();
        }

        match String::from_utf8(line_bytes) {
            Ok(line) => Some(line),
            Err(e) => {
                tracing::warn!("Invalid UTF-8 in stream line, replacing: {}", e.utf8_error());
                Some(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }

    /// Drop whatever unterminated text is left, returning its size in bytes
    ///
    /// Called at end of input: a trailing line without `\n` is not a frame.
    pub fn discard_remainder(&mut self) -> usize {
        let len = self.buffer.len();
        self.buffer.clear();
        len
    }

    /// Current buffer size
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
