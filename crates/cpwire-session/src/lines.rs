//! Reassembly of newline-delimited messages from arbitrary chunks.

/// Accumulates bytes and yields complete lines.
///
/// Works on bytes, so a multi-byte character split across two chunks is
/// decoded correctly. A trailing `\r` is stripped from each line.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns every line it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|b| *b == b'\n') {
            self.pending.extend_from_slice(&rest[..pos]);
            lines.push(self.take_line());
            rest = &rest[pos + 1..];
        }
        self.pending.extend_from_slice(rest);
        lines
    }

    /// Returns the unterminated tail, if any, leaving the buffer empty.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.take_line())
        }
    }

    pub fn has_partial(&self) -> bool {
        !self.pending.is_empty()
    }

    fn take_line(&mut self) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        match String::from_utf8(bytes) {
            Ok(line) => line,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_coalesced_chunk() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push(b"{\"msg\":\"log\"}\n{\"msg\":\"warning\"}\n{\"msg\"");
        assert_eq!(lines, vec!["{\"msg\":\"log\"}", "{\"msg\":\"warning\"}"]);
        assert!(buffer.has_partial());

        let lines = buffer.push(b":\"summary\"}\n");
        assert_eq!(lines, vec!["{\"msg\":\"summary\"}"]);
        assert!(!buffer.has_partial());
    }

    #[test]
    fn test_chunk_without_newline_yields_nothing() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"abc").is_empty());
        assert!(buffer.push(b"").is_empty());
        assert_eq!(buffer.push(b"def\n"), vec!["abcdef"]);
    }

    #[test]
    fn test_finish_flushes_tail() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"done\ntail");
        assert_eq!(buffer.finish(), Some("tail".to_string()));
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_crlf_and_split_utf8() {
        let mut buffer = LineBuffer::new();
        let text = "caf\u{e9}\r\n".as_bytes();
        assert!(buffer.push(&text[..4]).is_empty());
        assert_eq!(buffer.push(&text[4..]), vec!["caf\u{e9}"]);
    }

    proptest! {
        #[test]
        fn lines_survive_any_chunking(
            lines in proptest::collection::vec("[^\n\r]{0,12}", 0..8),
            cuts in proptest::collection::vec(0usize..200, 0..6),
        ) {
            let mut stream = String::new();
            for line in &lines {
                stream.push_str(line);
                stream.push('\n');
            }
            let bytes = stream.as_bytes();

            let mut cuts: Vec<usize> = cuts.into_iter().map(|c| c.min(bytes.len())).collect();
            cuts.sort_unstable();

            let mut buffer = LineBuffer::new();
            let mut received = Vec::new();
            let mut start = 0;
            for cut in cuts {
                received.extend(buffer.push(&bytes[start..cut]));
                start = cut;
            }
            received.extend(buffer.push(&bytes[start..]));

            prop_assert_eq!(received, lines);
            prop_assert!(buffer.finish().is_none());
        }
    }
}
