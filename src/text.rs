//! Helpers for character and byte ropes

use std::fmt::{self, Write};

use bytecount::count as bytecount_count;
use memchr::{memchr, memrchr};
use simdutf8::basic::from_utf8;

use crate::error::{Result, RopeError};
use crate::node::Rope;

// === Character Ropes ===

impl From<&str> for Rope<char> {
    fn from(text: &str) -> Self {
        text.chars().collect()
    }
}

impl From<String> for Rope<char> {
    fn from(text: String) -> Self {
        Rope::from(text.as_str())
    }
}

impl fmt::Display for Rope<char> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.chunks() {
            for &c in chunk {
                f.write_char(c)?;
            }
        }
        Ok(())
    }
}

// === Byte Ropes ===

impl Rope<u8> {
    /// Decode as UTF-8, failing on any invalid sequence
    pub fn to_utf8(&self) -> Result<String> {
        let bytes = self.to_contiguous();
        let text = from_utf8(&bytes).map_err(|_| RopeError::InvalidUtf8)?;
        Ok(text.to_owned())
    }

    /// Decode as UTF-8, replacing invalid sequences with U+FFFD
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.to_contiguous()).into_owned()
    }

    /// Offset of the first `byte` at or after `from`
    pub fn find_byte(&self, byte: u8, from: usize) -> Option<usize> {
        if from >= self.len() {
            return None;
        }
        let mut offset = from;
        for chunk in self.chunks_range(from, self.len()) {
            if let Some(p) = memchr(byte, chunk) {
                return Some(offset + p);
            }
            offset += chunk.len();
        }
        None
    }

    /// Offset of the last `byte` before `end`
    pub fn rfind_byte(&self, byte: u8, end: usize) -> Option<usize> {
        let mut end = end.min(self.len());
        for chunk in self.chunks_range(0, end).rev() {
            end -= chunk.len();
            if let Some(p) = memrchr(byte, chunk) {
                return Some(end + p);
            }
        }
        None
    }

    /// Number of occurrences of `byte`, e.g. newlines
    pub fn count_byte(&self, byte: u8) -> usize {
        self.chunks().map(|chunk| bytecount_count(chunk, byte)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(parts: &[&str]) -> Rope<u8> {
        let pieces = parts.iter().map(|p| Rope::from(p.as_bytes())).collect();
        Rope::combine(pieces)
    }

    #[test]
    fn test_char_rope_display() {
        let rope = Rope::from("hello ") + Rope::from(String::from("wörld"));
        assert_eq!(rope.to_string(), "hello wörld");
        assert_eq!(rope.len(), 11);
    }

    #[test]
    fn test_utf8_across_leaves() {
        // "é" is split between the two leaves
        let rope = Rope::node(Rope::from(&[b'a', 0xC3][..]), Rope::from(&[0xA9, b'b'][..]));
        assert_eq!(rope.to_utf8(), Ok("aéb".to_string()));

        let invalid = Rope::from(&[b'a', 0xFF][..]);
        assert_eq!(invalid.to_utf8(), Err(RopeError::InvalidUtf8));
        assert_eq!(invalid.to_string_lossy(), "a\u{FFFD}");
    }

    #[test]
    fn test_byte_search() {
        let rope = bytes(&["one\ntw", "o\n", "three\n"]);
        assert_eq!(rope.count_byte(b'\n'), 3);
        assert_eq!(rope.find_byte(b'\n', 0), Some(3));
        assert_eq!(rope.find_byte(b'\n', 4), Some(7));
        assert_eq!(rope.find_byte(b'x', 0), None);
        assert_eq!(rope.find_byte(b'\n', 100), None);
        assert_eq!(rope.rfind_byte(b'\n', rope.len()), Some(13));
        assert_eq!(rope.rfind_byte(b'\n', 13), Some(7));
        assert_eq!(rope.rfind_byte(b'o', 3), Some(0));
    }
}
