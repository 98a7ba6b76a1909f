//! The 7-bit character mapping used by every text codec.
//!
//! Characters outside ASCII are replaced with `?` in both directions.

const REPLACEMENT: u8 = b'?';

/// Map text to one byte per character.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if c.is_ascii() { c as u8 } else { REPLACEMENT })
        .collect()
}

/// Map bytes back to text, one character per byte.
pub fn decode(data: &[u8]) -> String {
    data.iter()
        .map(|&b| if b.is_ascii() { b as char } else { REPLACEMENT as char })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_text_is_preserved() {
        let text = "siot/DAT 23.5, hello!~";
        assert_eq!(encode(text), text.as_bytes());
        assert_eq!(decode(text.as_bytes()), text);
    }

    #[test]
    fn non_ascii_chars_become_question_marks() {
        assert_eq!(encode("22°C"), b"22?C");
        assert_eq!(encode("Grüße"), b"Gr??e");
    }

    #[test]
    fn high_bytes_decode_as_question_marks() {
        assert_eq!(decode(&[b'a', 0x80, 0xFF, b'z']), "a??z");
    }

    #[test]
    fn empty_input() {
        assert!(encode("").is_empty());
        assert_eq!(decode(&[]), "");
    }
}
