pub const DEFAULT_MAX_ATTRIBUTE_DEPTH: usize = 16;

/// How the bytes of a `CONSTANT_Utf8` entry are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextDecoding {
    /// One code point per byte.
    #[default]
    Latin1,
    /// Standard UTF-8, replacing invalid sequences.
    Utf8Lossy,
}
impl TextDecoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextDecoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            TextDecoding::Utf8Lossy => String::from_utf8_lossy(bytes).into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Attributes of the class, its fields and its methods sit at depth 1,
    /// attributes inside a `Code` attribute at depth 2, and so on.
    pub max_attribute_depth: usize,
    pub text_decoding: TextDecoding,
    pub allow_trailing_bytes: bool,
}
impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_attribute_depth: DEFAULT_MAX_ATTRIBUTE_DEPTH,
            text_decoding: TextDecoding::default(),
            allow_trailing_bytes: false,
        }
    }
}

#[cfg(test)]
mod text_decoding_tests {
    use super::*;

    #[test]
    fn it_should_map_every_byte_to_one_char() {
        assert_eq!(TextDecoding::Latin1.decode(b"Hello"), "Hello");
        assert_eq!(TextDecoding::Latin1.decode(&[0xc3, 0xa9]), "\u{c3}\u{a9}");
    }

    #[test]
    fn it_should_decode_utf8_when_asked_to() {
        assert_eq!(TextDecoding::Utf8Lossy.decode(&[0xc3, 0xa9]), "é");
    }
}
