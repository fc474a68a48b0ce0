use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassFileError {
    #[error("Read of {needed} bytes at offset {offset} is out of bounds ({available} available)")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("Unsupported cp info tag {tag} at offset {offset}")]
    UnsupportedTag { tag: u8, offset: usize },
    /// `offset` is the position of the reference in the class file, when the
    /// lookup happened while decoding.
    #[error(
        "Invalid constant pool reference #{index}{}: expected {expected}, found {found}",
        at_offset(.offset)
    )]
    InvalidReference {
        offset: Option<usize>,
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Attribute payload truncated at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedPayload {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("Declared length {declared} at offset {offset} does not match consumed length {consumed}")]
    LengthMismatch {
        offset: usize,
        declared: usize,
        consumed: usize,
    },
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Attribute at offset {offset} nested deeper than {max} levels")]
    MaxDepthExceeded { offset: usize, max: usize },
    #[error("{remaining} trailing bytes after the class file at offset {offset}")]
    TrailingBytes { offset: usize, remaining: usize },
}

impl ClassFileError {
    /// Places a constant pool lookup failure at the offset of the reference
    /// that was being resolved.
    pub(crate) fn at(self, offset: usize) -> Self {
        match self {
            ClassFileError::InvalidReference {
                offset: None,
                index,
                expected,
                found,
            } => ClassFileError::InvalidReference {
                offset: Some(offset),
                index,
                expected,
                found,
            },
            e => e,
        }
    }
}

fn at_offset(offset: &Option<usize>) -> String {
    offset
        .map(|offset| format!(" at offset {}", offset))
        .unwrap_or_default()
}
