use std::fmt;

use crate::ConstantPool;

/// Attribute names that get a structured decoding. Anything else is kept as
/// an opaque payload.
const WELL_KNOWN_ATTRIBUTES: &[(&str, AttributeKind)] = &[
    ("Code", AttributeKind::Code),
    ("ConstantValue", AttributeKind::ConstantValue),
    ("Exceptions", AttributeKind::Exceptions),
    ("LineNumberTable", AttributeKind::LineNumberTable),
    ("SourceFile", AttributeKind::SourceFile),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Code,
    ConstantValue,
    Exceptions,
    LineNumberTable,
    SourceFile,
}
impl AttributeKind {
    pub fn from_name(name: &str) -> Option<AttributeKind> {
        WELL_KNOWN_ATTRIBUTES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, kind)| *kind)
    }

    pub fn name(self) -> &'static str {
        WELL_KNOWN_ATTRIBUTES
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(n, _)| *n)
            .unwrap_or_default()
    }
}

/// An attribute as found in the class file. `info` always holds the full
/// payload, even when it has been decoded into `body`.
#[derive(Clone, PartialEq)]
pub struct Attribute {
    pub attribute_name_index: u16,
    pub info: Vec<u8>,
    pub body: AttributeBody,
}
impl Attribute {
    pub fn attribute_length(&self) -> u32 {
        self.info.len() as u32
    }

    pub fn kind(&self) -> Option<AttributeKind> {
        match self.body {
            AttributeBody::Code(_) => Some(AttributeKind::Code),
            AttributeBody::ConstantValue { .. } => Some(AttributeKind::ConstantValue),
            AttributeBody::Exceptions(_) => Some(AttributeKind::Exceptions),
            AttributeBody::LineNumberTable(_) => Some(AttributeKind::LineNumberTable),
            AttributeBody::SourceFile { .. } => Some(AttributeKind::SourceFile),
            AttributeBody::Opaque => None,
        }
    }
}
impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("attribute_name_index", &self.attribute_name_index)
            .field("info", &format!("({} bytes)", self.info.len()))
            .field("body", &self.body)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeBody {
    Code(CodeAttribute),
    ConstantValue { constantvalue_index: u16 },
    /// Indices of the `Class` entries a method declares it throws.
    Exceptions(Vec<u16>),
    LineNumberTable(Vec<LineNumberEntry>),
    SourceFile { sourcefile_index: u16 },
    Opaque,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn find_by_name(&self, name: &str, constant_pool: &ConstantPool) -> Option<&Attribute> {
        self.0
            .iter()
            .find(|a| constant_pool.utf8(a.attribute_name_index).ok() == Some(name))
    }

    pub fn code(&self) -> Option<&CodeAttribute> {
        self.0.iter().find_map(|a| match &a.body {
            AttributeBody::Code(code) => Some(code),
            _ => None,
        })
    }
}
impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// Index of the caught `Class`, or 0 for a handler that catches everything.
    pub catch_type: u16,
}
impl ExceptionTableEntry {
    pub fn catches_all(&self) -> bool {
        self.catch_type == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineNumberEntry {
    pub start_pc: u16,
    pub line_number: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}
impl CodeAttribute {
    pub fn code_length(&self) -> u32 {
        self.code.len() as u32
    }
}
