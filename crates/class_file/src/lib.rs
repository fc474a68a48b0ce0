// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

#[macro_use]
pub mod constant_pool;
mod access_flags;
pub mod attributes;
mod class_file;
mod error;
mod options;
mod parser;
mod reader;

pub use self::class_file::{ClassFile, FieldInfo, Interface, MethodInfo, Version, MAGIC_IDENTIFIER};
pub use access_flags::AccessFlags;
pub use attributes::{Attribute, AttributeBody, AttributeKind, Attributes, CodeAttribute};
pub use constant_pool::{ConstantPool, CpInfo, CpTag};
pub use error::ClassFileError;
pub use options::{ParseOptions, TextDecoding, DEFAULT_MAX_ATTRIBUTE_DEPTH};
pub use parser::Parser;
pub use reader::ByteReader;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
