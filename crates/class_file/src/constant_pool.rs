use crate::{ClassFileError, Result};

#[macro_export]
macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {{
        let index = $index;
        match $cp.get(index)? {
            $crate::constant_pool::CpInfo::$i(n) => Ok(n),
            c => Err($crate::ClassFileError::InvalidReference {
                offset: None,
                index,
                expected: stringify!($i),
                found: c.kind(),
            }),
        }
    }};
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConstantPool {
    cp_infos: Vec<CpInfo>,
}
impl ConstantPool {
    pub fn new(cp_infos: Vec<CpInfo>) -> Self {
        Self { cp_infos }
    }

    /// Number of slots, which is `constant_pool_count - 1`. The second slot
    /// of a `Long` or `Double` counts even though it holds no entry.
    pub fn len(&self) -> usize {
        self.cp_infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cp_infos.is_empty()
    }

    /// Looks up a 1-based index. Index 0, indices past the end and the unusable
    /// slot after a `Long` or `Double` are all invalid references.
    pub fn get(&self, index: u16) -> Result<&CpInfo> {
        let slot = index
            .checked_sub(1)
            .and_then(|i| self.cp_infos.get(i as usize));

        match slot {
            Some(CpInfo::Unusable) | None => Err(ClassFileError::InvalidReference {
                offset: None,
                index,
                expected: "constant pool entry",
                found: slot.map_or("nothing", CpInfo::kind),
            }),
            Some(cp_info) => Ok(cp_info),
        }
    }

    pub fn utf8(&self, index: u16) -> Result<&str> {
        matches_cp_info!(self, index, Utf8).map(|utf8| utf8.text.as_str())
    }

    /// Follows a `Class` entry to the name it points at.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        let ClassInfo { name_index } = matches_cp_info!(self, index, Class)?;

        self.utf8(*name_index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CpInfo> {
        self.cp_infos.iter()
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a CpInfo;
    type IntoIter = std::slice::Iter<'a, CpInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.cp_infos.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    InvokeDynamic = 18,
}
impl CpTag {
    /// `Long` and `Double` take up two constant pool slots.
    pub fn slot_size(self) -> usize {
        match self {
            CpTag::Long | CpTag::Double => 2,
            _ => 1,
        }
    }
}
impl TryFrom<u8> for CpTag {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(CpTag::Utf8),
            3 => Ok(CpTag::Integer),
            4 => Ok(CpTag::Float),
            5 => Ok(CpTag::Long),
            6 => Ok(CpTag::Double),
            7 => Ok(CpTag::Class),
            8 => Ok(CpTag::String),
            9 => Ok(CpTag::FieldRef),
            10 => Ok(CpTag::MethodRef),
            11 => Ok(CpTag::InterfaceMethodRef),
            12 => Ok(CpTag::NameAndType),
            15 => Ok(CpTag::MethodHandle),
            16 => Ok(CpTag::MethodType),
            18 => Ok(CpTag::InvokeDynamic),
            _ => Err(value),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    Utf8(Utf8Info),
    Integer(i32),
    Float(f32),
    Long(LongInfo),
    Double(DoubleInfo),
    Class(ClassInfo),
    String { string_index: u16 },
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    NameAndType(NameAndTypeInfo),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    InvokeDynamic(InvokeDynamicInfo),
    Unusable,
}
impl CpInfo {
    pub fn tag(&self) -> Option<CpTag> {
        Some(match self {
            CpInfo::Utf8(_) => CpTag::Utf8,
            CpInfo::Integer(_) => CpTag::Integer,
            CpInfo::Float(_) => CpTag::Float,
            CpInfo::Long(_) => CpTag::Long,
            CpInfo::Double(_) => CpTag::Double,
            CpInfo::Class(_) => CpTag::Class,
            CpInfo::String { .. } => CpTag::String,
            CpInfo::FieldRef(_) => CpTag::FieldRef,
            CpInfo::MethodRef(_) => CpTag::MethodRef,
            CpInfo::InterfaceMethodRef(_) => CpTag::InterfaceMethodRef,
            CpInfo::NameAndType(_) => CpTag::NameAndType,
            CpInfo::MethodHandle(_) => CpTag::MethodHandle,
            CpInfo::MethodType(_) => CpTag::MethodType,
            CpInfo::InvokeDynamic(_) => CpTag::InvokeDynamic,
            CpInfo::Unusable => return None,
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CpInfo::Utf8(_) => "Utf8",
            CpInfo::Integer(_) => "Integer",
            CpInfo::Float(_) => "Float",
            CpInfo::Long(_) => "Long",
            CpInfo::Double(_) => "Double",
            CpInfo::Class(_) => "Class",
            CpInfo::String { .. } => "String",
            CpInfo::FieldRef(_) => "FieldRef",
            CpInfo::MethodRef(_) => "MethodRef",
            CpInfo::InterfaceMethodRef(_) => "InterfaceMethodRef",
            CpInfo::NameAndType(_) => "NameAndType",
            CpInfo::MethodHandle(_) => "MethodHandle",
            CpInfo::MethodType(_) => "MethodType",
            CpInfo::InvokeDynamic(_) => "InvokeDynamic",
            CpInfo::Unusable => "Unusable",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Utf8Info {
    pub bytes: Vec<u8>,
    pub text: String,
}
impl Utf8Info {
    /// Length in bytes, as declared in the class file.
    pub fn length(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct LongInfo {
    pub high_bytes: u32,
    pub low_bytes: u32,
}
impl LongInfo {
    pub fn value(&self) -> i64 {
        ((self.high_bytes as u64) << 32 | self.low_bytes as u64) as i64
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DoubleInfo {
    pub high_bytes: u32,
    pub low_bytes: u32,
}
impl DoubleInfo {
    pub fn value(&self) -> f64 {
        f64::from_bits((self.high_bytes as u64) << 32 | self.low_bytes as u64)
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ClassInfo {
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct InvokeDynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}
