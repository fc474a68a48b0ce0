mod attributes;

use log::{debug, trace};

use crate::{
    class_file::{FieldInfo, Interface, MethodInfo, Version, MAGIC_IDENTIFIER},
    constant_pool::{
        ClassInfo, CpInfo, CpTag, DoubleInfo, InvokeDynamicInfo, LongInfo, MethodHandleInfo,
        MethodTypeInfo, NameAndTypeInfo, RefInfo, Utf8Info,
    },
    reader::ByteReader,
    AccessFlags, ClassFile, ClassFileError, ConstantPool, ParseOptions, Result,
};

/// Depth of the attributes attached directly to the class, a field or a method.
const TOP_LEVEL_DEPTH: usize = 1;

pub struct Parser<'a> {
    r: ByteReader<'a>,
    options: ParseOptions,
}
impl<'a> Parser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_options(buf, ParseOptions::default())
    }

    pub fn with_options(buf: &'a [u8], options: ParseOptions) -> Self {
        Self {
            r: ByteReader::new(buf),
            options,
        }
    }

    /// A parser over an attribute payload found at `base_offset`.
    fn payload(buf: &'a [u8], base_offset: usize, options: ParseOptions) -> Self {
        Self {
            r: ByteReader::payload(buf, base_offset),
            options,
        }
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        let magic = self.parse_magic_identifier()?;
        let version = self.parse_version()?;
        debug!("Class file version {}", version);

        let constant_pool = self.parse_constant_pool()?;
        debug!("Constant pool has {} slots", constant_pool.len());

        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u16()?);
        let this_class = self.r.read_u16()?;
        let super_class = self.r.read_u16()?;

        let interfaces_count = self.r.read_u16()?;
        let interfaces = (0..interfaces_count)
            .map(|_| self.parse_interface(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let fields_count = self.r.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.r.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let attributes = self.parse_attributes(&constant_pool, TOP_LEVEL_DEPTH)?;

        debug!(
            "Parsed {} interfaces, {} fields, {} methods, {} attributes",
            interfaces.len(),
            fields.len(),
            methods.len(),
            attributes.len()
        );

        if !self.options.allow_trailing_bytes && !self.r.is_empty() {
            return Err(ClassFileError::TrailingBytes {
                offset: self.r.offset(),
                remaining: self.r.remaining(),
            });
        }

        Ok(ClassFile {
            magic,
            version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<u32> {
        match self.r.read_u32()? {
            MAGIC_IDENTIFIER => Ok(MAGIC_IDENTIFIER),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<Version> {
        let minor = self.r.read_u16()?;
        let major = self.r.read_u16()?;
        Ok(Version { major, minor })
    }

    fn parse_interface(&mut self, constant_pool: &ConstantPool) -> Result<Interface> {
        let offset = self.r.offset();
        let index = self.r.read_u16()?;
        let name = constant_pool
            .class_name(index)
            .map_err(|e| e.at(offset))?
            .to_owned();
        trace!("Interface #{} {}", index, name);

        Ok(Interface { index, name })
    }

    fn parse_field_info(&mut self, constant_pool: &ConstantPool) -> Result<FieldInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u16()?);
        let name_index = self.r.read_u16()?;
        let descriptor_index = self.r.read_u16()?;
        trace!("Field name #{} descriptor #{}", name_index, descriptor_index);
        let attributes = self.parse_attributes(constant_pool, TOP_LEVEL_DEPTH)?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self, constant_pool: &ConstantPool) -> Result<MethodInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u16()?);
        let name_index = self.r.read_u16()?;
        let descriptor_index = self.r.read_u16()?;
        trace!("Method name #{} descriptor #{}", name_index, descriptor_index);
        let attributes = self.parse_attributes(constant_pool, TOP_LEVEL_DEPTH)?;

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.r.read_u16()?;

        let count = (constant_pool_count as usize).saturating_sub(1);
        let mut res = Vec::with_capacity(count);
        while res.len() < count {
            let offset = self.r.offset();
            let (cp_info, slot_size) = self.parse_cp_info()?;
            trace!("#{} = {:?}", res.len() + 1, cp_info);

            let slots = res.len() + slot_size;
            if slots > count {
                return Err(ClassFileError::LengthMismatch {
                    offset,
                    declared: count,
                    consumed: slots,
                });
            }

            res.push(cp_info);
            res.resize(slots, CpInfo::Unusable);
        }
        Ok(ConstantPool::new(res))
    }

    fn parse_cp_info(&mut self) -> Result<(CpInfo, usize)> {
        let offset = self.r.offset();
        let tag = CpTag::try_from(self.r.read_u8()?)
            .map_err(|tag| ClassFileError::UnsupportedTag { tag, offset })?;

        let cp_info = match tag {
            CpTag::Utf8 => self.parse_utf8()?,
            CpTag::Integer => CpInfo::Integer(self.r.read_i32()?),
            CpTag::Float => CpInfo::Float(f32::from_bits(self.r.read_u32()?)),
            CpTag::Long => self.parse_long()?,
            CpTag::Double => self.parse_double()?,
            CpTag::Class => self.parse_class_info()?,
            CpTag::String => self.parse_string()?,
            CpTag::FieldRef => CpInfo::FieldRef(self.parse_ref_info()?),
            CpTag::MethodRef => CpInfo::MethodRef(self.parse_ref_info()?),
            CpTag::InterfaceMethodRef => CpInfo::InterfaceMethodRef(self.parse_ref_info()?),
            CpTag::NameAndType => self.parse_name_and_type_info()?,
            CpTag::MethodHandle => self.parse_method_handle()?,
            CpTag::MethodType => self.parse_method_type_info()?,
            CpTag::InvokeDynamic => self.parse_invoke_dynamic_info()?,
        };

        Ok((cp_info, tag.slot_size()))
    }

    fn parse_utf8(&mut self) -> Result<CpInfo> {
        let length = self.r.read_u16()?;
        let bytes = self.r.read_bytes(length as usize)?;

        Ok(CpInfo::Utf8(Utf8Info {
            text: self.options.text_decoding.decode(bytes),
            bytes: bytes.to_vec(),
        }))
    }

    fn parse_long(&mut self) -> Result<CpInfo> {
        let high_bytes = self.r.read_u32()?;
        let low_bytes = self.r.read_u32()?;

        Ok(CpInfo::Long(LongInfo {
            high_bytes,
            low_bytes,
        }))
    }

    fn parse_double(&mut self) -> Result<CpInfo> {
        let high_bytes = self.r.read_u32()?;
        let low_bytes = self.r.read_u32()?;

        Ok(CpInfo::Double(DoubleInfo {
            high_bytes,
            low_bytes,
        }))
    }

    fn parse_class_info(&mut self) -> Result<CpInfo> {
        let name_index = self.r.read_u16()?;

        Ok(CpInfo::Class(ClassInfo { name_index }))
    }

    fn parse_string(&mut self) -> Result<CpInfo> {
        let string_index = self.r.read_u16()?;

        Ok(CpInfo::String { string_index })
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.r.read_u16()?;
        let descriptor_index = self.r.read_u16()?;

        Ok(CpInfo::NameAndType(NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_method_handle(&mut self) -> Result<CpInfo> {
        let reference_kind = self.r.read_u8()?;
        let reference_index = self.r.read_u16()?;

        Ok(CpInfo::MethodHandle(MethodHandleInfo {
            reference_kind,
            reference_index,
        }))
    }

    fn parse_method_type_info(&mut self) -> Result<CpInfo> {
        let descriptor_index = self.r.read_u16()?;

        Ok(CpInfo::MethodType(MethodTypeInfo { descriptor_index }))
    }

    fn parse_invoke_dynamic_info(&mut self) -> Result<CpInfo> {
        let bootstrap_method_attr_index = self.r.read_u16()?;
        let name_and_type_index = self.r.read_u16()?;

        Ok(CpInfo::InvokeDynamic(InvokeDynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        }))
    }

    fn parse_ref_info(&mut self) -> Result<RefInfo> {
        let class_index = self.r.read_u16()?;
        let name_and_type_index = self.r.read_u16()?;

        Ok(RefInfo {
            class_index,
            name_and_type_index,
        })
    }
}

#[cfg(test)]
mod parse_magic_identifier_tests {
    use super::*;

    #[test]
    fn it_should_be_able_to_parse_the_correct_identifier() {
        assert_eq!(
            Parser::new(&[0xca, 0xfe, 0xba, 0xbe])
                .parse_magic_identifier()
                .unwrap(),
            0xcafebabe
        );
    }

    #[test]
    fn it_should_fail_if_there_is_not_enough_data() {
        assert!(matches!(
            Parser::new(&[0xca, 0xfe, 0xba]).parse_magic_identifier(),
            Err(ClassFileError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn it_should_fail_if_the_magic_identifier_is_incorrect() {
        assert_eq!(
            Parser::new(&[0xca, 0xfe, 0xda, 0xda]).parse_magic_identifier(),
            Err(ClassFileError::InvalidMagicIdentifier(0xcafedada))
        );
    }
}


#[cfg(test)]
mod parse_cp_info_tests {
    use super::*;

    #[test]
    fn it_should_parse_a_class_info() {
        assert_eq!(
            Parser::new(&[7, 0x00, 0x05]).parse_cp_info().unwrap(),
            (CpInfo::Class(ClassInfo { name_index: 5 }), 1)
        );
    }

    #[test]
    fn it_should_parse_a_utf8_info() {
        let (cp_info, _) = Parser::new(&[1, 0x00, 0x05, b'H', b'e', b'l', b'l', b'o'])
            .parse_cp_info()
            .unwrap();

        let CpInfo::Utf8(utf8) = &cp_info else {
            panic!("expected Utf8, found {:?}", cp_info);
        };
        assert_eq!(utf8.text, "Hello");
        assert_eq!(utf8.length(), 5);
    }

    #[test]
    fn it_should_fail_on_an_unknown_tag_without_consuming_more() {
        let mut parser = Parser::new(&[0xff, 0x00, 0x05]);

        assert_eq!(
            parser.parse_cp_info(),
            Err(ClassFileError::UnsupportedTag {
                tag: 0xff,
                offset: 0
            })
        );
        assert_eq!(parser.r.position(), 1);
    }

    #[test]
    fn it_should_parse_numeric_literals() {
        assert_eq!(
            Parser::new(&[3, 0xff, 0xff, 0xff, 0xfd]).parse_cp_info().unwrap(),
            (CpInfo::Integer(-3), 1)
        );
        assert_eq!(
            Parser::new(&[4, 0x3f, 0x00, 0x00, 0x00]).parse_cp_info().unwrap(),
            (CpInfo::Float(0.5), 1)
        );
        assert_eq!(
            Parser::new(&[4, 0x7f, 0x80, 0x00, 0x00]).parse_cp_info().unwrap(),
            (CpInfo::Float(f32::INFINITY), 1)
        );
    }

    #[test]
    fn it_should_give_long_and_double_two_slots() {
        let (long, slots) = Parser::new(&[5, 0, 0, 0x01, 0x1f, 0x71, 0xfb, 0x04, 0xcb])
            .parse_cp_info()
            .unwrap();
        assert_eq!(slots, 2);
        assert!(matches!(long, CpInfo::Long(l) if l.value() == 1234567890123));

        let (double, slots) = Parser::new(&[6, 0x40, 0x04, 0, 0, 0, 0, 0, 0])
            .parse_cp_info()
            .unwrap();
        assert_eq!(slots, 2);
        assert!(matches!(double, CpInfo::Double(d) if d.value() == 2.5));
    }

    #[test]
    fn it_should_parse_member_references() {
        assert_eq!(
            Parser::new(&[11, 0x00, 0x02, 0x00, 0x09]).parse_cp_info().unwrap(),
            (
                CpInfo::InterfaceMethodRef(RefInfo {
                    class_index: 2,
                    name_and_type_index: 9
                }),
                1
            )
        );
    }

    #[test]
    fn it_should_parse_invokedynamic_plumbing() {
        assert_eq!(
            Parser::new(&[15, 6, 0x00, 0x0a]).parse_cp_info().unwrap(),
            (
                CpInfo::MethodHandle(MethodHandleInfo {
                    reference_kind: 6,
                    reference_index: 10
                }),
                1
            )
        );
        assert_eq!(
            Parser::new(&[16, 0x00, 0x0c]).parse_cp_info().unwrap(),
            (CpInfo::MethodType(MethodTypeInfo { descriptor_index: 12 }), 1)
        );
        assert_eq!(
            Parser::new(&[18, 0x00, 0x00, 0x00, 0x0d]).parse_cp_info().unwrap(),
            (
                CpInfo::InvokeDynamic(InvokeDynamicInfo {
                    bootstrap_method_attr_index: 0,
                    name_and_type_index: 13
                }),
                1
            )
        );
    }

    #[test]
    fn it_should_fail_if_an_entry_is_cut_short() {
        assert_eq!(
            Parser::new(&[1, 0x00, 0x05, b'H', b'e']).parse_cp_info(),
            Err(ClassFileError::OutOfBounds {
                offset: 3,
                needed: 5,
                available: 2
            })
        );
    }
}

#[cfg(test)]
mod parse_constant_pool_tests {
    use super::*;

    #[test]
    fn it_should_read_count_minus_one_entries() {
        let pool = Parser::new(&[0x00, 0x03, 7, 0x00, 0x02, 1, 0x00, 0x01, b'A'])
            .parse_constant_pool()
            .unwrap();

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.class_name(1).unwrap(), "A");
    }

    #[test]
    fn it_should_leave_the_slot_after_a_long_unusable() {
        let pool = Parser::new(&[0x00, 0x04, 5, 0, 0, 0, 0, 0, 0, 0, 1, 8, 0x00, 0x01])
            .parse_constant_pool()
            .unwrap();

        assert_eq!(pool.len(), 3);
        assert!(matches!(pool.get(2), Err(ClassFileError::InvalidReference { .. })));
        assert_eq!(pool.get(3).unwrap(), &CpInfo::String { string_index: 1 });
    }

    #[test]
    fn it_should_fail_if_a_long_overruns_the_declared_count() {
        assert_eq!(
            Parser::new(&[0x00, 0x02, 5, 0, 0, 0, 0, 0, 0, 0, 1]).parse_constant_pool(),
            Err(ClassFileError::LengthMismatch {
                offset: 2,
                declared: 1,
                consumed: 2
            })
        );
    }

    #[test]
    fn it_should_accept_an_empty_pool() {
        assert!(Parser::new(&[0x00, 0x00]).parse_constant_pool().unwrap().is_empty());
        assert!(Parser::new(&[0x00, 0x01]).parse_constant_pool().unwrap().is_empty());
    }
}


#[cfg(test)]
mod parse_tests {
    use super::*;

    /// `public class A extends B` with no members.
    const MINIMAL_CLASS: &[u8] = &[
        0xca, 0xfe, 0xba, 0xbe, // magic
        0x00, 0x00, 0x00, 0x34, // 52.0
        0x00, 0x05, // constant_pool_count
        7, 0x00, 0x02, // #1 Class A
        1, 0x00, 0x01, b'A', // #2
        7, 0x00, 0x04, // #3 Class B
        1, 0x00, 0x01, b'B', // #4
        0x00, 0x21, // access_flags
        0x00, 0x01, // this_class
        0x00, 0x03, // super_class
        0x00, 0x00, // interfaces_count
        0x00, 0x00, // fields_count
        0x00, 0x00, // methods_count
        0x00, 0x00, // attributes_count
    ];

    #[test]
    fn it_should_parse_a_minimal_class() {
        let class_file = Parser::new(MINIMAL_CLASS).parse().unwrap();

        assert_eq!(class_file.version, Version { major: 52, minor: 0 });
        assert_eq!(class_file.access_flags, AccessFlags::PUBLIC | AccessFlags::SUPER);
        assert_eq!(class_file.class_name().unwrap(), "A");
        assert_eq!(class_file.super_class().unwrap(), Some("B"));
        assert!(class_file.interfaces.is_empty());
        assert!(class_file.attributes.is_empty());
    }

    #[test]
    fn it_should_fail_on_every_truncation() {
        for len in 0..MINIMAL_CLASS.len() {
            assert!(
                matches!(
                    Parser::new(&MINIMAL_CLASS[..len]).parse(),
                    Err(ClassFileError::OutOfBounds { .. })
                ),
                "prefix of {} bytes",
                len
            );
        }
    }

    #[test]
    fn it_should_reject_trailing_bytes() {
        let mut bytes = MINIMAL_CLASS.to_vec();
        bytes.push(0);

        assert_eq!(
            Parser::new(&bytes).parse(),
            Err(ClassFileError::TrailingBytes {
                offset: MINIMAL_CLASS.len(),
                remaining: 1
            })
        );

        let options = ParseOptions {
            allow_trailing_bytes: true,
            ..ParseOptions::default()
        };
        assert!(Parser::with_options(&bytes, options).parse().is_ok());
    }
}
