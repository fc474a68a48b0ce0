use log::trace;

use super::Parser;
use crate::{
    attributes::{
        Attribute, AttributeBody, AttributeKind, Attributes, CodeAttribute, ExceptionTableEntry,
        LineNumberEntry,
    },
    ClassFileError, ConstantPool, Result,
};

impl<'a> Parser<'a> {
    pub(super) fn parse_attributes(
        &mut self,
        constant_pool: &ConstantPool,
        depth: usize,
    ) -> Result<Attributes> {
        let attributes_count = self.r.read_u16()?;
        (0..attributes_count)
            .map(|_| self.parse_attribute(constant_pool, depth))
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    /// Reads the attribute envelope and its whole payload first, so that
    /// unknown attributes are skipped without knowing their layout. Well-known
    /// attributes are then decoded from the payload alone.
    fn parse_attribute(&mut self, constant_pool: &ConstantPool, depth: usize) -> Result<Attribute> {
        if depth > self.options.max_attribute_depth {
            return Err(ClassFileError::MaxDepthExceeded {
                offset: self.r.offset(),
                max: self.options.max_attribute_depth,
            });
        }

        let attribute_name_index = self.r.read_u16()?;
        let attribute_length = self.r.read_u32()? as usize;
        let payload_offset = self.r.offset();
        let info = self.r.read_bytes(attribute_length)?;

        let name = constant_pool
            .utf8(attribute_name_index)
            .map_err(|e| e.at(payload_offset))?;
        trace!(
            "Attribute {} ({} bytes) at offset {}, depth {}",
            name,
            attribute_length,
            payload_offset,
            depth
        );

        let body = match AttributeKind::from_name(name) {
            Some(kind) => {
                let mut parser = Parser::payload(info, payload_offset, self.options);
                let body = parser.parse_attribute_body(kind, constant_pool, depth)?;
                parser.finish_payload()?;
                body
            }
            None => AttributeBody::Opaque,
        };

        Ok(Attribute {
            attribute_name_index,
            info: info.to_vec(),
            body,
        })
    }

    fn parse_attribute_body(
        &mut self,
        kind: AttributeKind,
        constant_pool: &ConstantPool,
        depth: usize,
    ) -> Result<AttributeBody> {
        Ok(match kind {
            AttributeKind::Code => {
                AttributeBody::Code(self.parse_code_attribute(constant_pool, depth)?)
            }
            AttributeKind::ConstantValue => AttributeBody::ConstantValue {
                constantvalue_index: self.r.read_u16()?,
            },
            AttributeKind::Exceptions => {
                let number_of_exceptions = self.r.read_u16()?;
                let exception_index_table = (0..number_of_exceptions)
                    .map(|_| self.r.read_u16())
                    .collect::<Result<Vec<_>>>()?;
                AttributeBody::Exceptions(exception_index_table)
            }
            AttributeKind::LineNumberTable => {
                let line_number_table_length = self.r.read_u16()?;
                let line_number_table = (0..line_number_table_length)
                    .map(|_| self.parse_line_number_entry())
                    .collect::<Result<Vec<_>>>()?;
                AttributeBody::LineNumberTable(line_number_table)
            }
            AttributeKind::SourceFile => AttributeBody::SourceFile {
                sourcefile_index: self.r.read_u16()?,
            },
        })
    }

    /// Attributes nested in the code attribute sit one level deeper than it.
    fn parse_code_attribute(
        &mut self,
        constant_pool: &ConstantPool,
        depth: usize,
    ) -> Result<CodeAttribute> {
        let max_stack = self.r.read_u16()?;
        let max_locals = self.r.read_u16()?;
        let code_length = self.r.read_u32()?;
        let code = self.r.read_bytes(code_length as usize)?.to_vec();
        let exception_table_length = self.r.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry())
            .collect::<Result<Vec<_>>>()?;
        let attributes = self.parse_attributes(constant_pool, depth + 1)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn parse_exception_table_entry(&mut self) -> Result<ExceptionTableEntry> {
        let start_pc = self.r.read_u16()?;
        let end_pc = self.r.read_u16()?;
        let handler_pc = self.r.read_u16()?;
        let catch_type = self.r.read_u16()?;

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    fn parse_line_number_entry(&mut self) -> Result<LineNumberEntry> {
        let start_pc = self.r.read_u16()?;
        let line_number = self.r.read_u16()?;

        Ok(LineNumberEntry {
            start_pc,
            line_number,
        })
    }

    /// A decoded payload must be used up exactly.
    fn finish_payload(&self) -> Result<()> {
        if self.r.is_empty() {
            Ok(())
        } else {
            Err(ClassFileError::LengthMismatch {
                offset: self.r.base_offset(),
                declared: self.r.len(),
                consumed: self.r.position(),
            })
        }
    }
}
