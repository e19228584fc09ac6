//! Storage for declared variables
//!
//! Walks the declaration chain once. Scalars with an initializer go to the
//! data section, everything else is reserved zeroed in the bss section.
//! Array initializers are accepted by the parser but never lowered.

use crate::codegen::errors::CodegenError;
use crate::codegen::generator::Generator;
use crate::codegen::instr::{Instr, Section};
use crate::parser::ast::NodeId;

impl Generator<'_> {
    pub(crate) fn emit_declarations(&mut self, vars: NodeId) -> Result<(), CodegenError> {
        let mut data = Vec::new();
        let mut bss = Vec::new();

        let mut link = Some(vars);
        while let Some(current) = link {
            let node = self.node(current);
            let Some(decl) = node.left() else {
                break;
            };
            let decl_node = self.node(decl);
            let name = decl_node.value();
            let symbol = self.symbol(name)?;

            if decl_node.right().is_none() {
                return Err(CodegenError::MissingType {
                    name: name.to_string(),
                });
            }
            let width = Self::width_of(symbol)?;

            if symbol.is_array {
                let size = symbol
                    .element_count()
                    .and_then(|count| count.checked_mul(width.bytes()))
                    .ok_or_else(|| CodegenError::MalformedNode {
                        node: name.to_string(),
                    })?;
                bss.push(Instr::Reserved {
                    name: name.to_string(),
                    size,
                });
            } else if let Some(init) = decl_node.left() {
                let text = self.node(init).value();
                let value = Self::literal(text).ok_or_else(|| CodegenError::MalformedNode {
                    node: text.to_string(),
                })?;
                data.push(Instr::Initialized {
                    name: name.to_string(),
                    width,
                    value,
                });
            } else {
                bss.push(Instr::Reserved {
                    name: name.to_string(),
                    size: width.bytes(),
                });
            }

            link = node.right();
        }

        if !data.is_empty() {
            self.instrs.push(Instr::Section(Section::Data));
            self.instrs.append(&mut data);
        }
        if !bss.is_empty() {
            self.instrs.push(Instr::Section(Section::Bss));
            self.instrs.append(&mut bss);
        }
        Ok(())
    }
}
