//! Main generator coordinator
//!
//! This module provides the [`Generator`] struct and the two-phase driver:
//!
//! 1. `declarations`: storage for every declared variable
//! 2. `statements` and `expressions`: the program body
//!
//! Generation stops at the first [`CodegenError`]. Whatever was produced up
//! to that point stays available through [`Generator::instructions`].

use crate::codegen::errors::CodegenError;
use crate::codegen::instr::{Instr, Operand, Register, Section, Width};
use crate::parser::ast::{Node, NodeId, SyntaxTree};
use crate::parser::lexer::constant_value;
use crate::parser::symbols::{Symbol, SymbolTable};

/// Tree-walking code generator
pub struct Generator<'a> {
    pub(crate) tree: &'a SyntaxTree,
    pub(crate) symbols: &'a SymbolTable,
    pub(crate) instrs: Vec<Instr>,
    /// Numbers the `_nope<N>_` / `_end<N>_` label pairs; never reused
    pub(crate) label_count: usize,
}

impl<'a> Generator<'a> {
    pub fn new(tree: &'a SyntaxTree, symbols: &'a SymbolTable) -> Self {
        Generator {
            tree,
            symbols,
            instrs: Vec::new(),
            label_count: 1,
        }
    }

    /// Lower the whole program
    pub fn generate(&mut self) -> Result<(), CodegenError> {
        let Some(root) = self.tree.root() else {
            return Err(CodegenError::EmptyTree {
                program: String::new(),
            });
        };
        let program = self.node(root);
        if program.is_leaf() {
            return Err(CodegenError::EmptyTree {
                program: program.value().to_string(),
            });
        }

        if let Some(vars) = program.left() {
            let found = self.node(vars).value();
            if found != "var" {
                return Err(CodegenError::MissingDeclarations {
                    found: found.to_string(),
                });
            }
            self.emit_declarations(vars)?;
        }

        self.instrs.push(Instr::Section(Section::Text));
        self.instrs.push(Instr::Entry);
        if let Some(body) = program.right() {
            self.emit_chain(body)?;
        }
        self.instrs.push(Instr::Return);
        Ok(())
    }

    pub fn instructions(&self) -> &[Instr] {
        &self.instrs
    }

    pub fn into_instructions(self) -> Vec<Instr> {
        self.instrs
    }

    // ===== Helper methods =====

    pub(crate) fn node(&self, id: NodeId) -> &'a Node {
        let tree: &'a SyntaxTree = self.tree;
        &tree[id]
    }

    /// Required child of `id`; its absence means the tree is malformed
    pub(crate) fn child(&self, id: NodeId, child: Option<NodeId>) -> Result<NodeId, CodegenError> {
        child.ok_or_else(|| CodegenError::MalformedNode {
            node: self.node(id).value().to_string(),
        })
    }

    pub(crate) fn symbol(&self, name: &str) -> Result<&'a Symbol, CodegenError> {
        let symbols: &'a SymbolTable = self.symbols;
        symbols
            .get(name)
            .ok_or_else(|| CodegenError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    /// Storage width of a scalar or of one array element
    pub(crate) fn width_of(symbol: &Symbol) -> Result<Width, CodegenError> {
        match symbol.declared_type.size() {
            4 => Ok(Width::Long),
            1 => Ok(Width::Byte),
            _ => Err(CodegenError::MissingType {
                name: symbol.name.clone(),
            }),
        }
    }

    /// Literal value of a leaf, if it is one
    pub(crate) fn literal(value: &str) -> Option<i64> {
        match value {
            "true" => Some(1),
            "false" => Some(0),
            _ => constant_value(value),
        }
    }

    /// Operand for a leaf: an immediate for literals, memory for variables
    pub(crate) fn leaf_operand(&self, value: &str) -> Result<(Operand, Width), CodegenError> {
        if let Some(literal) = Self::literal(value) {
            return Ok((Operand::Imm(literal), Width::Long));
        }
        if value.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
            return Err(CodegenError::MalformedNode {
                node: value.to_string(),
            });
        }
        let symbol = self.symbol(value)?;
        if symbol.is_array {
            return Err(CodegenError::MalformedNode {
                node: value.to_string(),
            });
        }
        Ok((Operand::Var(value.to_string()), Self::width_of(symbol)?))
    }

    /// Load a leaf into `reg`
    pub(crate) fn load_leaf(&mut self, value: &str, reg: Register) -> Result<(), CodegenError> {
        let (src, width) = self.leaf_operand(value)?;
        self.instrs.push(Instr::Move {
            src,
            dst: Operand::Reg(reg),
            width,
        });
        Ok(())
    }
}

/// Lower a parsed program to instructions
pub fn generate(tree: &SyntaxTree, symbols: &SymbolTable) -> Result<Vec<Instr>, CodegenError> {
    let mut generator = Generator::new(tree, symbols);
    generator.generate()?;
    Ok(generator.into_instructions())
}
