//! Code generation
//!
//! Lowers a parsed program to assembler text in two steps:
//! - [`generator`]: walks the syntax tree and produces abstract [`instr::Instr`]s
//! - [`emit`]: renders instructions using a [`profile::BackendProfile`]
//!
//! Lowering covers storage for every declared variable, assignments,
//! arithmetic and logical expressions, array elements, `if/then/else`,
//! `goto` and labels. Loops are parsed but not lowered.

pub mod emit;
pub mod errors;
pub mod generator;
pub mod instr;
pub mod profile;

mod declarations;
mod expressions;
mod statements;

pub use errors::CodegenError;
pub use generator::Generator;
pub use profile::BackendProfile;

/// Lower `tree` and render it with `profile`
pub fn compile_tree(
    tree: &crate::parser::ast::SyntaxTree,
    symbols: &crate::parser::symbols::SymbolTable,
    profile: &BackendProfile,
) -> Result<String, CodegenError> {
    let instrs = generator::generate(tree, symbols)?;
    Ok(emit::render(&instrs, profile))
}
