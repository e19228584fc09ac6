//! Text rendering of instructions in GNU `as` syntax

use crate::codegen::instr::{ArithOp, Condition, Instr, Operand, Register, Section, Width};
use crate::codegen::profile::BackendProfile;
use std::fmt::Write as _;

const INDENT: &str = "    ";

/// Render `instrs` as assembler source, one instruction per line
pub fn render(instrs: &[Instr], profile: &BackendProfile) -> String {
    let emitter = Emitter { profile };
    let mut out = String::new();
    for instr in instrs {
        emitter.write_instr(&mut out, instr);
    }
    out
}

struct Emitter<'a> {
    profile: &'a BackendProfile,
}

impl Emitter<'_> {
    fn write_instr(&self, out: &mut String, instr: &Instr) {
        let _ = match instr {
            Instr::Section(section) => writeln!(out, "{}", self.section(*section)),
            Instr::Entry => {
                let entry = &self.profile.entry_label;
                writeln!(out, "{INDENT}.globl {entry}\n{entry}:")
            }
            Instr::Label(name) => writeln!(out, "{name}:"),
            Instr::Initialized { name, width, value } => {
                let directive = match width {
                    Width::Long => ".long",
                    Width::Byte => ".byte",
                };
                writeln!(out, "{name}: {directive} {value}")
            }
            Instr::Reserved { name, size } => writeln!(out, "{name}: .space {size}"),
            Instr::Move { src, dst, width } => {
                writeln!(out, "{INDENT}{}", self.mov(src, dst, *width))
            }
            Instr::Push(operand) => writeln!(out, "{INDENT}pushl {}", self.operand(operand)),
            Instr::Pop(reg) => writeln!(out, "{INDENT}popl {}", self.register(*reg)),
            Instr::ClearRemainder => writeln!(out, "{INDENT}{}", self.profile.remainder_clear),
            Instr::Arith { op, src, dst } => {
                let src = self.operand(src);
                let dst = self.register(*dst);
                match op {
                    ArithOp::Div => writeln!(out, "{INDENT}idivl {src}"),
                    _ => writeln!(out, "{INDENT}{} {src}, {dst}", arith_mnemonic(*op)),
                }
            }
            Instr::Compare { lhs, rhs } => {
                writeln!(out, "{INDENT}cmpl {}, {}", self.operand(rhs), self.register(*lhs))
            }
            Instr::Jump(target) => writeln!(out, "{INDENT}jmp {target}"),
            Instr::Branch { cond, target } => {
                writeln!(out, "{INDENT}{} {target}", branch_mnemonic(*cond))
            }
            Instr::LoadElement {
                array,
                index,
                dst,
                width,
            } => {
                let index = self.register(*index);
                let dst = self.register(*dst);
                match width {
                    Width::Long => writeln!(out, "{INDENT}movl {array}(,{index},4), {dst}"),
                    Width::Byte => writeln!(out, "{INDENT}movzbl {array}(,{index},1), {dst}"),
                }
            }
            Instr::StoreElement {
                array,
                index,
                src,
                width,
            } => {
                let index = self.register(*index);
                match width {
                    Width::Long => writeln!(
                        out,
                        "{INDENT}movl {}, {array}(,{index},4)",
                        self.register(*src)
                    ),
                    Width::Byte => writeln!(
                        out,
                        "{INDENT}movb {}, {array}(,{index},1)",
                        low_byte(self.register(*src))
                    ),
                }
            }
            Instr::Return => writeln!(out, "{INDENT}{}", self.profile.return_opcode),
        };
    }

    fn section(&self, section: Section) -> &str {
        match section {
            Section::Data => &self.profile.data_section,
            Section::Bss => &self.profile.bss_section,
            Section::Text => &self.profile.text_section,
        }
    }

    fn register(&self, reg: Register) -> &str {
        match reg {
            Register::Primary => &self.profile.primary_register,
            Register::Secondary => &self.profile.secondary_register,
        }
    }

    fn operand(&self, operand: &Operand) -> String {
        match operand {
            Operand::Imm(value) => format!("${value}"),
            Operand::Var(name) => name.clone(),
            Operand::Reg(reg) => self.register(*reg).to_string(),
        }
    }

    fn mov(&self, src: &Operand, dst: &Operand, width: Width) -> String {
        let (s, d) = (self.operand(src), self.operand(dst));
        match (width, src, dst) {
            (Width::Long, _, _) => format!("movl {s}, {d}"),
            (Width::Byte, Operand::Var(_), Operand::Reg(_)) => format!("movzbl {s}, {d}"),
            (Width::Byte, Operand::Reg(_), Operand::Var(_)) => format!("movb {}, {d}", low_byte(&s)),
            (Width::Byte, Operand::Imm(_), Operand::Var(_)) => format!("movb {s}, {d}"),
            (Width::Byte, _, _) => format!("movl {s}, {d}"),
        }
    }
}

fn arith_mnemonic(op: ArithOp) -> &'static str {
    match op {
        ArithOp::Add => "addl",
        ArithOp::Sub => "subl",
        ArithOp::Mul => "imull",
        ArithOp::Div => "idivl",
        ArithOp::And => "andl",
        ArithOp::Or => "orl",
        ArithOp::Xor => "xorl",
    }
}

fn branch_mnemonic(cond: Condition) -> &'static str {
    match cond {
        Condition::Eq => "je",
        Condition::Ne => "jne",
        Condition::Lt => "jl",
        Condition::Le => "jle",
        Condition::Gt => "jg",
        Condition::Ge => "jge",
    }
}

/// Low byte of a 32-bit general register (`%eax` -> `%al`)
fn low_byte(reg: &str) -> String {
    let bytes = reg.as_bytes();
    if bytes.len() == 4 && reg.starts_with("%e") && bytes[3] == b'x' {
        format!("%{}l", bytes[2] as char)
    } else {
        reg.to_string()
    }
}
