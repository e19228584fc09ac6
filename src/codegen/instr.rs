//! Abstract instruction model
//!
//! The generator produces a flat list of [`Instr`] for a two-register stack
//! machine. Nothing here knows mnemonic spelling or register names; the
//! emitter renders instructions through a backend profile.

/// Output section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Data,
    Bss,
    Text,
}

/// Operand width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// 4 bytes, integers
    Long,
    /// 1 byte, booleans
    Byte,
}

impl Width {
    pub fn bytes(self) -> i64 {
        match self {
            Width::Long => 4,
            Width::Byte => 1,
        }
    }
}

/// The two working registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// Accumulator and result register
    Primary,
    /// Second operand and index register
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Imm(i64),
    Var(String),
    Reg(Register),
}

/// Binary operations with a direct lowering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Xor,
}

impl ArithOp {
    /// Operation for a source operator, if it has one
    pub fn from_operator(op: &str) -> Option<ArithOp> {
        match op {
            "+" => Some(ArithOp::Add),
            "-" => Some(ArithOp::Sub),
            "*" => Some(ArithOp::Mul),
            "div" | "/" => Some(ArithOp::Div),
            "and" => Some(ArithOp::And),
            "or" => Some(ArithOp::Or),
            "xor" => Some(ArithOp::Xor),
            _ => None,
        }
    }

    /// Whether the remainder register must be cleared first
    pub fn clears_remainder(self) -> bool {
        matches!(self, ArithOp::Mul | ArithOp::Div)
    }
}

/// Branch condition, read as `lhs <cond> rhs`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Condition {
    pub fn from_operator(op: &str) -> Option<Condition> {
        match op {
            "=" => Some(Condition::Eq),
            "<>" => Some(Condition::Ne),
            "<" => Some(Condition::Lt),
            "<=" => Some(Condition::Le),
            ">" => Some(Condition::Gt),
            ">=" => Some(Condition::Ge),
            _ => None,
        }
    }

    /// Condition that holds exactly when `self` does not
    pub fn negate(self) -> Condition {
        match self {
            Condition::Eq => Condition::Ne,
            Condition::Ne => Condition::Eq,
            Condition::Lt => Condition::Ge,
            Condition::Le => Condition::Gt,
            Condition::Gt => Condition::Le,
            Condition::Ge => Condition::Lt,
        }
    }
}

/// One abstract instruction or directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    Section(Section),
    /// Program entry point
    Entry,
    Label(String),
    /// Storage with an initial value
    Initialized { name: String, width: Width, value: i64 },
    /// Zero-initialized storage of `size` bytes
    Reserved { name: String, size: i64 },
    Move { src: Operand, dst: Operand, width: Width },
    Push(Operand),
    Pop(Register),
    /// Clear the remainder register before `*` and `div`
    ClearRemainder,
    /// `dst = dst <op> src`
    Arith { op: ArithOp, src: Operand, dst: Register },
    Compare { lhs: Register, rhs: Operand },
    Jump(String),
    Branch { cond: Condition, target: String },
    /// `dst = array[index]`, with `index` already rebased to zero
    LoadElement { array: String, index: Register, dst: Register, width: Width },
    /// `array[index] = src`, with `index` already rebased to zero
    StoreElement { array: String, index: Register, src: Register, width: Width },
    Return,
}
