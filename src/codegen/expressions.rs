//! Expression lowering
//!
//! Stack-machine evaluation: every expression leaves exactly one value
//! pushed. Binary operators evaluate left then right, pop both into the two
//! working registers, combine into the primary register and push the result.
//!
//! The postorder walk keeps its own frame stack, so a long flat chain such
//! as `1+1+...+1` costs heap, not call depth.

use crate::codegen::errors::CodegenError;
use crate::codegen::generator::Generator;
use crate::codegen::instr::{ArithOp, Instr, Operand, Register, Width};
use crate::parser::ast::NodeId;

/// One pending step of the postorder walk
enum Frame {
    /// Subtree not yet visited
    Enter(NodeId),
    /// Both operands pushed; combine them
    Combine(ArithOp),
    /// Index pushed; load the element of `array`
    LoadElement(NodeId),
}

impl Generator<'_> {
    /// Evaluate the subtree at `id` and push its value
    pub(crate) fn emit_value(&mut self, id: NodeId) -> Result<(), CodegenError> {
        let mut pending = vec![Frame::Enter(id)];

        while let Some(frame) = pending.pop() {
            match frame {
                Frame::Enter(current) => self.enter_value(current, &mut pending)?,
                Frame::Combine(op) => {
                    self.instrs.push(Instr::Pop(Register::Secondary));
                    self.instrs.push(Instr::Pop(Register::Primary));
                    if op.clears_remainder() {
                        self.instrs.push(Instr::ClearRemainder);
                    }
                    self.instrs.push(Instr::Arith {
                        op,
                        src: Operand::Reg(Register::Secondary),
                        dst: Register::Primary,
                    });
                    self.instrs.push(Instr::Push(Operand::Reg(Register::Primary)));
                }
                Frame::LoadElement(array) => {
                    let array = self.node(array).value();
                    let (min, width) = self.element_layout(array)?;
                    self.rebase_index(min);
                    self.instrs.push(Instr::LoadElement {
                        array: array.to_string(),
                        index: Register::Secondary,
                        dst: Register::Primary,
                        width,
                    });
                    self.instrs.push(Instr::Push(Operand::Reg(Register::Primary)));
                }
            }
        }
        Ok(())
    }

    /// Push a leaf's value, or schedule the frames of an inner node
    fn enter_value(&mut self, id: NodeId, pending: &mut Vec<Frame>) -> Result<(), CodegenError> {
        let node = self.node(id);

        if node.is_leaf() {
            match self.leaf_operand(node.value())? {
                (Operand::Imm(value), _) => self.instrs.push(Instr::Push(Operand::Imm(value))),
                _ => {
                    self.load_leaf(node.value(), Register::Primary)?;
                    self.instrs.push(Instr::Push(Operand::Reg(Register::Primary)));
                }
            }
            return Ok(());
        }

        if node.value() == "[]" {
            let array = self.child(id, node.left())?;
            let index = self.child(id, node.right())?;
            pending.push(Frame::LoadElement(array));
            pending.push(Frame::Enter(index));
            return Ok(());
        }

        let op = ArithOp::from_operator(node.value()).ok_or_else(|| {
            CodegenError::UnknownOperator {
                operator: node.value().to_string(),
            }
        })?;
        let lhs = self.child(id, node.left())?;
        let rhs = self.child(id, node.right())?;

        pending.push(Frame::Combine(op));
        pending.push(Frame::Enter(rhs));
        pending.push(Frame::Enter(lhs));
        Ok(())
    }

    /// Pop the value on top of the stack into `array[index]`
    pub(crate) fn emit_element_store(&mut self, array: &str, index: NodeId) -> Result<(), CodegenError> {
        let (min, width) = self.element_layout(array)?;
        self.emit_index(index, min)?;
        self.instrs.push(Instr::Pop(Register::Primary));
        self.instrs.push(Instr::StoreElement {
            array: array.to_string(),
            index: Register::Secondary,
            src: Register::Primary,
            width,
        });
        Ok(())
    }

    /// Evaluate an index into the secondary register, rebased to zero
    fn emit_index(&mut self, index: NodeId, min: i64) -> Result<(), CodegenError> {
        self.emit_value(index)?;
        self.rebase_index(min);
        Ok(())
    }

    /// Pop a pushed index into the secondary register and subtract `min`
    fn rebase_index(&mut self, min: i64) {
        self.instrs.push(Instr::Pop(Register::Secondary));
        if min != 0 {
            self.instrs.push(Instr::Arith {
                op: ArithOp::Sub,
                src: Operand::Imm(min),
                dst: Register::Secondary,
            });
        }
    }

    fn element_layout(&self, array: &str) -> Result<(i64, Width), CodegenError> {
        let symbol = self.symbol(array)?;
        if !symbol.is_array {
            return Err(CodegenError::MalformedNode {
                node: array.to_string(),
            });
        }
        Ok((symbol.range.0, Self::width_of(symbol)?))
    }
}
