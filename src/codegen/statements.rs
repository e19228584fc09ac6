//! Statement lowering
//!
//! Walks a `begin` chain and lowers each statement root hanging off its
//! links. Assignments, conditionals, `goto`, labels and nested compounds are
//! lowered; any other statement stops generation.

use crate::codegen::errors::CodegenError;
use crate::codegen::generator::Generator;
use crate::codegen::instr::{Condition, Instr, Operand, Register};
use crate::parser::ast::NodeId;

impl Generator<'_> {
    /// Lower every statement of a `begin` chain up to its `end` node
    pub(crate) fn emit_chain(&mut self, begin: NodeId) -> Result<(), CodegenError> {
        let mut link = self.node(begin).right();
        while let Some(current) = link {
            let node = self.node(current);
            if matches!(node.value(), "end" | "end.") {
                break;
            }
            if let Some(statement) = node.left() {
                self.emit_statement(statement)?;
            }
            link = node.right();
        }
        Ok(())
    }

    pub(crate) fn emit_statement(&mut self, id: NodeId) -> Result<(), CodegenError> {
        let node = self.node(id);
        match node.value() {
            ":=" => self.emit_assignment(id),
            "if" => self.emit_conditional(id),
            "begin" => self.emit_chain(id),
            "goto" => {
                let label = self.child(id, node.left())?;
                let target = self.node(label).value().to_string();
                self.instrs.push(Instr::Jump(target));
                Ok(())
            }
            "label" => {
                let label = self.child(id, node.left())?;
                let name = self.node(label).value().to_string();
                self.instrs.push(Instr::Label(name));
                match node.right() {
                    Some(statement) => self.emit_statement(statement),
                    None => Ok(()),
                }
            }
            other => Err(CodegenError::UnsupportedStatement {
                statement: other.to_string(),
            }),
        }
    }

    /// `target := expr`
    fn emit_assignment(&mut self, id: NodeId) -> Result<(), CodegenError> {
        let node = self.node(id);
        let target = self.node(self.child(id, node.left())?);
        let rhs = self.child(id, node.right())?;

        if target.value() == "[]" {
            let array = self.child(id, target.left())?;
            let index = self.child(id, target.right())?;
            self.emit_value(rhs)?;
            return self.emit_element_store(self.node(array).value(), index);
        }

        let symbol = self.symbol(target.value())?;
        if symbol.is_array {
            return Err(CodegenError::MalformedNode {
                node: target.value().to_string(),
            });
        }
        let width = Self::width_of(symbol)?;
        let dst = Operand::Var(target.value().to_string());

        let rhs_node = self.node(rhs);
        if rhs_node.is_leaf() {
            match self.leaf_operand(rhs_node.value())? {
                (Operand::Imm(value), _) => {
                    self.instrs.push(Instr::Move {
                        src: Operand::Imm(value),
                        dst,
                        width,
                    });
                    return Ok(());
                }
                _ => self.load_leaf(rhs_node.value(), Register::Primary)?,
            }
        } else {
            self.emit_value(rhs)?;
            self.instrs.push(Instr::Pop(Register::Primary));
        }

        self.instrs.push(Instr::Move {
            src: Operand::Reg(Register::Primary),
            dst,
            width,
        });
        Ok(())
    }

    /// `if cond then stmt [else stmt]`, branching on the negated condition
    fn emit_conditional(&mut self, id: NodeId) -> Result<(), CodegenError> {
        let number = self.label_count;
        self.label_count += 1;
        let nope = format!("_nope{number}_");
        let end = format!("_end{number}_");

        let node = self.node(id);
        let cond = self.child(id, node.left())?;
        let then_node = self.node(self.child(id, node.right())?);
        let else_node = then_node.right().map(|e| self.node(e));

        self.emit_branch_if_false(cond, &nope)?;

        if let Some(statement) = then_node.left() {
            self.emit_statement(statement)?;
        }
        if else_node.is_some() {
            self.instrs.push(Instr::Jump(end.clone()));
        }
        self.instrs.push(Instr::Label(nope));
        if let Some(statement) = else_node.and_then(|e| e.left()) {
            self.emit_statement(statement)?;
        }
        self.instrs.push(Instr::Label(end));
        Ok(())
    }

    /// Jump to `target` when the condition rooted at `cond` does not hold
    fn emit_branch_if_false(&mut self, cond: NodeId, target: &str) -> Result<(), CodegenError> {
        let node = self.node(cond);

        if node.is_leaf() {
            self.load_leaf(node.value(), Register::Primary)?;
        } else if let Some(condition) = Condition::from_operator(node.value()) {
            let lhs = self.child(cond, node.left())?;
            let rhs = self.child(cond, node.right())?;
            self.emit_value(lhs)?;
            self.emit_value(rhs)?;
            self.instrs.push(Instr::Pop(Register::Secondary));
            self.instrs.push(Instr::Pop(Register::Primary));
            self.instrs.push(Instr::Compare {
                lhs: Register::Primary,
                rhs: Operand::Reg(Register::Secondary),
            });
            self.instrs.push(Instr::Branch {
                cond: condition.negate(),
                target: target.to_string(),
            });
            return Ok(());
        } else {
            self.emit_value(cond)?;
            self.instrs.push(Instr::Pop(Register::Primary));
        }

        self.instrs.push(Instr::Compare {
            lhs: Register::Primary,
            rhs: Operand::Imm(0),
        });
        self.instrs.push(Instr::Branch {
            cond: Condition::Eq,
            target: target.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::codegen::errors::CodegenError;
    use crate::codegen::generator::generate;
    use crate::codegen::instr::{Condition, Instr, Operand, Register, Width};
    use crate::parser::Parser;

    fn body(source: &str) -> Result<Vec<Instr>, CodegenError> {
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();
        let instrs = generate(&program.tree, &program.symbols)?;
        let start = instrs.iter().position(|i| *i == Instr::Entry).unwrap() + 1;
        Ok(instrs[start..instrs.len() - 1].to_vec())
    }

    fn labels(instrs: &[Instr]) -> Vec<&str> {
        instrs
            .iter()
            .filter_map(|i| match i {
                Instr::Label(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_literal_assignment_is_direct() {
        let instrs = body("program P; var a : integer; begin a := 1; end.").unwrap();
        assert_eq!(
            instrs,
            vec![Instr::Move {
                src: Operand::Imm(1),
                dst: Operand::Var("a".to_string()),
                width: Width::Long
            }]
        );
    }

    #[test]
    fn test_boolean_assignment_from_variable() {
        let instrs = body("program P; var f, g : boolean; begin f := g; end.").unwrap();
        assert_eq!(
            instrs,
            vec![
                Instr::Move {
                    src: Operand::Var("g".to_string()),
                    dst: Operand::Reg(Register::Primary),
                    width: Width::Byte
                },
                Instr::Move {
                    src: Operand::Reg(Register::Primary),
                    dst: Operand::Var("f".to_string()),
                    width: Width::Byte
                },
            ]
        );
    }

    #[test]
    fn test_if_else_labels_and_branch() {
        let instrs = body(
            "program P; var a, b, c : integer; begin if a > b then c := 1 else c := 0; end.",
        )
        .unwrap();
        assert_eq!(labels(&instrs), vec!["_nope1_", "_end1_"]);
        assert!(instrs.contains(&Instr::Branch {
            cond: Condition::Le,
            target: "_nope1_".to_string()
        }));
        assert!(instrs.contains(&Instr::Jump("_end1_".to_string())));
    }

    #[test]
    fn test_if_without_else_skips_jump() {
        let instrs = body("program P; var a : integer; begin if a = 0 then a := 1; end.").unwrap();
        assert_eq!(labels(&instrs), vec!["_nope1_", "_end1_"]);
        assert!(!instrs.iter().any(|i| matches!(i, Instr::Jump(_))));
    }

    #[test]
    fn test_nested_conditionals_get_unique_labels() {
        let instrs = body(
            "program P; var a, b : integer; \
             begin if a > 0 then if b > 0 then a := 1 else a := 2; if a < 3 then b := 0; end.",
        )
        .unwrap();
        assert_eq!(
            labels(&instrs),
            vec!["_nope2_", "_end2_", "_nope1_", "_end1_", "_nope3_", "_end3_"]
        );
    }

    #[test]
    fn test_boolean_condition() {
        let instrs = body("program P; var f : boolean; a : integer; begin if f then a := 1; end.")
            .unwrap();
        assert_eq!(
            &instrs[..3],
            &[
                Instr::Move {
                    src: Operand::Var("f".to_string()),
                    dst: Operand::Reg(Register::Primary),
                    width: Width::Byte
                },
                Instr::Compare {
                    lhs: Register::Primary,
                    rhs: Operand::Imm(0)
                },
                Instr::Branch {
                    cond: Condition::Eq,
                    target: "_nope1_".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_goto_and_label() {
        let instrs =
            body("program P; var a : integer; begin goto done; a := 1; done : a := 2; end.")
                .unwrap();
        assert_eq!(instrs[0], Instr::Jump("done".to_string()));
        assert_eq!(instrs[2], Instr::Label("done".to_string()));
    }

    #[test]
    fn test_loops_are_not_lowered() {
        let err = body("program P; var i : integer; begin for i := 1 to 3 do i := i; end.")
            .unwrap_err();
        assert_eq!(
            err,
            CodegenError::UnsupportedStatement {
                statement: "for".to_string()
            }
        );
    }

    #[test]
    fn test_undefined_target() {
        let mut parser = Parser::new("program P; var a : integer; begin z := 1; end.").unwrap();
        let program = parser.parse_program().unwrap();
        let err = generate(&program.tree, &program.symbols).unwrap_err();
        assert_eq!(
            err,
            CodegenError::UndefinedVariable {
                name: "z".to_string()
            }
        );
    }
}
