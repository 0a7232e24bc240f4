//! Lowering from the parse tree to the resolved rule tree.
//!
//! Every name is declared as it is met. Source sugar is desugared here:
//!
//! | Source | Lowered |
//! |---|---|
//! | `a and b` / `a or b` | flattened `Every` / `AnyOf` |
//! | `a > b` | `b < a` |
//! | `'Forest Temple' in dungeon_shortcuts` | `region_has_shortcuts('Forest Temple')` |
//! | `setting == value` | `compare_setting(code, setting, value)` |
//! | `logic_grottos_without_agony` | `is_trick_enabled('grottos_without_agony')` |
//! | `skipped_trials[Forest]` | `is_trial_skipped('Forest')` |
//! | `(Bow, 2)` | `has(Bow, 2)` |

use beanstalk_foundation::{Error, Result};

use crate::ast::{CompareOp, Node};
use crate::expr::{BinOp, BoolOp, Expr};
use crate::symbols::{SymbolKind, SymbolTable};

const DUNGEON_SHORTCUTS: &str = "dungeon_shortcuts";
const SKIPPED_TRIALS: &str = "skipped_trials";
const TRICK_PREFIX: &str = "logic_";
const TRICK_EXEMPT: &str = "logic_rules";

/// Lowers `expr`, declaring every name it mentions in `symbols`.
///
/// # Errors
/// Returns an error for source forms with no lowering, such as a call on a
/// non-name or an `in` against anything but `dungeon_shortcuts`, and for
/// declarations that conflict with the table.
pub fn lower(expr: Expr, symbols: &mut SymbolTable) -> Result<Node> {
    Lowerer { symbols }.lower(expr)
}

struct Lowerer<'a> {
    symbols: &'a mut SymbolTable,
}

impl Lowerer<'_> {
    fn lower(&mut self, expr: Expr) -> Result<Node> {
        match expr {
            Expr::Identifier(name) => self.identifier(&name),
            Expr::Number(n) => Ok(Node::Number(n)),
            Expr::Str(s) => Ok(Node::Str(s)),
            Expr::Bool(b) => Ok(Node::Bool(b)),
            Expr::Call { callee, args } => {
                let Expr::Identifier(name) = *callee else {
                    return Err(Error::optimization(format!(
                        "cannot call {callee:?}, only names are callable"
                    )));
                };
                let args = self.lower_all(args)?;
                self.call(&name, args)
            }
            Expr::Subscript { target, index } => self.subscript(*target, *index),
            Expr::Tuple(items) => {
                let args = self.lower_all(items)?;
                self.call("has", args)
            }
            Expr::Not(inner) => Ok(Node::invert(self.lower(*inner)?)),
            Expr::BinOp { op, lhs, rhs } => self.binop(op, *lhs, *rhs),
            Expr::BoolOp { op, lhs, rhs } => {
                let items = vec![self.lower(*lhs)?, self.lower(*rhs)?];
                Ok(match op {
                    BoolOp::And => Node::Every(items),
                    BoolOp::Or => Node::AnyOf(items),
                }
                .flatten())
            }
        }
    }

    fn lower_all(&mut self, exprs: Vec<Expr>) -> Result<Vec<Node>> {
        exprs.into_iter().map(|e| self.lower(e)).collect()
    }

    fn identifier(&mut self, name: &str) -> Result<Node> {
        if name != TRICK_EXEMPT {
            if let Some(trick) = name.strip_prefix(TRICK_PREFIX) {
                return self.call("is_trick_enabled", vec![Node::Str(trick.to_string())]);
            }
        }
        let id = self.symbols.declare(name, SymbolKind::Unknown)?;
        Ok(Node::Identifier(id))
    }

    fn call(&mut self, name: &str, args: Vec<Node>) -> Result<Node> {
        let id = self.symbols.declare(name, SymbolKind::Function)?;
        Ok(Node::invoke(id, args))
    }

    fn subscript(&mut self, target: Expr, index: Expr) -> Result<Node> {
        match (&target, &index) {
            (Expr::Identifier(t), Expr::Identifier(trial)) if t == SKIPPED_TRIALS => {
                self.call("is_trial_skipped", vec![Node::Str(trial.clone())])
            }
            _ => Err(Error::optimization(format!(
                "unsupported subscript {target:?}[{index:?}]"
            ))),
        }
    }

    fn binop(&mut self, op: BinOp, lhs: Expr, rhs: Expr) -> Result<Node> {
        let op = match op {
            BinOp::Contains => return self.contains(lhs, rhs),
            BinOp::Eq => CompareOp::Eq,
            BinOp::NotEq => CompareOp::Nq,
            BinOp::Lt => CompareOp::Lt,
            BinOp::Gt => return self.binop(BinOp::Lt, rhs, lhs),
        };

        let lhs = self.lower(lhs)?;
        let rhs = self.lower(rhs)?;
        if self.is_setting(&lhs) || self.is_setting(&rhs) {
            return self.call("compare_setting", vec![Node::Number(op.code()), lhs, rhs]);
        }
        Ok(Node::compare(op, lhs, rhs))
    }

    fn contains(&mut self, lhs: Expr, rhs: Expr) -> Result<Node> {
        match (lhs, rhs) {
            (Expr::Str(region), Expr::Identifier(collection)) if collection == DUNGEON_SHORTCUTS => {
                self.call("region_has_shortcuts", vec![Node::Str(region)])
            }
            (lhs, rhs) => Err(Error::optimization(format!(
                "unsupported membership test {lhs:?} in {rhs:?}"
            ))),
        }
    }

    fn is_setting(&self, node: &Node) -> bool {
        node.as_identifier()
            .is_some_and(|id| self.symbols.kind_of(id) == SymbolKind::Setting)
    }
}
