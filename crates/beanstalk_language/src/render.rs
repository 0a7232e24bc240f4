//! Text rendering for parse trees and rule trees.
//!
//! [`render`] prints canonical source: parsing its output gives back an equal
//! [`Expr`]. [`pretty`] prints a resolved [`Node`] as an s-expression for
//! diagnostics and logs.

use std::fmt::Write;

use crate::ast::Node;
use crate::expr::{BoolOp, Expr};
use crate::symbols::SymbolTable;

const OR: u8 = 1;
const AND: u8 = 2;
const NOT: u8 = 3;
const COMPARE: u8 = 4;
const POSTFIX: u8 = 5;
const ATOM: u8 = 7;

/// Renders `expr` as source text with only the parentheses it needs.
#[must_use]
pub fn render(expr: &Expr) -> String {
    let mut out = String::new();
    render_into(&mut out, expr, 0);
    out
}

fn power(expr: &Expr) -> u8 {
    match expr {
        Expr::BoolOp { op: BoolOp::Or, .. } => OR,
        Expr::BoolOp { op: BoolOp::And, .. } => AND,
        Expr::Not(_) => NOT,
        Expr::BinOp { .. } => COMPARE,
        Expr::Subscript { .. } | Expr::Call { .. } => POSTFIX,
        _ => ATOM,
    }
}

fn render_into(out: &mut String, expr: &Expr, min: u8) {
    if power(expr) < min {
        out.push('(');
        render_into(out, expr, 0);
        out.push(')');
        return;
    }

    match expr {
        Expr::Identifier(name) => out.push_str(name),
        Expr::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Expr::Str(s) => {
            let _ = write!(out, "'{s}'");
        }
        Expr::Bool(true) => out.push_str("True"),
        Expr::Bool(false) => out.push_str("False"),
        Expr::Call { callee, args } => {
            render_into(out, callee, POSTFIX);
            out.push('(');
            render_list(out, args);
            out.push(')');
        }
        Expr::Subscript { target, index } => {
            render_into(out, target, POSTFIX);
            out.push('[');
            render_into(out, index, 0);
            out.push(']');
        }
        Expr::Tuple(items) => {
            out.push('(');
            render_list(out, items);
            out.push(')');
        }
        Expr::Not(inner) => {
            out.push_str("not ");
            render_into(out, inner, NOT);
        }
        Expr::BinOp { op, lhs, rhs } => {
            render_into(out, lhs, COMPARE);
            let _ = write!(out, " {} ", op.symbol());
            render_into(out, rhs, COMPARE + 1);
        }
        Expr::BoolOp { op, lhs, rhs } => {
            let p = power(expr);
            render_into(out, lhs, p);
            let _ = write!(out, " {} ", op.keyword());
            render_into(out, rhs, p + 1);
        }
    }
}

fn render_list(out: &mut String, items: &[Expr]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        render_into(out, item, 0);
    }
}

/// Renders `node` as an s-expression, resolving names through `symbols`.
///
/// `Every[has(Bow, 1), is_adult()]` prints as `(every (has Bow 1) (is_adult))`.
#[must_use]
pub fn pretty(node: &Node, symbols: &SymbolTable) -> String {
    let mut out = String::new();
    pretty_into(&mut out, node, symbols);
    out
}

fn pretty_into(out: &mut String, node: &Node, symbols: &SymbolTable) {
    match node {
        Node::AnyOf(items) => pretty_list(out, "any-of", items, symbols),
        Node::Every(items) => pretty_list(out, "every", items, symbols),
        Node::Compare { op, lhs, rhs } => {
            let _ = write!(out, "({} ", op.symbol());
            pretty_into(out, lhs, symbols);
            out.push(' ');
            pretty_into(out, rhs, symbols);
            out.push(')');
        }
        Node::Identifier(id) => out.push_str(symbols.name_of(*id)),
        Node::Invert(inner) => {
            out.push_str("(not ");
            pretty_into(out, inner, symbols);
            out.push(')');
        }
        Node::Invoke { target, args } => {
            out.push('(');
            pretty_into(out, target, symbols);
            for arg in args {
                out.push(' ');
                pretty_into(out, arg, symbols);
            }
            out.push(')');
        }
        Node::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Node::Str(s) => {
            let _ = write!(out, "{s:?}");
        }
        Node::Bool(b) => out.push_str(if *b { "True" } else { "False" }),
    }
}

fn pretty_list(out: &mut String, head: &str, items: &[Node], symbols: &SymbolTable) {
    out.push('(');
    out.push_str(head);
    for item in items {
        out.push(' ');
        pretty_into(out, item, symbols);
    }
    out.push(')');
}
