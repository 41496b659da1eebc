// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Display implementations for the IR. The output is stable and is what
//! tests and trace logs compare against.

use std::fmt;

use crate::*;

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Bool => write!(f, "bool"),
            Type::Int { bits, signed: true } => write!(f, "i{}", bits),
            Type::Int { bits, signed: false } => write!(f, "u{}", bits),
            Type::Float { bits } => write!(f, "f{}", bits),
            Type::String => write!(f, "string"),
            Type::Pointer(elem) => write!(f, "*{}", elem),
            Type::Array { elem, len } => write!(f, "[{}; {}]", elem, len),
            Type::Tuple(elems) => {
                write!(f, "(")?;
                comma_list(f, elems)?;
                write!(f, ")")
            }
            Type::Map { key, value } => write!(f, "map[{}]{}", key, value),
            Type::Struct(s) => write!(f, "{}", s.name),
            Type::Function(func) => {
                write!(f, "fn(")?;
                comma_list(f, &func.params)?;
                write!(f, ") -> {}", func.ret)
            }
            Type::Meta => write!(f, "type"),
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{}", v),
            ConstValue::Uint(v) => write!(f, "{}", v),
            ConstValue::Float(v) => write!(f, "{:?}", v),
            ConstValue::Bool(v) => write!(f, "{}", v),
            ConstValue::String(s) => write!(f, "{:?}", s),
            ConstValue::Array(items) => {
                write!(f, "[")?;
                comma_list(f, items)?;
                write!(f, "]")
            }
            ConstValue::Tuple(items) => {
                write!(f, "(")?;
                comma_list(f, items)?;
                write!(f, ")")
            }
            ConstValue::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            ConstValue::Struct(fields) => {
                write!(f, "{{")?;
                for (i, (name, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, v)?;
                }
                write!(f, "}}")
            }
            ConstValue::Type(ty) => write!(f, "type({})", ty),
            ConstValue::Unit => write!(f, "()"),
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sym = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        };
        write!(f, "{}", sym)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sym = match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        };
        write!(f, "{}", sym)
    }
}

/// Operand position: compound operands get parentheses.
struct Operand<'a>(&'a Expr);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            ExprKind::Binary { .. } | ExprKind::Assign { .. } | ExprKind::Range { .. } => {
                write!(f, "({})", self.0)
            }
            _ => write!(f, "{}", self.0),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(value) => write!(f, "{}", value),
            ExprKind::ArrayLiteral(items) => {
                write!(f, "[")?;
                comma_list(f, items)?;
                write!(f, "]")
            }
            ExprKind::TupleLiteral(items) => {
                write!(f, "(")?;
                comma_list(f, items)?;
                write!(f, ")")
            }
            ExprKind::MapLiteral(entries) => {
                write!(f, "{}{{", self.ty)?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            ExprKind::StructLiteral(fields) => {
                write!(f, "{} {{", self.ty)?;
                for (i, (name, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", name, v)?;
                }
                write!(f, " }}")
            }
            ExprKind::Identifier(symbol) => write!(f, "{}", symbol.name),
            ExprKind::Binary { op, left, right } => {
                write!(f, "{} {} {}", Operand(left), op, Operand(right))
            }
            ExprKind::Unary { op, operand } => write!(f, "{}{}", op, Operand(operand)),
            ExprKind::Call { callee, args } => {
                write!(f, "{}(", Operand(callee))?;
                comma_list(f, args)?;
                write!(f, ")")
            }
            ExprKind::Field { object, field } => write!(f, "{}.{}", Operand(object), field),
            ExprKind::Index { object, index } => write!(f, "{}[{}]", Operand(object), index),
            ExprKind::Assign { target, value } => write!(f, "{} = {}", target, value),
            ExprKind::Conversion {
                kind: ConversionKind::BitCast,
                value,
            } => write!(f, "bitcast<{}>({})", self.ty, value),
            ExprKind::Conversion {
                kind: ConversionKind::Numeric,
                value,
            } => write!(f, "{}({})", self.ty, value),
            ExprKind::Range {
                start,
                end,
                inclusive,
            } => {
                let dots = if *inclusive { "..=" } else { ".." };
                write!(f, "{}{}{}", Operand(start), dots, Operand(end))
            }
            ExprKind::Block(block) => write!(f, "{}", block),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                write!(f, "if {} {}", cond, then_branch)?;
                if let Some(else_branch) = else_branch {
                    write!(f, " else {}", else_branch)?;
                }
                Ok(())
            }
            ExprKind::While { cond, body } => write!(f, "while {} {}", cond, body),
            ExprKind::For {
                binding,
                iterable,
                body,
            } => write!(f, "for {} in {} {}", binding.name, iterable, body),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, stmt) in self.statements.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            write!(f, " {}", stmt)?;
        }
        write!(f, " }}")
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::VariableDeclaration { symbol, value } => {
                write!(f, "var {}: {}", symbol.name, symbol.ty)?;
                if let Some(value) = value {
                    write!(f, " = {}", value)?;
                }
                Ok(())
            }
            Stmt::Expression(e) => write!(f, "{}", e),
            Stmt::Return(None) => write!(f, "return"),
            Stmt::Return(Some(e)) => write!(f, "return {}", e),
            Stmt::Break(None) => write!(f, "break"),
            Stmt::Break(Some(e)) => write!(f, "break {}", e),
            Stmt::Continue => write!(f, "continue"),
            Stmt::Yield(e) => write!(f, "yield {}", e),
            Stmt::Label(label) => write!(f, "{}:", label),
            Stmt::Goto(label) => write!(f, "goto {}", label),
            Stmt::GotoIf { condition, label } => write!(f, "if {} goto {}", condition, label),
        }
    }
}

fn comma_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Render a statement list one statement per line; labels are flush left and
/// everything else is indented.
pub fn render_statements(stmts: &[Stmt]) -> String {
    let mut out = String::new();
    for stmt in stmts {
        if !matches!(stmt, Stmt::Label(_)) {
            out.push_str("    ");
        }
        out.push_str(&stmt.to_string());
        out.push('\n');
    }
    out
}
