//! Rendering strategies for function and operator nodes.

use crate::error::{GeoqueryError, Result};
use crate::expr::Function;
use crate::visitor::SqlVisitor;

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionEncoder {
    /// `alias(arg0, arg1, ...)`
    Call { alias: String },
    /// `alias`, for argument-less functions such as `CURRENT_TIMESTAMP`.
    NoArgs { alias: String },
    /// `alias` immediately followed by the single argument.
    UnaryOp { alias: String },
    /// `(arg0 alias arg1)`
    BinaryOp { alias: String },
    Template(TemplateEncoder),
}

impl FunctionEncoder {
    pub fn call(alias: impl Into<String>) -> Self {
        FunctionEncoder::Call {
            alias: alias.into(),
        }
    }

    pub fn no_args(alias: impl Into<String>) -> Self {
        FunctionEncoder::NoArgs {
            alias: alias.into(),
        }
    }

    pub fn unary_op(alias: impl Into<String>) -> Self {
        FunctionEncoder::UnaryOp {
            alias: alias.into(),
        }
    }

    pub fn binary_op(alias: impl Into<String>) -> Self {
        FunctionEncoder::BinaryOp {
            alias: alias.into(),
        }
    }

    pub fn template(alias: impl Into<String>, template: &str) -> Result<Self> {
        Ok(FunctionEncoder::Template(TemplateEncoder::new(alias, template)?))
    }

    /// Backend-specific name written for this function.
    pub fn alias(&self) -> &str {
        match self {
            FunctionEncoder::Call { alias }
            | FunctionEncoder::NoArgs { alias }
            | FunctionEncoder::UnaryOp { alias }
            | FunctionEncoder::BinaryOp { alias } => alias,
            FunctionEncoder::Template(t) => t.alias(),
        }
    }

    /// Appends the SQL for `function` to `out`, rendering arguments left to
    /// right through `visitor`.
    pub fn to_sql(
        &self,
        function: &Function,
        out: &mut String,
        visitor: &SqlVisitor<'_>,
    ) -> Result<()> {
        match self {
            FunctionEncoder::Call { alias } => {
                out.push_str(alias);
                out.push('(');
                for (idx, arg) in function.args().iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    visitor.visit_expression(arg, out)?;
                }
                out.push(')');
                Ok(())
            }
            FunctionEncoder::NoArgs { alias } => {
                expect_arity(function, 0)?;
                out.push_str(alias);
                Ok(())
            }
            FunctionEncoder::UnaryOp { alias } => {
                expect_arity(function, 1)?;
                out.push_str(alias);
                visitor.visit_expression(function.arg(0)?, out)
            }
            FunctionEncoder::BinaryOp { alias } => {
                expect_arity(function, 2)?;
                out.push('(');
                visitor.visit_expression(function.arg(0)?, out)?;
                out.push(' ');
                out.push_str(alias);
                out.push(' ');
                visitor.visit_expression(function.arg(1)?, out)?;
                out.push(')');
                Ok(())
            }
            FunctionEncoder::Template(template) => template.to_sql(function, out, visitor),
        }
    }
}

fn expect_arity(function: &Function, expected: usize) -> Result<()> {
    if function.num_args() == expected {
        Ok(())
    } else {
        Err(GeoqueryError::ArityMismatch {
            function: function.name().to_string(),
            expected,
            found: function.num_args(),
        })
    }
}

/// Encoder for irregular syntax such as `EXTRACT(field FROM source)`.
///
/// The template is split once, at construction, into literal chunks and
/// 1-based argument indexes: `"($1 FROM $2)"` becomes chunks `["(", " FROM ",
/// ")"]` and indexes `[1, 2]`. Chunk `i` is followed by argument
/// `indexes[i] - 1`; a trailing chunk has no argument after it.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateEncoder {
    alias: String,
    template: String,
    chunks: Vec<String>,
    arg_indexes: Vec<usize>,
}

impl TemplateEncoder {
    pub fn new(alias: impl Into<String>, template: &str) -> Result<Self> {
        let mut chunks = Vec::new();
        let mut arg_indexes = Vec::new();
        let mut chunk = String::new();
        let mut chars = template.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            if c != '$' {
                chunk.push(c);
                continue;
            }

            let mut digits = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if !d.is_ascii_digit() {
                    break;
                }
                digits.push(d);
                chars.next();
            }
            if digits.is_empty() {
                return Err(GeoqueryError::InvalidTemplate(format!(
                    "'$' at byte {pos} is not followed by an argument index in \"{template}\""
                )));
            }
            let index: usize = digits.parse().map_err(|_| {
                GeoqueryError::InvalidTemplate(format!(
                    "argument index ${digits} is out of range in \"{template}\""
                ))
            })?;
            if index == 0 {
                return Err(GeoqueryError::InvalidTemplate(format!(
                    "argument indexes start at $1, found $0 in \"{template}\""
                )));
            }

            chunks.push(std::mem::take(&mut chunk));
            arg_indexes.push(index);
        }

        if !chunk.is_empty() {
            chunks.push(chunk);
        }

        Ok(Self {
            alias: alias.into(),
            template: template.to_string(),
            chunks,
            arg_indexes,
        })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn placeholders(&self) -> usize {
        self.arg_indexes.len()
    }

    pub fn to_sql(
        &self,
        function: &Function,
        out: &mut String,
        visitor: &SqlVisitor<'_>,
    ) -> Result<()> {
        expect_arity(function, self.arg_indexes.len())?;

        out.push_str(&self.alias);
        // A template that opens with a placeholder reads as `ALIAS arg ...`.
        if !self.alias.is_empty() && self.template.starts_with('$') {
            out.push(' ');
        }

        for (i, chunk) in self.chunks.iter().enumerate() {
            out.push_str(chunk);
            if let Some(&index) = self.arg_indexes.get(i) {
                visitor.visit_expression(function.arg(index - 1)?, out)?;
            }
        }
        Ok(())
    }
}
