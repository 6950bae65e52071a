//! Mapping of IR type nodes to TypeScript type expressions.
//!
//! Resolution order for every node:
//!
//! 1. an override rule keyed by the node's Go type name,
//! 2. the primitive table,
//! 3. the structural rules for maps, sequences, pointers, optionals and
//!    anonymous structs,
//! 4. the fallback expression, annotated with the unresolved name.
//!
//! | Go | TypeScript |
//! |----|------------|
//! | `bool` | `boolean` |
//! | `string` | `string` |
//! | `uint32` (any sized number) | `number /* uint32 */` |
//! | `any`, `func`, `chan` | fallback |
//! | `[]T`, `[N]T` | `T[]` |
//! | `[]byte` | `string` |
//! | `map[K]V` | `{ [key: K]: V \| undefined }` |
//! | `*T` | `T \| null` |
//! | `pkg.Unknown` | `unknown /* pkg.Unknown */` |

use crate::comments;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fields;
use crate::ir::{Primitive, TypeNode};

/// Coarse shape of a rendered expression, used by enclosing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprClass {
    Numeric,
    String,
    /// A bare declaration name.
    Named,
    /// `A | B` at the top level.
    Union,
    Other,
}

/// A rendered TypeScript type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetExpr {
    text: String,
    class: ExprClass,
    nullable: bool,
}

impl TargetExpr {
    fn new(text: impl Into<String>, class: ExprClass) -> Self {
        Self {
            text: text.into(),
            class,
            nullable: false,
        }
    }

    /// Wrap user-provided TypeScript (override rules, `tstype` tags).
    pub fn verbatim(text: impl Into<String>) -> Self {
        let text = text.into();
        let alternatives = split_top_level_union(&text);
        let class = if alternatives.len() > 1 {
            ExprClass::Union
        } else {
            match text.trim() {
                "string" => ExprClass::String,
                "number" | "bigint" => ExprClass::Numeric,
                _ => ExprClass::Other,
            }
        };
        let nullable = alternatives.iter().any(|alt| alt.trim() == "null");
        Self {
            text,
            class,
            nullable,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn class(&self) -> ExprClass {
        self.class
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Usable as the key of an index signature.
    pub fn is_key_like(&self) -> bool {
        matches!(self.class, ExprClass::Numeric | ExprClass::String | ExprClass::Named)
    }

    fn union_with(self, alternative: &str) -> Self {
        Self {
            text: format!("{} | {}", self.text, alternative),
            class: ExprClass::Union,
            nullable: self.nullable || alternative == "null",
        }
    }

    fn parenthesized(&self) -> String {
        match self.class {
            ExprClass::Union => format!("({})", self.text),
            _ => self.text.clone(),
        }
    }
}

/// Split `text` on `|` outside brackets, strings and comments.
fn split_top_level_union(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' | b'>' => depth = depth.saturating_sub(1),
            quote @ (b'\'' | b'"' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = text[i + 2..].find("*/").map_or(bytes.len(), |end| i + 2 + end + 1);
            }
            b'|' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&text[start..]);
    parts
}

/// Immutable state threaded through a mapping.
#[derive(Debug, Clone, Copy)]
pub struct MapContext<'a> {
    pub config: &'a Config,
    /// Go package whose declarations are being mapped.
    pub package: &'a str,
    /// Declaration being mapped, for error messages.
    pub decl: &'a str,
    /// Indentation level of the line the expression starts on.
    pub depth: usize,
}

impl<'a> MapContext<'a> {
    pub fn new(config: &'a Config, package: &'a str, decl: &'a str) -> Self {
        Self {
            config,
            package,
            decl,
            depth: 0,
        }
    }

    pub fn at_depth(self, depth: usize) -> Self {
        Self { depth, ..self }
    }

    pub(crate) fn lookup_override(&self, name: &str) -> Option<&'a str> {
        let overrides = self.config.overrides();
        overrides
            .get(name)
            .or_else(|| overrides.get(&format!("{}.{}", self.package, name)))
    }
}

/// Map a node to its TypeScript expression.
pub fn map(node: &TypeNode, ctx: MapContext<'_>) -> Result<TargetExpr> {
    match node {
        TypeNode::Primitive(primitive) => Ok(map_primitive(*primitive, ctx.config)),

        TypeNode::Named(name) => {
            if name.is_empty() {
                return Err(Error::malformed(ctx.decl, "reference to a type with an empty name"));
            }
            if let Some(expr) = ctx.lookup_override(name) {
                return Ok(TargetExpr::verbatim(expr));
            }
            Ok(TargetExpr::new(name.clone(), ExprClass::Named))
        }

        TypeNode::Unresolved(name) => {
            if name.is_empty() {
                return Err(Error::malformed(ctx.decl, "unresolved reference without a name"));
            }
            if let Some(expr) = ctx.config.overrides().get(name) {
                return Ok(TargetExpr::verbatim(expr));
            }
            tracing::debug!(decl = ctx.decl, reference = %name, "substituting fallback type");
            let fallback = ctx.config.fallback().expr();
            Ok(TargetExpr::new(
                format!("{} /* {} */", fallback, comments::block_safe(name)),
                ExprClass::Other,
            ))
        }

        TypeNode::Map(key, value) => {
            let key = map(key, ctx)?;
            let key = if key.is_key_like() {
                key.into_string()
            } else {
                "string".to_string()
            };
            let value = map(value, ctx)?.union_with("undefined");
            Ok(TargetExpr::new(
                format!("{{ [key: {}]: {} }}", key, value.as_str()),
                ExprClass::Other,
            ))
        }

        TypeNode::Sequence(elem) => {
            if matches!(elem.as_ref(), TypeNode::Primitive(p) if p.is_byte()) {
                return Ok(TargetExpr::new("string", ExprClass::String));
            }
            let elem = map(elem, ctx)?;
            Ok(TargetExpr::new(format!("{}[]", elem.parenthesized()), ExprClass::Other))
        }

        TypeNode::Pointer(inner) => {
            let inner = map(inner, ctx)?;
            if inner.is_nullable() {
                Ok(inner)
            } else {
                Ok(inner.union_with("null"))
            }
        }

        TypeNode::Optional(inner) => Ok(map(inner, ctx)?.union_with("undefined")),

        TypeNode::Struct(fields) => {
            let members = fields::resolve(fields, ctx.at_depth(ctx.depth + 1))?;
            let mut text = String::from("{\n");
            fields::render(&mut text, &members, ctx.depth + 1, ctx.config);
            comments::indent(&mut text, ctx.depth, ctx.config.indent_width());
            text.push('}');
            Ok(TargetExpr::new(text, ExprClass::Other))
        }
    }
}

fn map_primitive(primitive: Primitive, config: &Config) -> TargetExpr {
    match primitive {
        Primitive::Bool => TargetExpr::new("boolean", ExprClass::Other),
        Primitive::String => TargetExpr::new("string", ExprClass::String),
        Primitive::Any => TargetExpr::verbatim(config.fallback().expr()),
        numeric => TargetExpr::new(format!("number /* {} */", numeric.go_name()), ExprClass::Numeric),
    }
}
