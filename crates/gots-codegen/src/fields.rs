//! Struct members: naming, optionality, skipping and comment carry-through.

use crate::comments;
use crate::config::Config;
use crate::error::Result;
use crate::ident;
use crate::ir::FieldDecl;
use crate::mapper::{self, MapContext, TargetExpr};

/// A member ready to be written into an interface or object literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Property name, quoted when it is not a plain identifier.
    pub name: String,
    pub optional: bool,
    pub readonly: bool,
    pub ty: TargetExpr,
    pub doc: Option<String>,
    pub inline_comment: Option<String>,
}

/// Resolve one field, or `None` when it is skipped.
pub fn resolve_field(field: &FieldDecl, ctx: MapContext<'_>) -> Result<Option<Member>> {
    if field.skip {
        return Ok(None);
    }

    let name = match field.override_name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => ctx.config.flavor().member_name(&field.source_name),
    };

    let ty = match &field.type_override {
        Some(expr) => TargetExpr::verbatim(expr.clone()),
        None => mapper::map(&field.ty, ctx)?,
    };

    let comments = ctx.config.preserve_comments();
    Ok(Some(Member {
        name: ident::property_name(&name),
        optional: field.optional,
        readonly: field.readonly,
        ty,
        doc: field.doc.clone().filter(|_| comments.keeps_docs()),
        inline_comment: field
            .inline_comment
            .clone()
            .filter(|_| comments.keeps_field_comments()),
    }))
}

/// Resolve fields in order, dropping skipped ones. `ctx.depth` is the
/// indentation level of the members.
pub fn resolve(fields: &[FieldDecl], ctx: MapContext<'_>) -> Result<Vec<Member>> {
    let mut members = Vec::with_capacity(fields.len());
    for field in fields {
        if let Some(member) = resolve_field(field, ctx)? {
            members.push(member);
        }
    }
    Ok(members)
}

/// Write members one per line at `depth`.
pub fn render(out: &mut String, members: &[Member], depth: usize, config: &Config) {
    let width = config.indent_width();
    for member in members {
        if let Some(doc) = &member.doc {
            comments::write_doc(out, doc, depth, width);
        }
        comments::indent(out, depth, width);
        if member.readonly {
            out.push_str("readonly ");
        }
        out.push_str(&member.name);
        if member.optional {
            out.push('?');
        }
        out.push_str(": ");
        out.push_str(member.ty.as_str());
        out.push(';');
        if let Some(comment) = &member.inline_comment {
            comments::write_inline(out, comment);
        }
        out.push('\n');
    }
}
