//! Constant grouping.
//!
//! Consecutive constants of the same type form a run. A run of two or more
//! becomes a group: one type alias plus one binding per constant typed as
//! that alias.
//!
//! ```text
//! const (                                export type Role = string;
//!     RoleViewer = "viewer"      =>      export const RoleViewer: Role = "viewer";
//!     RoleEditor = "editor"              export const RoleEditor: Role = "editor";
//! )
//! ```
//!
//! Constants of a declared named type use that name as the alias, and no
//! alias is synthesized when the package already declares it. Otherwise the
//! alias is the common word prefix of the constant names.
//!
//! [`ConstStyle`] picks how a group with a synthesized alias is written: the
//! alias above, `export type Role = typeof RoleViewer | typeof RoleEditor;`
//! after untyped bindings, or an `export enum Role { Viewer = "viewer", ... }`.

use std::collections::HashSet;

use crate::comments;
use crate::config::ConstStyle;
use crate::error::Result;
use crate::ident;
use crate::ir::{ConstDecl, Literal, TypeNode};
use crate::mapper::{self, ExprClass, MapContext, TargetExpr};

/// Names already claimed in one output: declarations plus synthesized
/// aliases.
#[derive(Debug, Default)]
pub struct AliasScope {
    taken: HashSet<String>,
}

impl AliasScope {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            taken: names.into_iter().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstGroup<'a> {
    pub alias: String,
    /// Backing type of an alias to synthesize, `None` when one is already
    /// declared.
    pub backing: Option<TypeNode>,
    pub members: Vec<&'a ConstDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstBlock<'a> {
    Group(ConstGroup<'a>),
    Plain(&'a ConstDecl),
}

/// Split constants into maximal runs sharing an underlying type name.
pub fn runs<'a>(consts: &[&'a ConstDecl]) -> Vec<Vec<&'a ConstDecl>> {
    let mut runs: Vec<Vec<&ConstDecl>> = Vec::new();
    for &decl in consts {
        match runs.last_mut() {
            Some(run) if run[0].underlying_type_name() == decl.underlying_type_name() => run.push(decl),
            _ => runs.push(vec![decl]),
        }
    }
    runs
}

/// Classify contiguous constants, claiming synthesized aliases in `scope`.
pub fn classify<'a>(consts: &[&'a ConstDecl], scope: &mut AliasScope, group_constants: bool) -> Vec<ConstBlock<'a>> {
    let mut blocks = Vec::new();
    for run in runs(consts) {
        let grouped = if group_constants { group(&run, scope) } else { None };
        match grouped {
            Some(group) => blocks.push(ConstBlock::Group(group)),
            None => blocks.extend(run.into_iter().map(ConstBlock::Plain)),
        }
    }
    blocks
}

fn group<'a>(run: &[&'a ConstDecl], scope: &mut AliasScope) -> Option<ConstGroup<'a>> {
    if run.len() < 2 {
        return None;
    }
    let first = run[0];
    let (alias, backing) = match &first.ty {
        TypeNode::Named(name) if scope.taken.contains(name) => (name.clone(), None),
        TypeNode::Named(name) => (name.clone(), Some(TypeNode::Primitive(first.value.default_type()))),
        TypeNode::Primitive(_) | TypeNode::Unresolved(_) => {
            let names: Vec<&str> = run.iter().map(|c| c.name.as_str()).collect();
            let prefix = common_prefix(&names)?;
            if scope.taken.contains(&prefix) {
                tracing::debug!(alias = %prefix, "constant group alias already taken");
                return None;
            }
            (prefix, Some(first.ty.clone()))
        }
        _ => return None,
    };

    if backing.is_some() {
        scope.taken.insert(alias.clone());
    }
    Some(ConstGroup {
        alias,
        backing,
        members: run.to_vec(),
    })
}

/// Whether `name` splits into two words at byte offset `at`.
fn is_word_boundary(name: &str, at: usize) -> bool {
    let prev = name[..at].chars().next_back();
    let next = name[at..].chars().next();
    match (prev, next) {
        (Some(p), Some(n)) => {
            n == '_'
                || p == '_'
                || ((p.is_lowercase() || p.is_ascii_digit()) && n.is_uppercase())
                || (p.is_alphabetic() && n.is_ascii_digit())
        }
        _ => false,
    }
}

/// Longest capitalized prefix shared by all names that ends on a word
/// boundary in each of them: `RoleViewer`, `RoleEditor` give `Role`.
pub fn common_prefix(names: &[&str]) -> Option<String> {
    let first = names.first()?;
    let at = first
        .char_indices()
        .map(|(i, _)| i)
        .filter(|&i| i > 0)
        .rev()
        .find(|&at| {
            names.iter().all(|name| {
                name.len() > at
                    && name.is_char_boundary(at)
                    && name[..at] == first[..at]
                    && is_word_boundary(name, at)
            })
        })?;

    let prefix = first[..at].trim_end_matches('_');
    prefix
        .chars()
        .next()
        .filter(|c| c.is_uppercase())
        .map(|_| prefix.to_string())
}

/// Render a literal as a TypeScript expression.
pub fn literal(value: &Literal) -> String {
    match value {
        Literal::Bool(b) => b.to_string(),
        Literal::Int(i) => i.to_string(),
        Literal::Float(f) if f.is_nan() => "NaN".to_string(),
        Literal::Float(f) if f.is_infinite() && f.is_sign_positive() => "Infinity".to_string(),
        Literal::Float(f) if f.is_infinite() => "-Infinity".to_string(),
        Literal::Float(f) => f.to_string(),
        Literal::String(s) => serde_json::Value::from(s.as_str()).to_string(),
        Literal::Expr { expr } => go_octal_to_js(expr.trim()),
    }
}

/// `0755` is octal in Go and a syntax error in strict TypeScript.
fn go_octal_to_js(expr: &str) -> String {
    match expr.strip_prefix('0') {
        Some(digits) if !digits.is_empty() && digits.chars().all(|c| ('0'..='7').contains(&c) || c == '_') => {
            format!("0o{}", digits.trim_start_matches('_'))
        }
        _ => expr.to_string(),
    }
}

/// Write a classified block of constants.
pub fn render(out: &mut String, block: &ConstBlock<'_>, ctx: MapContext<'_>) -> Result<()> {
    match block {
        ConstBlock::Plain(decl) => {
            let annotation = match &decl.ty {
                TypeNode::Primitive(_) => None,
                ty => {
                    let ctx = MapContext { decl: &decl.name, ..ctx };
                    Some(mapper::map(ty, ctx)?.into_string())
                }
            };
            render_binding(out, decl, annotation.as_deref(), ctx)
        }
        ConstBlock::Group(group) => {
            let style = ctx.config.const_style();
            let declared_type = declared_type(group, ctx)?;
            match (&group.backing, declared_type) {
                (Some(_), None) if style == ConstStyle::Union => render_union(out, group, ctx),
                (Some(_), None) if style == ConstStyle::Enum && is_enum_compatible(group) => render_enum(out, group, ctx),
                (Some(backing), None) => {
                    render_alias_declaration(out, group, backing, ctx)?;
                    render_bindings(out, group, &group.alias, ctx)
                }
                (_, Some(annotation)) => render_bindings(out, group, annotation.as_str(), ctx),
                (None, None) => render_bindings(out, group, &group.alias, ctx),
            }
        }
    }
}

/// The expression a group of a named type maps to when an override
/// replaces that name. Bindings are then annotated with it directly, as a
/// single constant of the same type would be.
fn declared_type(group: &ConstGroup<'_>, ctx: MapContext<'_>) -> Result<Option<TargetExpr>> {
    let first = group.members[0];
    if !matches!(first.ty, TypeNode::Named(_)) {
        return Ok(None);
    }
    let mapped = mapper::map(&first.ty, MapContext { decl: &first.name, ..ctx })?;
    Ok((mapped.class() != ExprClass::Named).then_some(mapped))
}

fn render_alias_declaration(out: &mut String, group: &ConstGroup<'_>, backing: &TypeNode, ctx: MapContext<'_>) -> Result<()> {
    ident::check_declaration(&group.alias, &group.members[0].location)?;
    let backing = mapper::map(backing, MapContext { decl: &group.alias, ..ctx })?;
    out.push_str(&format!("export type {} = {};\n", group.alias, backing.as_str()));
    Ok(())
}

fn render_bindings(out: &mut String, group: &ConstGroup<'_>, annotation: &str, ctx: MapContext<'_>) -> Result<()> {
    for decl in &group.members {
        render_binding(out, decl, Some(annotation), ctx)?;
    }
    Ok(())
}

/// Untyped bindings followed by a union of their `typeof` types.
fn render_union(out: &mut String, group: &ConstGroup<'_>, ctx: MapContext<'_>) -> Result<()> {
    ident::check_declaration(&group.alias, &group.members[0].location)?;
    for decl in &group.members {
        render_binding(out, decl, None, ctx)?;
    }
    let members: Vec<String> = group.members.iter().map(|decl| format!("typeof {}", decl.name)).collect();
    out.push_str(&format!("export type {} = {};\n", group.alias, members.join(" | ")));
    Ok(())
}

/// TypeScript enums hold only numeric and string members.
fn is_enum_compatible(group: &ConstGroup<'_>) -> bool {
    !group.members.iter().any(|decl| matches!(decl.value, Literal::Bool(_)))
}

fn render_enum(out: &mut String, group: &ConstGroup<'_>, ctx: MapContext<'_>) -> Result<()> {
    ident::check_declaration(&group.alias, &group.members[0].location)?;
    let mode = ctx.config.preserve_comments();
    let width = ctx.config.indent_width();

    out.push_str(&format!("export enum {} {{\n", group.alias));
    for decl in &group.members {
        if let Some(doc) = decl.doc.as_deref().filter(|_| mode.keeps_docs()) {
            comments::write_doc(out, doc, 1, width);
        }
        comments::indent(out, 1, width);
        out.push_str(&enum_member_name(&decl.name, &group.alias));
        out.push_str(" = ");
        out.push_str(&literal(&decl.value));
        out.push(',');
        if let Some(comment) = decl.inline_comment.as_deref().filter(|_| mode.keeps_const_comments()) {
            comments::write_inline(out, comment);
        }
        out.push('\n');
    }
    out.push_str("}\n");
    Ok(())
}

/// `RoleViewer` in `Role` becomes `Viewer`. Names that would not stay
/// identifiers after the cut are kept whole.
fn enum_member_name(name: &str, alias: &str) -> String {
    let short = name.strip_prefix(alias).unwrap_or(name).trim_start_matches('_');
    if ident::is_identifier(short) {
        short.to_string()
    } else {
        name.to_string()
    }
}

fn render_binding(out: &mut String, decl: &ConstDecl, annotation: Option<&str>, ctx: MapContext<'_>) -> Result<()> {
    ident::check_declaration(&decl.name, &decl.location)?;
    let mode = ctx.config.preserve_comments();

    if let Some(doc) = decl.doc.as_deref().filter(|_| mode.keeps_docs()) {
        comments::write_doc(out, doc, 0, ctx.config.indent_width());
    }
    out.push_str("export const ");
    out.push_str(&decl.name);
    if let Some(annotation) = annotation {
        out.push_str(": ");
        out.push_str(annotation);
    }
    out.push_str(" = ");
    out.push_str(&literal(&decl.value));
    out.push(';');
    if let Some(comment) = decl.inline_comment.as_deref().filter(|_| mode.keeps_const_comments()) {
        comments::write_inline(out, comment);
    }
    out.push('\n');
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, OverrideRules};
    use crate::error::Location;
    use crate::ir::Primitive;

    fn constant(name: &str, ty: TypeNode, value: Literal) -> ConstDecl {
        ConstDecl::new(name, ty, value, Location::new("simple.go", 1))
    }

    fn string_const(name: &str, value: &str) -> ConstDecl {
        constant(name, TypeNode::string(), Literal::String(value.to_string()))
    }

    fn render_all(consts: &[ConstDecl], scope: &mut AliasScope, config: &Config) -> String {
        let refs: Vec<&ConstDecl> = consts.iter().collect();
        let mut out = String::new();
        for block in classify(&refs, scope, config.group_constants()) {
            render(&mut out, &block, MapContext::new(config, "simple", "")).unwrap();
        }
        out
    }

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix(&["RoleViewer", "RoleEditor"]).as_deref(), Some("Role"));
        assert_eq!(common_prefix(&["StatusActive", "StatusArchived"]).as_deref(), Some("Status"));
        assert_eq!(common_prefix(&["HTTPStatusOK", "HTTPStatusNotFound"]).as_deref(), Some("HTTPStatus"));
        assert_eq!(common_prefix(&["ROLE_ADMIN", "ROLE_AUDITOR"]).as_deref(), Some("ROLE"));
        assert_eq!(common_prefix(&["Level1", "Level2"]).as_deref(), Some("Level"));
        assert_eq!(common_prefix(&["Alpha", "Beta"]), None);
        assert_eq!(common_prefix(&["Role", "RoleAdmin"]), None);
    }

    #[test]
    fn test_runs_split_on_type_change() {
        let a = string_const("A1", "a");
        let b = string_const("A2", "b");
        let c = constant("N", TypeNode::int(), Literal::Int(1));
        let d = string_const("A3", "c");
        let runs = runs(&[&a, &b, &c, &d]);
        let sizes: Vec<usize> = runs.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 1, 1]);
    }

    #[test]
    fn test_primitive_group_synthesizes_alias() {
        let consts = vec![string_const("RoleViewer", "viewer"), string_const("RoleEditor", "editor")];
        let out = render_all(&consts, &mut AliasScope::default(), &Config::new());
        assert_eq!(
            out,
            "export type Role = string;\nexport const RoleViewer: Role = \"viewer\";\nexport const RoleEditor: Role = \"editor\";\n"
        );
    }

    #[test]
    fn test_named_group_reuses_declared_type() {
        let consts = vec![
            constant("Admin", TypeNode::named("UserRole"), Literal::String("admin".into())),
            constant("Viewer", TypeNode::named("UserRole"), Literal::String("viewer".into())),
        ];
        let mut scope = AliasScope::new(["UserRole", "Admin", "Viewer"]);
        let out = render_all(&consts, &mut scope, &Config::new());
        assert_eq!(
            out,
            "export const Admin: UserRole = \"admin\";\nexport const Viewer: UserRole = \"viewer\";\n"
        );
    }

    #[test]
    fn test_named_group_without_declaration_synthesizes_alias() {
        let consts = vec![
            constant("Low", TypeNode::named("Priority"), Literal::Int(0)),
            constant("High", TypeNode::named("Priority"), Literal::Int(1)),
        ];
        let out = render_all(&consts, &mut AliasScope::default(), &Config::new());
        assert!(out.starts_with("export type Priority = number /* int */;\n"));
        assert_eq!(out.matches("export type").count(), 1);
    }

    #[test]
    fn test_alias_synthesized_once_per_output() {
        let first = vec![
            constant("Low", TypeNode::named("Priority"), Literal::Int(0)),
            constant("High", TypeNode::named("Priority"), Literal::Int(1)),
        ];
        let second = vec![
            constant("Urgent", TypeNode::named("Priority"), Literal::Int(2)),
            constant("Never", TypeNode::named("Priority"), Literal::Int(3)),
        ];
        let mut scope = AliasScope::default();
        let config = Config::new();
        let out = render_all(&first, &mut scope, &config) + &render_all(&second, &mut scope, &config);
        assert_eq!(out.matches("export type Priority").count(), 1);
        assert!(out.contains("export const Never: Priority = 3;"));
    }

    #[test]
    fn test_single_constant_is_plain() {
        let consts = vec![constant("MaxUsers", TypeNode::int(), Literal::Int(100))];
        let out = render_all(&consts, &mut AliasScope::default(), &Config::new());
        assert_eq!(out, "export const MaxUsers = 100;\n");

        let consts = vec![constant("Default", TypeNode::named("UserRole"), Literal::String("viewer".into()))];
        let out = render_all(&consts, &mut AliasScope::default(), &Config::new());
        assert_eq!(out, "export const Default: UserRole = \"viewer\";\n");
    }

    #[test]
    fn test_grouping_disabled() {
        let consts = vec![string_const("RoleViewer", "viewer"), string_const("RoleEditor", "editor")];
        let config = Config::new().with_group_constants(false);
        let out = render_all(&consts, &mut AliasScope::default(), &config);
        assert_eq!(out, "export const RoleViewer = \"viewer\";\nexport const RoleEditor = \"editor\";\n");
    }

    #[test]
    fn test_prefix_collision_stays_plain() {
        let consts = vec![string_const("RoleViewer", "viewer"), string_const("RoleEditor", "editor")];
        let mut scope = AliasScope::new(["Role"]);
        let out = render_all(&consts, &mut scope, &Config::new());
        assert!(!out.contains("export type"));
    }

    #[test]
    fn test_unresolved_type_annotated_with_fallback() {
        let consts = vec![constant("Epoch", TypeNode::unresolved("time.Duration"), Literal::Int(0))];
        let out = render_all(&consts, &mut AliasScope::default(), &Config::new());
        assert_eq!(out, "export const Epoch: unknown /* time.Duration */ = 0;\n");
    }

    #[test]
    fn test_unresolved_run_grouped() {
        let consts = vec![
            constant("TimeoutShort", TypeNode::unresolved("time.Duration"), Literal::Int(1_000)),
            constant("TimeoutLong", TypeNode::unresolved("time.Duration"), Literal::Int(60_000)),
        ];
        let out = render_all(&consts, &mut AliasScope::default(), &Config::new());
        assert_eq!(
            out,
            "export type Timeout = unknown /* time.Duration */;\nexport const TimeoutShort: Timeout = 1000;\nexport const TimeoutLong: Timeout = 60000;\n"
        );

        let mut overrides = OverrideRules::new();
        overrides.insert("time.Duration", "number").unwrap();
        let config = Config::new().with_overrides(overrides);
        let out = render_all(&consts, &mut AliasScope::default(), &config);
        assert!(out.starts_with("export type Timeout = number;\n"));
    }

    #[test]
    fn test_overridden_named_type_annotates_like_single_constant() {
        let mut overrides = OverrideRules::new();
        overrides.insert("UserRole", "string").unwrap();
        let config = Config::new().with_overrides(overrides);

        let single = vec![constant("Admin", TypeNode::named("UserRole"), Literal::String("admin".into()))];
        let out = render_all(&single, &mut AliasScope::new(["UserRole"]), &config);
        assert_eq!(out, "export const Admin: string = \"admin\";\n");

        let pair = vec![
            constant("Admin", TypeNode::named("UserRole"), Literal::String("admin".into())),
            constant("Viewer", TypeNode::named("UserRole"), Literal::String("viewer".into())),
        ];
        let out = render_all(&pair, &mut AliasScope::new(["UserRole"]), &config);
        assert_eq!(
            out,
            "export const Admin: string = \"admin\";\nexport const Viewer: string = \"viewer\";\n"
        );

        let out = render_all(&pair, &mut AliasScope::default(), &config);
        assert!(!out.contains("export type"));
        assert!(out.contains("export const Viewer: string = \"viewer\";"));
    }

    #[test]
    fn test_union_style() {
        let consts = vec![string_const("RoleViewer", "viewer"), string_const("RoleEditor", "editor")];
        let config = Config::new().with_const_style(ConstStyle::Union);
        let out = render_all(&consts, &mut AliasScope::default(), &config);
        assert_eq!(
            out,
            "export const RoleViewer = \"viewer\";\nexport const RoleEditor = \"editor\";\nexport type Role = typeof RoleViewer | typeof RoleEditor;\n"
        );
    }

    #[test]
    fn test_enum_style() {
        let consts = vec![
            constant("LevelLow", TypeNode::primitive(Primitive::Uint8), Literal::Int(1)).with_doc("Least urgent."),
            constant("LevelHigh", TypeNode::primitive(Primitive::Uint8), Literal::Int(2)).with_comment("pages on-call"),
            constant("Level2FA", TypeNode::primitive(Primitive::Uint8), Literal::Int(3)),
        ];
        let config = Config::new().with_const_style(ConstStyle::Enum);
        let out = render_all(&consts, &mut AliasScope::default(), &config);
        assert_eq!(
            out,
            "export enum Level {\n  /**\n   * Least urgent.\n   */\n  Low = 1,\n  High = 2, // pages on-call\n  Level2FA = 3,\n}\n"
        );
    }

    #[test]
    fn test_enum_style_keeps_alias_for_booleans_and_declared_types() {
        let config = Config::new().with_const_style(ConstStyle::Enum);
        let flags = vec![
            constant("FlagOn", TypeNode::primitive(Primitive::Bool), Literal::Bool(true)),
            constant("FlagOff", TypeNode::primitive(Primitive::Bool), Literal::Bool(false)),
        ];
        let out = render_all(&flags, &mut AliasScope::default(), &config);
        assert!(out.starts_with("export type Flag = boolean;\n"));

        let roles = vec![
            constant("Admin", TypeNode::named("UserRole"), Literal::String("admin".into())),
            constant("Viewer", TypeNode::named("UserRole"), Literal::String("viewer".into())),
        ];
        let out = render_all(&roles, &mut AliasScope::new(["UserRole"]), &config);
        assert!(!out.contains("enum"));
        assert!(out.contains("export const Admin: UserRole = \"admin\";"));
    }

    #[test]
    fn test_constant_comments() {
        let consts = vec![
            string_const("Greeting", "hi")
                .with_doc("Said first.")
                .with_comment("informal"),
        ];
        let out = render_all(&consts, &mut AliasScope::default(), &Config::new());
        assert_eq!(out, "/**\n * Said first.\n */\nexport const Greeting = \"hi\"; // informal\n");

        let config = Config::new().with_preserve_comments(crate::config::CommentMode::Types);
        let out = render_all(&consts, &mut AliasScope::default(), &config);
        assert_eq!(out, "/**\n * Said first.\n */\nexport const Greeting = \"hi\";\n");
    }

    #[test]
    fn test_literals() {
        assert_eq!(literal(&Literal::Bool(true)), "true");
        assert_eq!(literal(&Literal::Int(-3)), "-3");
        assert_eq!(literal(&Literal::Float(2.5)), "2.5");
        assert_eq!(literal(&Literal::Float(f64::INFINITY)), "Infinity");
        assert_eq!(literal(&Literal::String("say \"hi\"\n".into())), "\"say \\\"hi\\\"\\n\"");
        assert_eq!(literal(&Literal::expr("1 << 3")), "1 << 3");
        assert_eq!(literal(&Literal::expr("0755")), "0o755");
        assert_eq!(literal(&Literal::expr("0")), "0");
        assert_eq!(literal(&Literal::expr("0x1F")), "0x1F");
    }

    #[test]
    fn test_invalid_constant_name() {
        let consts = vec![constant("delete", TypeNode::int(), Literal::Int(1))];
        let refs: Vec<&ConstDecl> = consts.iter().collect();
        let config = Config::new();
        let blocks = classify(&refs, &mut AliasScope::default(), true);
        let err = render(&mut String::new(), &blocks[0], MapContext::new(&config, "simple", "")).unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_numeric_group_backing() {
        let consts = vec![
            constant("LevelLow", TypeNode::primitive(Primitive::Uint8), Literal::Int(1)),
            constant("LevelHigh", TypeNode::primitive(Primitive::Uint8), Literal::Int(2)),
        ];
        let out = render_all(&consts, &mut AliasScope::default(), &Config::new());
        assert!(out.starts_with("export type Level = number /* uint8 */;\n"));
    }
}
