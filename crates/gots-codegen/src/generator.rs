//! TypeScript declaration emitter.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::comments;
use crate::config::Config;
use crate::constants::{self, AliasScope};
use crate::error::{Error, Result};
use crate::fields;
use crate::ident;
use crate::ir::{ConstDecl, DeclKind, PackageUnit, TypeDecl, TypeNode, UnitItem};
use crate::mapper::{self, MapContext};

/// Collects package units and renders them into one TypeScript file.
///
/// Units are written in the order they were added, each under a
/// `// source: <file>` banner, with declarations in source order.
///
/// # Example
///
/// ```
/// # fn main() -> gots_codegen::Result<()> {
/// use gots_codegen::{CodeGenerator, Config, FieldDecl, Location, OverrideRules, PackageUnit, TypeDecl, TypeNode, UnitItem};
///
/// let overrides = OverrideRules::from_rules([("time.Time", "string")])?;
/// let mut generator = CodeGenerator::with_config(Config::new().with_overrides(overrides))?;
///
/// let user = TypeDecl::structure(
///     "User",
///     vec![
///         FieldDecl::new("Name", TypeNode::string()).renamed("name"),
///         FieldDecl::new("Created", TypeNode::unresolved("time.Time")).renamed("created"),
///     ],
///     Location::new("user.go", 1),
/// );
/// generator.add_unit(PackageUnit::new("models", "user.go", vec![UnitItem::Type(user)])?);
///
/// let code = generator.generate()?;
/// assert!(code.contains("export interface User {\n  name: string;\n  created: string;\n}\n"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct CodeGenerator {
    config: Config,
    units: Vec<PackageUnit>,
}

impl CodeGenerator {
    /// Create a generator with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator after validating `config`.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            units: Vec::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Map a Go type name to a TypeScript expression.
    ///
    /// ```
    /// use gots_codegen::CodeGenerator;
    ///
    /// let mut generator = CodeGenerator::new();
    /// generator.register_override("uuid.UUID", "string").unwrap();
    /// assert!(generator.register_override("uuid.UUID", "number").is_err());
    /// ```
    pub fn register_override(&mut self, name: impl Into<String>, expr: impl Into<String>) -> Result<&mut Self> {
        self.config.overrides_mut().insert(name, expr)?;
        Ok(self)
    }

    /// Remove an override rule, restoring structural mapping for that name.
    pub fn unregister_override(&mut self, name: &str) -> &mut Self {
        self.config.overrides_mut().remove(name);
        self
    }

    pub fn add_unit(&mut self, unit: PackageUnit) -> &mut Self {
        self.units.push(unit);
        self
    }

    pub fn units(&self) -> &[PackageUnit] {
        &self.units
    }

    /// Render every unit.
    ///
    /// Fails without producing any text if a declaration name is not a valid
    /// identifier or the IR is malformed.
    pub fn generate(&self) -> Result<String> {
        self.config.validate()?;

        let mut out = self.config.render_header()?;
        if let Some(frontmatter) = self.config.frontmatter() {
            out.push('\n');
            out.push_str(frontmatter);
            if !frontmatter.ends_with('\n') {
                out.push('\n');
            }
        }

        let mut scope = AliasScope::new(self.units.iter().flat_map(|unit| {
            unit.items().iter().filter_map(|item| match item {
                UnitItem::Type(decl) => Some(decl.name.as_str()),
                UnitItem::Const(decl) => Some(decl.name.as_str()),
                UnitItem::Emit(_) => None,
            })
        }));

        for unit in &self.units {
            let body = self.generate_unit(unit, &mut scope)?;
            if body.is_empty() {
                continue;
            }
            out.push_str("\n//////////\n// source: ");
            out.push_str(unit.file_name());
            out.push_str("\n\n");
            out.push_str(&body);
        }

        tracing::debug!(units = self.units.len(), bytes = out.len(), "generated declarations");
        Ok(out)
    }

    /// Write the generated code to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let code = self.generate()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(path, code).map_err(|e| Error::io(path, e))
    }

    /// Write the generated code to a writer.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let code = self.generate()?;
        writer
            .write_all(code.as_bytes())
            .map_err(|e| Error::io("<writer>", e))
    }

    fn generate_unit(&self, unit: &PackageUnit, scope: &mut AliasScope) -> Result<String> {
        let mut out = String::new();
        let mut pending: Vec<&ConstDecl> = Vec::new();

        for item in unit.items() {
            match item {
                UnitItem::Const(decl) => {
                    pending.push(decl);
                }
                UnitItem::Type(decl) => {
                    self.flush_constants(&mut out, unit, &mut pending, scope)?;
                    self.generate_type(&mut out, unit, decl)?;
                }
                UnitItem::Emit(text) => {
                    self.flush_constants(&mut out, unit, &mut pending, scope)?;
                    out.push_str(text);
                    if !text.ends_with('\n') {
                        out.push('\n');
                    }
                }
            }
        }
        self.flush_constants(&mut out, unit, &mut pending, scope)?;
        Ok(out)
    }

    fn flush_constants(
        &self,
        out: &mut String,
        unit: &PackageUnit,
        pending: &mut Vec<&ConstDecl>,
        scope: &mut AliasScope,
    ) -> Result<()> {
        if pending.is_empty() {
            return Ok(());
        }
        let ctx = MapContext::new(&self.config, unit.package(), "");
        for block in constants::classify(pending, scope, self.config.group_constants()) {
            constants::render(out, &block, ctx)?;
        }
        pending.clear();
        Ok(())
    }

    fn generate_type(&self, out: &mut String, unit: &PackageUnit, decl: &TypeDecl) -> Result<()> {
        ident::check_declaration(&decl.name, &decl.location)?;
        let ctx = MapContext::new(&self.config, unit.package(), &decl.name);
        let width = self.config.indent_width();
        let mode = self.config.preserve_comments();

        if let Some(doc) = decl.doc.as_deref().filter(|_| mode.keeps_docs()) {
            comments::write_doc(out, doc, 0, width);
        }

        match decl.kind {
            DeclKind::Struct | DeclKind::InterfaceShape => {
                let TypeNode::Struct(body) = &decl.body else {
                    return Err(Error::malformed(&decl.name, "interface declaration without a struct body"));
                };
                out.push_str("export interface ");
                out.push_str(&decl.name);
                generate_heritage(out, decl, ctx);
                out.push_str(" {\n");
                let members = fields::resolve(body, ctx.at_depth(1))?;
                fields::render(out, &members, 1, &self.config);
                out.push('}');
            }
            DeclKind::Alias => {
                let target = mapper::map(&decl.body, ctx)?;
                out.push_str("export type ");
                out.push_str(&decl.name);
                out.push_str(" = ");
                out.push_str(target.as_str());
                out.push(';');
            }
        }

        if let Some(comment) = decl.inline_comment.as_deref().filter(|_| mode.keeps_docs()) {
            comments::write_inline(out, comment);
        }
        out.push('\n');
        Ok(())
    }
}

/// ` extends A, Partial<B>`, with parents looked up in the override rules
/// like any other reference.
fn generate_heritage(out: &mut String, decl: &TypeDecl, ctx: MapContext<'_>) {
    if decl.heritage.is_empty() {
        return;
    }
    let parents: Vec<String> = decl
        .heritage
        .iter()
        .map(|parent| {
            let name = ctx.lookup_override(&parent.name).unwrap_or(parent.name.as_str());
            if parent.partial {
                format!("Partial<{name}>")
            } else {
                name.to_string()
            }
        })
        .collect();
    out.push_str(" extends ");
    out.push_str(&parents.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommentMode, OverrideRules};
    use crate::error::Location;
    use crate::ir::{FieldDecl, Heritage, Literal, Primitive};

    fn loc(index: usize) -> Location {
        Location::new("simple.go", index)
    }

    fn unit(items: Vec<UnitItem>) -> PackageUnit {
        PackageUnit::new("simple", "simple.go", items).unwrap()
    }

    fn generate(items: Vec<UnitItem>) -> String {
        let mut codegen = CodeGenerator::new();
        codegen.add_unit(unit(items));
        codegen.generate().unwrap()
    }

    #[test]
    fn test_generate_struct() {
        let user = TypeDecl::structure(
            "User",
            vec![
                FieldDecl::new("ID", TypeNode::pointer(TypeNode::unresolved("uuid.NullUUID")))
                    .renamed("id")
                    .optional(),
                FieldDecl::new("Name", TypeNode::string()).renamed("name"),
                FieldDecl::new("Age", TypeNode::primitive(Primitive::Uint32)),
            ],
            loc(1),
        )
        .with_doc("User is a person.");

        let code = generate(vec![UnitItem::Type(user)]);
        assert_eq!(
            code,
            "// Code generated by gots. DO NOT EDIT.\n\
             \n\
             //////////\n\
             // source: simple.go\n\
             \n\
             /**\n\
             \x20* User is a person.\n\
             \x20*/\n\
             export interface User {\n\
             \x20 id?: unknown /* uuid.NullUUID */ | null;\n\
             \x20 name: string;\n\
             \x20 Age: number /* uint32 */;\n\
             }\n"
        );
    }

    #[test]
    fn test_generate_alias_and_inline_comment() {
        let role = TypeDecl::alias("UserRole", TypeNode::string(), loc(1)).with_comment("one of the Role constants");
        let code = generate(vec![UnitItem::Type(role)]);
        assert!(code.contains("export type UserRole = string; // one of the Role constants\n"));
    }

    #[test]
    fn test_generate_interface_shape() {
        let store = TypeDecl::new("Store", DeclKind::InterfaceShape, TypeNode::object(vec![]), loc(1));
        let code = generate(vec![UnitItem::Type(store)]);
        assert!(code.contains("export interface Store {\n}\n"));
    }

    #[test]
    fn test_generate_heritage() {
        let overrides = OverrideRules::from_rules([("audit.Trail", "AuditTrail")]).unwrap();
        let mut codegen = CodeGenerator::with_config(Config::new().with_overrides(overrides)).unwrap();
        let admin = TypeDecl::structure("Admin", vec![FieldDecl::new("Level", TypeNode::int())], loc(2))
            .with_heritage(vec![
                Heritage { name: "Base".into(), partial: false },
                Heritage { name: "audit.Trail".into(), partial: true },
            ]);
        codegen.add_unit(unit(vec![UnitItem::Type(admin)]));
        let code = codegen.generate().unwrap();
        assert!(code.contains("export interface Admin extends Base, Partial<AuditTrail> {\n"));
    }

    #[test]
    fn test_heritage_uses_qualified_override() {
        let overrides = OverrideRules::from_rules([("simple.Base", "BaseRecord")]).unwrap();
        let mut codegen = CodeGenerator::with_config(Config::new().with_overrides(overrides)).unwrap();
        let admin = TypeDecl::structure("Admin", vec![FieldDecl::new("Owner", TypeNode::named("Base"))], loc(2))
            .with_heritage(vec![Heritage { name: "Base".into(), partial: false }]);
        codegen.add_unit(unit(vec![UnitItem::Type(admin)]));
        let code = codegen.generate().unwrap();
        assert!(code.contains("export interface Admin extends BaseRecord {\n"));
        assert!(code.contains("  Owner: BaseRecord;\n"));
    }

    #[test]
    fn test_constants_interrupted_by_type() {
        let code = generate(vec![
            UnitItem::Const(ConstDecl::untyped("RoleViewer", Literal::String("viewer".into()), loc(1))),
            UnitItem::Const(ConstDecl::untyped("RoleEditor", Literal::String("editor".into()), loc(2))),
            UnitItem::Type(TypeDecl::alias("Marker", TypeNode::bool(), loc(3))),
            UnitItem::Const(ConstDecl::untyped("RoleOwner", Literal::String("owner".into()), loc(4))),
        ]);
        let body = code.split("// source: simple.go\n\n").nth(1).unwrap();
        assert_eq!(
            body,
            "export type Role = string;\n\
             export const RoleViewer: Role = \"viewer\";\n\
             export const RoleEditor: Role = \"editor\";\n\
             export type Marker = boolean;\n\
             export const RoleOwner = \"owner\";\n"
        );
    }

    #[test]
    fn test_emit_items_verbatim() {
        let code = generate(vec![
            UnitItem::Emit("export type Extra = Record<string, unknown>;".into()),
            UnitItem::Type(TypeDecl::alias("Id", TypeNode::string(), loc(2))),
        ]);
        assert!(code.contains("export type Extra = Record<string, unknown>;\nexport type Id = string;\n"));
    }

    #[test]
    fn test_empty_unit_has_no_section() {
        let mut codegen = CodeGenerator::new();
        codegen.add_unit(PackageUnit::new("simple", "empty.go", vec![]).unwrap());
        codegen.add_unit(unit(vec![UnitItem::Type(TypeDecl::alias("Id", TypeNode::string(), loc(1)))]));
        let code = codegen.generate().unwrap();
        assert!(!code.contains("empty.go"));
        assert!(code.contains("// source: simple.go"));
    }

    #[test]
    fn test_sections_in_unit_order() {
        let mut codegen = CodeGenerator::new();
        codegen.add_unit(PackageUnit::new("p", "b.go", vec![UnitItem::Type(TypeDecl::alias("B", TypeNode::int(), Location::new("b.go", 1)))]).unwrap());
        codegen.add_unit(PackageUnit::new("p", "a.go", vec![UnitItem::Type(TypeDecl::alias("A", TypeNode::int(), Location::new("a.go", 1)))]).unwrap());
        let code = codegen.generate().unwrap();
        let b = code.find("// source: b.go").unwrap();
        let a = code.find("// source: a.go").unwrap();
        assert!(b < a);
    }

    #[test]
    fn test_frontmatter_after_header() {
        let config = Config::new().with_frontmatter("import type { Money } from './money';");
        let mut codegen = CodeGenerator::with_config(config).unwrap();
        codegen.add_unit(unit(vec![UnitItem::Type(TypeDecl::alias("Id", TypeNode::string(), loc(1)))]));
        let code = codegen.generate().unwrap();
        assert!(code.starts_with(
            "// Code generated by gots. DO NOT EDIT.\n\nimport type { Money } from './money';\n\n//////////\n"
        ));
    }

    #[test]
    fn test_indent_width() {
        let config = Config::new().with_indent_width(4);
        let mut codegen = CodeGenerator::with_config(config).unwrap();
        codegen.add_unit(unit(vec![UnitItem::Type(TypeDecl::structure(
            "Point",
            vec![FieldDecl::new("X", TypeNode::primitive(Primitive::Float64))],
            loc(1),
        ))]));
        assert!(codegen.generate().unwrap().contains("export interface Point {\n    X: number /* float64 */;\n}\n"));
    }

    #[test]
    fn test_comments_dropped_in_none_mode() {
        let config = Config::new().with_preserve_comments(CommentMode::None);
        let mut codegen = CodeGenerator::with_config(config).unwrap();
        codegen.add_unit(unit(vec![UnitItem::Type(
            TypeDecl::alias("Id", TypeNode::string(), loc(1)).with_doc("Identifier.").with_comment("opaque"),
        )]));
        let code = codegen.generate().unwrap();
        assert!(code.ends_with("// source: simple.go\n\nexport type Id = string;\n"));
    }

    #[test]
    fn test_invalid_declaration_name() {
        let mut codegen = CodeGenerator::new();
        codegen.add_unit(unit(vec![UnitItem::Type(TypeDecl::alias("enum", TypeNode::string(), loc(7)))]));
        let err = codegen.generate().unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { ref name, ref location } if name == "enum" && location.index == 7));
    }

    #[test]
    fn test_register_and_unregister_override() {
        let mut codegen = CodeGenerator::new();
        codegen.register_override("time.Time", "string").unwrap();
        codegen.add_unit(unit(vec![UnitItem::Type(TypeDecl::alias("Stamp", TypeNode::unresolved("time.Time"), loc(1)))]));
        assert!(codegen.generate().unwrap().contains("export type Stamp = string;"));

        codegen.unregister_override("time.Time");
        assert!(codegen.generate().unwrap().contains("export type Stamp = unknown /* time.Time */;"));
    }

    #[test]
    fn test_deterministic_output() {
        let items = || {
            vec![
                UnitItem::Type(TypeDecl::structure(
                    "Prefs",
                    vec![FieldDecl::new("Flags", TypeNode::map(TypeNode::string(), TypeNode::bool()))],
                    loc(1),
                )),
                UnitItem::Const(ConstDecl::untyped("LimitLow", Literal::Int(1), loc(2))),
                UnitItem::Const(ConstDecl::untyped("LimitHigh", Literal::Int(9), loc(3))),
            ]
        };
        assert_eq!(generate(items()), generate(items()));
    }

    #[test]
    fn test_write_to() {
        let mut codegen = CodeGenerator::new();
        codegen.add_unit(unit(vec![UnitItem::Type(TypeDecl::alias("Id", TypeNode::string(), loc(1)))]));
        let mut buf = Vec::new();
        codegen.write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), codegen.generate().unwrap());
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web/models/index.ts");
        let mut codegen = CodeGenerator::new();
        codegen.add_unit(unit(vec![UnitItem::Type(TypeDecl::alias("Id", TypeNode::string(), loc(1)))]));
        codegen.write_to_file(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("export type Id = string;"));
    }
}
