//! Normalization of resolved Go declarations into the IR.
//!
//! This module turns [`SourcePackage`] documents into [`PackageUnit`]s, one
//! per Go file, and registers them on the [`CodeGenerator`].
//!
//! ## Classification
//!
//! Each exported type declaration is classified by its underlying type:
//!
//! - a struct becomes an interface (`DeclKind::Struct`),
//! - an interface with methods becomes an empty interface
//!   (`DeclKind::InterfaceShape`); method signatures are dropped with a warning,
//! - everything else, including `interface{}`, becomes a type alias.
//!
//! ## Reference resolution
//!
//! - a same-package name declared and exported anywhere in the package is a
//!   named reference,
//! - a name qualified by another package (`uuid.NullUUID`) is unresolved and
//!   falls back unless an override rule maps it,
//! - `func` and `chan` types and interfaces used inline become `any`.
//!
//! ## Struct tags
//!
//! | Tag | Effect |
//! |-----|--------|
//! | `json:"name"` | member name |
//! | `json:",omitempty"`, `json:",omitzero"` | optional member |
//! | `json:"-"` | field dropped |
//! | `yaml:"name,omitempty"` | same, used when there is no `json` tag |
//! | `tstype:"Expr"` | member type replaced by `Expr` |
//! | `tstype:",readonly"` | `readonly` member |
//! | `tstype:",extends"` | embedded type becomes `extends` heritage |

use std::collections::HashSet;
use std::path::Path;

use crate::CodeGenerator;
use crate::comments;
use crate::error::{Error, Location, Result};
use crate::ir::{ConstDecl, DeclKind, FieldDecl, Heritage, PackageUnit, Primitive, TypeDecl, TypeNode, UnitItem};
use crate::source::{ConstSpec, SourceDecl, SourceField, SourceFile, SourceFormat, SourcePackage, SourceType, TypeSpec};
use crate::tags::StructTag;

/// Go's export rule: the name starts with an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Package-wide knowledge needed while building any of its files.
struct PackageContext<'a> {
    package: &'a str,
    exported_types: HashSet<&'a str>,
}

impl<'a> PackageContext<'a> {
    fn new(source: &'a SourcePackage) -> Self {
        let exported_types = source
            .files
            .iter()
            .flat_map(|file| &file.decls)
            .filter_map(|decl| match decl {
                SourceDecl::Type(spec) if is_exported(&spec.name) => Some(spec.name.as_str()),
                _ => None,
            })
            .collect();
        Self {
            package: &source.package,
            exported_types,
        }
    }

    fn is_local(&self, package: Option<&str>) -> bool {
        package.is_none_or(|p| p == self.package)
    }

    /// Resolve a reference to a named type.
    fn reference(&self, package: Option<&str>, name: &str) -> TypeNode {
        match package {
            _ if self.is_local(package) && self.exported_types.contains(name) => TypeNode::Named(name.to_string()),
            Some(package) if !self.is_local(Some(package)) => TypeNode::Unresolved(format!("{package}.{name}")),
            _ => TypeNode::Unresolved(name.to_string()),
        }
    }

    /// The name a heritage clause refers to.
    fn heritage_name(&self, package: Option<&str>, name: &str) -> String {
        match package {
            Some(package) if !self.is_local(Some(package)) => format!("{package}.{name}"),
            _ => name.to_string(),
        }
    }
}

/// Build one unit per file of a package.
pub fn build_package(source: &SourcePackage) -> Result<Vec<PackageUnit>> {
    let ctx = PackageContext::new(source);
    source.files.iter().map(|file| build_unit(file, &ctx)).collect()
}

fn build_unit(file: &SourceFile, ctx: &PackageContext<'_>) -> Result<PackageUnit> {
    let mut items = Vec::new();
    for (i, decl) in file.decls.iter().enumerate() {
        let location = Location::new(&file.name, i + 1);
        match decl {
            SourceDecl::Type(spec) if is_exported(&spec.name) => {
                let location = location.with_line(spec.line);
                items.push(UnitItem::Type(build_type(spec, location, ctx)?));
            }
            SourceDecl::Const(spec) if is_exported(&spec.name) => {
                let location = location.with_line(spec.line);
                items.push(UnitItem::Const(build_const(spec, location, ctx)?));
            }
            SourceDecl::Emit(text) => items.push(UnitItem::Emit(text.clone())),
            SourceDecl::Type(TypeSpec { name, .. }) | SourceDecl::Const(ConstSpec { name, .. }) => {
                tracing::trace!(file = %file.name, name = %name, "skipping unexported declaration");
            }
        }
    }

    tracing::debug!(package = ctx.package, file = %file.name, items = items.len(), "built unit");
    PackageUnit::new(ctx.package, &file.name, items)
}

fn build_type(spec: &TypeSpec, location: Location, ctx: &PackageContext<'_>) -> Result<TypeDecl> {
    let name = spec.name.as_str();
    let decl = match &spec.underlying {
        SourceType::Struct { fields } => {
            let (fields, heritage) = build_fields(fields, name, ctx)?;
            TypeDecl::structure(name, fields, location).with_heritage(heritage)
        }
        SourceType::Interface { methods, embeds } if !methods.is_empty() || !embeds.is_empty() => {
            tracing::warn!(
                decl = name,
                methods = methods.len(),
                embeds = embeds.len(),
                "interface method signatures are not translated"
            );
            TypeDecl::new(name, DeclKind::InterfaceShape, TypeNode::Struct(Vec::new()), location)
        }
        underlying => TypeDecl::alias(name, type_node(underlying, name, ctx)?, location),
    };

    Ok(TypeDecl {
        doc: spec.doc.as_deref().and_then(comments::clean),
        inline_comment: spec.comment.as_deref().and_then(comments::clean),
        ..decl
    })
}

fn build_const(spec: &ConstSpec, location: Location, ctx: &PackageContext<'_>) -> Result<ConstDecl> {
    let name = spec.name.as_str();
    let decl = match &spec.ty {
        None => ConstDecl::untyped(name, spec.value.clone(), location),
        Some(ty) => {
            let ty = type_node(ty, name, ctx)?;
            if ty.type_name().is_none() {
                return Err(Error::malformed(name, "constant type must be a basic or named type"));
            }
            ConstDecl::new(name, ty, spec.value.clone(), location)
        }
    };

    Ok(ConstDecl {
        doc: spec.doc.as_deref().and_then(comments::clean),
        inline_comment: spec.comment.as_deref().and_then(comments::clean),
        ..decl
    })
}

fn type_node(ty: &SourceType, decl: &str, ctx: &PackageContext<'_>) -> Result<TypeNode> {
    let node = match ty {
        SourceType::Basic { name } if name.is_empty() => {
            return Err(Error::malformed(decl, "basic type without a name"));
        }
        SourceType::Basic { name } => match Primitive::from_go_name(name) {
            Some(primitive) => TypeNode::Primitive(primitive),
            None => TypeNode::Unresolved(name.clone()),
        },
        SourceType::Named { name, .. } if name.is_empty() => {
            return Err(Error::malformed(decl, "named type without a name"));
        }
        SourceType::Named { package, name } => ctx.reference(package.as_deref(), name),
        SourceType::Pointer { elem } => TypeNode::pointer(type_node(elem, decl, ctx)?),
        SourceType::Slice { elem } | SourceType::Array { elem, .. } => TypeNode::sequence(type_node(elem, decl, ctx)?),
        SourceType::Map { key, value } => TypeNode::map(type_node(key, decl, ctx)?, type_node(value, decl, ctx)?),
        SourceType::Struct { fields } => {
            let (fields, heritage) = build_fields(fields, decl, ctx)?;
            if !heritage.is_empty() {
                tracing::warn!(decl, "`extends` on an anonymous struct field is ignored");
            }
            TypeNode::object(fields)
        }
        SourceType::Interface { .. } | SourceType::Func | SourceType::Chan { .. } => TypeNode::any(),
    };
    Ok(node)
}

enum BuiltField {
    Member(FieldDecl),
    Heritage(Heritage),
    Dropped,
}

fn build_fields(fields: &[SourceField], decl: &str, ctx: &PackageContext<'_>) -> Result<(Vec<FieldDecl>, Vec<Heritage>)> {
    let mut members = Vec::new();
    let mut heritage = Vec::new();
    for field in fields {
        match build_field(field, decl, ctx)? {
            BuiltField::Member(member) => members.push(member),
            BuiltField::Heritage(parent) => heritage.push(parent),
            BuiltField::Dropped => {}
        }
    }
    Ok((members, heritage))
}

/// Package and name of the type an embedded field embeds.
fn embedded_type(ty: &SourceType) -> Option<(Option<&str>, &str, bool)> {
    match ty {
        SourceType::Named { package, name } => Some((package.as_deref(), name, false)),
        SourceType::Pointer { elem } => match elem.as_ref() {
            SourceType::Named { package, name } => Some((package.as_deref(), name, true)),
            _ => None,
        },
        _ => None,
    }
}

fn build_field(field: &SourceField, decl: &str, ctx: &PackageContext<'_>) -> Result<BuiltField> {
    let (name, embedded) = match &field.name {
        Some(name) => (name.as_str(), None),
        None => {
            let embedded = embedded_type(&field.ty).ok_or_else(|| Error::malformed(decl, "embedded field must name a type"))?;
            (embedded.1, Some(embedded))
        }
    };

    let tag = match &field.tag {
        Some(raw) => StructTag::parse(raw).map_err(|reason| Error::MalformedTag {
            decl: decl.to_string(),
            field: name.to_string(),
            reason,
        })?,
        None => StructTag::default(),
    };
    let tstype = tag.get("tstype");

    let extends = tstype.is_some_and(|t| t.has_option("extends"));
    if let Some((package, type_name, pointer)) = embedded {
        if extends {
            return Ok(BuiltField::Heritage(Heritage {
                name: ctx.heritage_name(package, type_name),
                partial: pointer && !tstype.is_some_and(|t| t.has_option("required")),
            }));
        }
    }

    if !is_exported(name) {
        return Ok(BuiltField::Dropped);
    }
    if extends {
        tracing::trace!(decl, field = name, "dropping named field tagged extends");
        return Ok(BuiltField::Dropped);
    }

    let json = tag.get("json");
    let yaml = tag.get("yaml");
    let mut member = FieldDecl::new(name, type_node(&field.ty, decl, ctx)?);

    if [json, yaml, tstype].into_iter().flatten().any(|entry| entry.is_skip()) {
        member = member.skipped();
    }
    // yaml is read after json and replaces both name and optionality.
    let optional = match (json, yaml) {
        (_, Some(yaml)) => yaml.has_option("omitempty"),
        (Some(json), None) => json.has_option("omitempty") || json.has_option("omitzero"),
        (None, None) => false,
    };
    if let Some(naming) = yaml.or(json) {
        if !naming.name.is_empty() && !naming.is_skip() {
            member = member.renamed(naming.name.as_str());
        }
    }
    if optional {
        member = member.optional();
    }
    if let Some(tstype) = tstype {
        if !tstype.name.is_empty() && !tstype.is_skip() {
            member = member.with_type_override(tstype.name.as_str());
        }
        if tstype.has_option("readonly") {
            member = member.readonly();
        }
    }

    member.doc = field.doc.as_deref().and_then(comments::clean);
    member.inline_comment = field.comment.as_deref().and_then(comments::clean);
    Ok(BuiltField::Member(member))
}

impl CodeGenerator {
    /// Build and add every file of a resolved package.
    pub fn add_package(&mut self, source: &SourcePackage) -> Result<&mut Self> {
        for unit in build_package(source)? {
            self.add_unit(unit);
        }
        Ok(self)
    }

    /// Parse and add a resolved package document (`.json`, `.yaml` or `.yml`).
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> gots_codegen::Result<()> {
    /// use gots_codegen::CodeGenerator;
    ///
    /// let mut generator = CodeGenerator::new();
    /// generator.add_source_file("build/models.json")?;
    /// generator.write_to_file("web/src/models/index.ts")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn add_source_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let source = SourcePackage::from_path(path)?;
        self.add_package(&source)
    }

    /// Parse and add a resolved package document held in memory.
    pub fn add_source_str(&mut self, text: &str, format: SourceFormat) -> Result<&mut Self> {
        let source = SourcePackage::parse(text, format, "<memory>")?;
        self.add_package(&source)
    }

    /// Add every resolved package document under a directory, in file name
    /// order.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> gots_codegen::Result<()> {
    /// use gots_codegen::CodeGenerator;
    ///
    /// let mut generator = CodeGenerator::new();
    /// generator.add_source_dir("build/resolved/")?;
    /// generator.write_to_file("bindings.ts")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn add_source_dir(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        for source in SourcePackage::load_all(path)? {
            self.add_package(&source)?;
        }
        Ok(self)
    }
}
