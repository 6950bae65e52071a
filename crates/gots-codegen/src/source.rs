//! Resolved Go declarations as written by the external resolver.
//!
//! One document describes one package:
//!
//! ```yaml
//! package: simple
//! files:
//!   - name: simple.go
//!     decls:
//!       - type:
//!           name: UserRole
//!           underlying: { kind: basic, name: string }
//!       - const:
//!           name: RoleViewer
//!           type: { kind: named, name: UserRole }
//!           value: viewer
//!       - emit: "export type Extra = string;"
//! ```
//!
//! Documents are JSON or YAML; the format is picked from the file extension.

use std::fmt;
use std::path::Path;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::ir::Literal;

#[derive(Debug, Clone, Deserialize)]
pub struct SourcePackage {
    pub package: String,
    #[serde(default)]
    pub files: Vec<SourceFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceFile {
    pub name: String,
    #[serde(default)]
    pub decls: Vec<SourceDecl>,
}

/// One declaration, written as a single-key map: `type:`, `const:` or `emit:`.
#[derive(Debug, Clone)]
pub enum SourceDecl {
    Type(TypeSpec),
    Const(ConstSpec),
    /// TypeScript to copy into the output as-is.
    Emit(String),
}

impl<'de> Deserialize<'de> for SourceDecl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct DeclVisitor;

        impl<'de> Visitor<'de> for DeclVisitor {
            type Value = SourceDecl;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map with exactly one of `type`, `const` or `emit`")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let key: String = map
                    .next_key()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let decl = match key.as_str() {
                    "type" => SourceDecl::Type(map.next_value()?),
                    "const" => SourceDecl::Const(map.next_value()?),
                    "emit" => SourceDecl::Emit(map.next_value()?),
                    other => return Err(de::Error::unknown_variant(other, DECL_KINDS)),
                };
                if map.next_key::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(2, &self));
                }
                Ok(decl)
            }
        }

        deserializer.deserialize_map(DeclVisitor)
    }
}

const DECL_KINDS: &[&str] = &["type", "const", "emit"];

#[derive(Debug, Clone, Deserialize)]
pub struct TypeSpec {
    pub name: String,
    pub underlying: SourceType,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConstSpec {
    pub name: String,
    /// Absent for untyped constants.
    #[serde(rename = "type", default)]
    pub ty: Option<SourceType>,
    pub value: Literal,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

/// A resolved Go type expression.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceType {
    Basic {
        name: String,
    },
    Named {
        #[serde(default)]
        package: Option<String>,
        name: String,
    },
    Pointer {
        elem: Box<SourceType>,
    },
    Slice {
        elem: Box<SourceType>,
    },
    Array {
        elem: Box<SourceType>,
        #[serde(default)]
        len: Option<u64>,
    },
    Map {
        key: Box<SourceType>,
        value: Box<SourceType>,
    },
    Struct {
        #[serde(default)]
        fields: Vec<SourceField>,
    },
    Interface {
        #[serde(default)]
        methods: Vec<MethodSpec>,
        #[serde(default)]
        embeds: Vec<SourceType>,
    },
    Func,
    Chan {
        elem: Box<SourceType>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceField {
    /// Absent for embedded fields.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: SourceType,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodSpec {
    pub name: String,
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(SourceFormat::Json),
            "yaml" | "yml" => Some(SourceFormat::Yaml),
            _ => None,
        }
    }
}

impl SourcePackage {
    /// Parse a document. `origin` names it in error messages.
    pub fn parse(text: &str, format: SourceFormat, origin: &str) -> Result<Self> {
        let parsed = match format {
            SourceFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            SourceFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        };
        parsed.map_err(|reason| Error::Parse {
            path: origin.to_string(),
            reason,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = SourceFormat::from_path(path).ok_or_else(|| Error::Parse {
            path: path.display().to_string(),
            reason: "expected a .json, .yaml or .yml document".to_string(),
        })?;
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&text, format, &path.display().to_string())
    }

    /// Load one document, or every document under a directory in file name
    /// order. Files with other extensions are skipped.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let root = path.as_ref();
        if !root.is_dir() {
            return Ok(vec![Self::from_path(root)?]);
        }
        let mut packages = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::io(root, e.into()))?;
            if entry.file_type().is_file() && SourceFormat::from_path(entry.path()).is_some() {
                packages.push(Self::from_path(entry.path())?);
            }
        }
        Ok(packages)
    }
}
