//! `gots.yaml` loading.
//!
//! ```yaml
//! packages:
//!   - path: build/resolved/models.json
//!     output_path: web/src/models
//!     type_mappings:
//!       time.Time: string
//!       uuid.NullUUID: "string | null"
//!     fallback_type: unknown
//!     exclude_files: [legacy.go]
//!     const_style: union
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use gots_codegen::{CommentMode, Config, ConstStyle, Flavor, OverrideRules};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::{CliError, Result};

const DEFAULT_OUTPUT_FILENAME: &str = "index.ts";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub packages: Vec<PackageConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageConfig {
    /// A resolved package document, or a directory of them.
    pub path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub indent: Option<usize>,
    pub type_mappings: TypeMappings,
    pub fallback_type: Option<String>,
    pub frontmatter: Option<String>,
    pub include_files: Vec<String>,
    pub exclude_files: Vec<String>,
    pub flavor: Flavor,
    pub preserve_comments: CommentMode,
    pub group_constants: Option<bool>,
    pub const_style: ConstStyle,
    pub header: Option<String>,
}

/// `type_mappings` entries in file order, duplicates included, so that a
/// name mapped twice surfaces as an override conflict.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TypeMappings(pub Vec<(String, String)>);

impl<'de> Deserialize<'de> for TypeMappings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct MappingsVisitor;

        impl<'de> Visitor<'de> for MappingsVisitor {
            type Value = TypeMappings;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of Go type names to TypeScript expressions")
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(TypeMappings::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some(entry) = map.next_entry::<String, String>()? {
                    entries.push(entry);
                }
                Ok(TypeMappings(entries))
            }
        }

        deserializer.deserialize_map(MappingsVisitor)
    }
}

impl PackageConfig {
    /// Build and validate the generator configuration for this package.
    pub fn to_codegen_config(&self) -> Result<Config> {
        if self.path.as_os_str().is_empty() {
            return Err(gots_codegen::Error::InvalidConfig("package entry without a `path`".to_string()).into());
        }

        let overrides = OverrideRules::from_rules(self.type_mappings.0.iter().cloned())?;
        let mut config = Config::new()
            .with_overrides(overrides)
            .with_flavor(self.flavor)
            .with_preserve_comments(self.preserve_comments)
            .with_const_style(self.const_style);
        if let Some(indent) = self.indent {
            config = config.with_indent_width(indent);
        }
        if let Some(fallback) = &self.fallback_type {
            config = config.with_fallback_type(fallback.as_str());
        }
        if let Some(frontmatter) = &self.frontmatter {
            config = config.with_frontmatter(frontmatter.as_str());
        }
        if let Some(group) = self.group_constants {
            config = config.with_group_constants(group);
        }
        if let Some(header) = &self.header {
            config = config.with_header(header.as_str());
        }

        config.validate()?;
        Ok(config)
    }

    /// Exclusions win; when includes are listed only those files are kept.
    /// Both match the base name of the Go file.
    pub fn is_file_ignored(&self, file_name: &str) -> bool {
        let base = Path::new(file_name)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(file_name);
        if self.exclude_files.iter().any(|f| f == base) {
            return true;
        }
        !self.include_files.is_empty() && !self.include_files.iter().any(|f| f == base)
    }

    /// `output_path`, or `index.ts` inside it when it is not a `.ts` file;
    /// without one, `index.ts` next to the input.
    pub fn resolved_output_path(&self) -> PathBuf {
        match &self.output_path {
            Some(path) if path.extension().is_some_and(|ext| ext == "ts") => path.clone(),
            Some(dir) => dir.join(DEFAULT_OUTPUT_FILENAME),
            None => {
                let dir = if self.path.is_dir() {
                    self.path.as_path()
                } else {
                    self.path.parent().unwrap_or(Path::new(""))
                };
                dir.join(DEFAULT_OUTPUT_FILENAME)
            }
        }
    }
}

pub fn load(path: &Path) -> Result<FileConfig> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&text).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })
}
