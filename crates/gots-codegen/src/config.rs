//! Generator configuration.
//!
//! A [`Config`] is validated once, before any unit is processed, and then
//! shared immutably by the mapper, the field resolver and the emitter.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_HEADER: &str = "Code generated by gots. DO NOT EDIT.";
pub const DEFAULT_FALLBACK: &str = "unknown";
pub const DEFAULT_INDENT_WIDTH: usize = 2;

/// Exact-name mappings from Go type names to TypeScript expressions.
///
/// Keys are either package-qualified (`time.Time`, `uuid.NullUUID`) or local
/// declaration names. Rules keep the order they were added in, and a name
/// may be mapped only once.
///
/// ```
/// use gots_codegen::OverrideRules;
///
/// let rules = OverrideRules::from_rules([
///     ("time.Time", "string"),
///     ("uuid.NullUUID", "string"),
/// ]).unwrap();
/// assert_eq!(rules.get("time.Time"), Some("string"));
///
/// let conflict = OverrideRules::from_rules([("time.Time", "string"), ("time.Time", "Date")]);
/// assert!(conflict.is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideRules {
    mappings: IndexMap<String, String>,
}

impl OverrideRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules<I, K, V>(rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut overrides = Self::new();
        for (name, expr) in rules {
            overrides.insert(name, expr)?;
        }
        Ok(overrides)
    }

    /// Add a rule. Mapping a name twice is a conflict, even to the same
    /// expression.
    pub fn insert(&mut self, name: impl Into<String>, expr: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.mappings.contains_key(&name) {
            return Err(Error::UnresolvedOverrideConflict { name });
        }
        self.mappings.insert(name, expr.into());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.mappings.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.mappings.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.mappings.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.mappings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The expression substituted for references that cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPolicy {
    expr: String,
}

impl FallbackPolicy {
    pub fn new(expr: impl Into<String>) -> Self {
        Self { expr: expr.into() }
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK)
    }
}

/// Which source comments survive into the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentMode {
    /// Doc and inline comments everywhere.
    #[default]
    Default,
    /// Doc comments, and inline comments on fields only.
    Types,
    None,
}

impl CommentMode {
    pub fn keeps_docs(self) -> bool {
        self != CommentMode::None
    }

    pub fn keeps_field_comments(self) -> bool {
        self != CommentMode::None
    }

    pub fn keeps_const_comments(self) -> bool {
        self == CommentMode::Default
    }
}

/// Naming convention for fields without a naming tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// Keep the Go field name, as `encoding/json` does.
    #[default]
    Default,
    /// Lower-case the Go field name, as `gopkg.in/yaml` does.
    Yaml,
}

impl Flavor {
    pub fn member_name(self, source_name: &str) -> String {
        match self {
            Flavor::Default => source_name.to_string(),
            Flavor::Yaml => source_name.to_lowercase(),
        }
    }
}

/// How a constant group with a synthesized alias is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstStyle {
    /// `export type Role = string;` and bindings typed `Role`.
    #[default]
    Alias,
    /// Untyped bindings and `export type Role = typeof A | typeof B;`.
    Union,
    /// `export enum Role { ... }`. Groups holding booleans keep the alias
    /// style.
    Enum,
}

/// Options for one output target.
///
/// ```
/// use gots_codegen::{Config, Flavor};
///
/// let config = Config::new()
///     .with_fallback_type("any")
///     .with_indent_width(4)
///     .with_flavor(Flavor::Yaml);
/// config.validate().unwrap();
/// assert_eq!(config.fallback().expr(), "any");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    overrides: OverrideRules,
    fallback: FallbackPolicy,
    indent_width: usize,
    header: String,
    group_constants: bool,
    const_style: ConstStyle,
    frontmatter: Option<String>,
    preserve_comments: CommentMode,
    flavor: Flavor,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overrides: OverrideRules::new(),
            fallback: FallbackPolicy::default(),
            indent_width: DEFAULT_INDENT_WIDTH,
            header: DEFAULT_HEADER.to_string(),
            group_constants: true,
            const_style: ConstStyle::Alias,
            frontmatter: None,
            preserve_comments: CommentMode::Default,
            flavor: Flavor::Default,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(mut self, overrides: OverrideRules) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_fallback_type(mut self, expr: impl Into<String>) -> Self {
        self.fallback = FallbackPolicy::new(expr);
        self
    }

    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Header template. Each line is written as a `//` comment and
    /// `{version}` expands to the generator version.
    pub fn with_header(mut self, template: impl Into<String>) -> Self {
        self.header = template.into();
        self
    }

    pub fn with_group_constants(mut self, enabled: bool) -> Self {
        self.group_constants = enabled;
        self
    }

    pub fn with_const_style(mut self, style: ConstStyle) -> Self {
        self.const_style = style;
        self
    }

    /// Text written verbatim after the header, typically imports.
    pub fn with_frontmatter(mut self, frontmatter: impl Into<String>) -> Self {
        self.frontmatter = Some(frontmatter.into());
        self
    }

    pub fn with_preserve_comments(mut self, mode: CommentMode) -> Self {
        self.preserve_comments = mode;
        self
    }

    pub fn with_flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }

    pub fn overrides(&self) -> &OverrideRules {
        &self.overrides
    }

    pub(crate) fn overrides_mut(&mut self) -> &mut OverrideRules {
        &mut self.overrides
    }

    pub fn fallback(&self) -> &FallbackPolicy {
        &self.fallback
    }

    pub fn indent_width(&self) -> usize {
        self.indent_width
    }

    pub fn group_constants(&self) -> bool {
        self.group_constants
    }

    pub fn const_style(&self) -> ConstStyle {
        self.const_style
    }

    pub fn frontmatter(&self) -> Option<&str> {
        self.frontmatter.as_deref()
    }

    pub fn preserve_comments(&self) -> CommentMode {
        self.preserve_comments
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Check everything that can be checked before any input is seen.
    pub fn validate(&self) -> Result<()> {
        if self.indent_width == 0 {
            return Err(Error::InvalidConfig("indent width must be at least 1".to_string()));
        }
        if self.fallback.expr().trim().is_empty() {
            return Err(Error::InvalidConfig("fallback type must not be empty".to_string()));
        }
        for (name, expr) in self.overrides.iter() {
            if name.trim().is_empty() {
                return Err(Error::InvalidConfig("override rule with an empty type name".to_string()));
            }
            if expr.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("override rule for `{name}` has an empty expression")));
            }
        }
        self.render_header().map(|_| ())
    }

    /// Expand the header template into `// ` prefixed lines.
    pub fn render_header(&self) -> Result<String> {
        let mut expanded = String::new();
        let mut rest = self.header.as_str();
        while let Some(open) = rest.find('{') {
            expanded.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| Error::InvalidConfig(format!("unclosed placeholder in header `{}`", self.header)))?;
            match &after[..close] {
                "version" => expanded.push_str(env!("CARGO_PKG_VERSION")),
                other => {
                    return Err(Error::InvalidConfig(format!("unknown header placeholder `{{{other}}}`")));
                }
            }
            rest = &after[close + 1..];
        }
        expanded.push_str(rest);

        let mut out = String::new();
        for line in expanded.lines() {
            if line.is_empty() {
                out.push_str("//\n");
            } else {
                out.push_str("// ");
                out.push_str(line);
                out.push('\n');
            }
        }
        Ok(out)
    }
}
