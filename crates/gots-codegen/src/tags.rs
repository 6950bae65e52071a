//! Go struct tag parsing.
//!
//! Tags follow the `reflect.StructTag` convention: space separated
//! `key:"value"` pairs whose value is a name followed by comma separated
//! options, e.g. `json:"id,omitempty" tstype:",readonly"`.

/// One `key:"name,opt,..."` entry of a struct tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub key: String,
    pub name: String,
    pub options: Vec<String>,
}

impl TagEntry {
    fn from_value(key: String, value: &str) -> Self {
        let mut parts = value.split(',');
        let name = parts.next().unwrap_or_default().to_string();
        let options = parts.map(str::to_string).collect();
        Self { key, name, options }
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// `-` as the name excludes the field.
    pub fn is_skip(&self) -> bool {
        self.name == "-" && self.options.is_empty()
    }
}

/// A parsed struct tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructTag {
    entries: Vec<TagEntry>,
}

impl StructTag {
    /// Parse a raw tag. Surrounding backquotes, as written in Go source, are
    /// accepted and stripped.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        let raw = raw
            .strip_prefix('`')
            .and_then(|s| s.strip_suffix('`'))
            .unwrap_or(raw);

        let mut entries: Vec<TagEntry> = Vec::new();
        let mut rest = raw;
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }

            let key_len = rest
                .find(|c: char| c <= ' ' || c == ':' || c == '"' || c == '\u{7f}')
                .unwrap_or(rest.len());
            let key = &rest[..key_len];
            rest = &rest[key_len..];
            if key.is_empty() {
                return Err(format!("expected a key at `{rest}`"));
            }
            rest = rest
                .strip_prefix(':')
                .ok_or_else(|| format!("missing `:` after key `{key}`"))?;
            rest = rest
                .strip_prefix('"')
                .ok_or_else(|| format!("value of `{key}` is not quoted"))?;

            let (value, remaining) = read_quoted(rest).ok_or_else(|| format!("unterminated value for `{key}`"))?;
            rest = remaining;

            if entries.iter().any(|e| e.key == key) {
                return Err(format!("duplicate key `{key}`"));
            }
            entries.push(TagEntry::from_value(key.to_string(), &value));
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&TagEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read up to the closing quote, unescaping as Go's `strconv.Unquote` does
/// for the escapes that occur in tags.
fn read_quoted(input: &str) -> Option<(String, &str)> {
    let mut value = String::new();
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((value, &input[i + 1..])),
            '\\' => {
                let (_, escaped) = chars.next()?;
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
            }
            _ => value.push(c),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_and_options() {
        let tag = StructTag::parse(r#"json:"id,omitempty" yaml:"ident""#).unwrap();
        let json = tag.get("json").unwrap();
        assert_eq!(json.name, "id");
        assert!(json.has_option("omitempty"));
        assert!(!json.has_option("omitzero"));
        assert_eq!(tag.get("yaml").unwrap().name, "ident");
        assert!(tag.get("tstype").is_none());
    }

    #[test]
    fn test_parse_backquoted() {
        let tag = StructTag::parse("`json:\"name\"`").unwrap();
        assert_eq!(tag.get("json").unwrap().name, "name");
    }

    #[test]
    fn test_parse_empty_name_with_options() {
        let tag = StructTag::parse(r#"tstype:",readonly""#).unwrap();
        let entry = tag.get("tstype").unwrap();
        assert_eq!(entry.name, "");
        assert_eq!(entry.options, vec!["readonly".to_string()]);
    }

    #[test]
    fn test_parse_escaped_quote() {
        let tag = StructTag::parse(r#"tstype:"'a' | \"b\"""#).unwrap();
        assert_eq!(tag.get("tstype").unwrap().name, r#"'a' | "b""#);
    }

    #[test]
    fn test_skip_marker() {
        let tag = StructTag::parse(r#"json:"-""#).unwrap();
        assert!(tag.get("json").unwrap().is_skip());
        // `-,` names a field literally called "-"
        let tag = StructTag::parse(r#"json:"-,""#).unwrap();
        assert!(!tag.get("json").unwrap().is_skip());
    }

    #[test]
    fn test_empty_tag() {
        assert!(StructTag::parse("").unwrap().is_empty());
        assert!(StructTag::parse("   ").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_tags() {
        assert!(StructTag::parse("json").unwrap_err().contains("missing `:`"));
        assert!(StructTag::parse("json:id").unwrap_err().contains("not quoted"));
        assert!(StructTag::parse(r#"json:"id"#).unwrap_err().contains("unterminated"));
        assert!(StructTag::parse(r#"json:"a" json:"b""#).unwrap_err().contains("duplicate"));
        assert!(StructTag::parse(r#":"a""#).unwrap_err().contains("expected a key"));
    }
}
