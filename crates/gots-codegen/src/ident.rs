//! TypeScript identifier rules.

use crate::error::{Error, Location, Result};

const RESERVED: &[&str] = &[
    // ECMAScript reserved words
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with",
    // strict mode
    "implements", "interface", "let", "package", "private", "protected", "public", "static",
    "yield",
    // predefined type names
    "any", "bigint", "boolean", "never", "number", "object", "string", "symbol", "undefined",
    "unknown",
];

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// A name usable as a declaration: an identifier that is not reserved.
pub fn check_declaration(name: &str, location: &Location) -> Result<()> {
    if is_identifier(name) && !is_reserved(name) {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier {
            name: name.to_string(),
            location: location.clone(),
        })
    }
}

/// Property names may be reserved words but otherwise need quoting.
pub fn property_name(name: &str) -> String {
    if is_identifier(name) {
        return name.to_string();
    }
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}
