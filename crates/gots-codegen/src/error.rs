//! Errors surfaced by the translation engine.

use std::fmt;
use std::path::PathBuf;

/// Where a declaration came from in the resolved input.
///
/// `line` is present when the resolver recorded source positions; otherwise
/// the declaration is identified by its 1-based position within the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: Option<u32>,
    pub index: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, index: usize) -> Self {
        Self {
            file: file.into(),
            line: None,
            index,
        }
    }

    pub fn with_line(mut self, line: Option<u32>) -> Self {
        self.line = line;
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.file, line),
            None => write!(f, "{} (declaration #{})", self.file, self.index),
        }
    }
}

/// Errors produced while building, mapping or emitting declarations.
///
/// Everything except [`Error::Io`] and [`Error::Parse`] is an input or
/// configuration contract violation; the run is aborted and nothing is
/// written.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("duplicate declaration `{name}`: first declared at {first}, redeclared at {second}")]
    DuplicateDeclaration {
        name: String,
        first: Location,
        second: Location,
    },

    #[error("`{name}` is not a valid TypeScript identifier (declared at {location})")]
    InvalidIdentifier { name: String, location: Location },

    #[error("conflicting override rules for `{name}`")]
    UnresolvedOverrideConflict { name: String },

    #[error("malformed declaration `{decl}`: {reason}")]
    MalformedIR { decl: String, reason: String },

    #[error("malformed struct tag on `{decl}.{field}`: {reason}")]
    MalformedTag {
        decl: String,
        field: String,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn malformed(decl: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedIR {
            decl: decl.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
