use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Codegen(#[from] gots_codegen::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no packages configured in {0}")]
    NoPackages(PathBuf),

    #[error("packages {first} and {second} both write to {path}")]
    OutputCollision {
        path: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("{0} is not a resolved package document or a directory of them")]
    UnsupportedInput(PathBuf),
}

pub type Result<T> = std::result::Result<T, CliError>;
