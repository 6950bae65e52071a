use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use gots_codegen::{CommentMode, ConstStyle, Flavor};

#[derive(Debug, Parser)]
#[command(
    name = "gots",
    version,
    about = "Generate TypeScript declarations from resolved Go packages"
)]
pub struct Cli {
    /// Print debug messages (RUST_LOG takes precedence)
    #[arg(short = 'D', long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate every package listed in a config file and write to disk
    Generate(GenerateArgs),
    /// Render resolved package documents with options from the command line
    Render(RenderArgs),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Config file to load
    #[arg(short, long, default_value = "gots.yaml")]
    pub config: PathBuf,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Resolved package documents, or directories containing them
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Map a Go type name to a TypeScript expression
    #[arg(short = 'm', long = "map", value_name = "NAME=EXPR", value_parser = parse_mapping)]
    pub mappings: Vec<(String, String)>,

    /// Type used for references that cannot be resolved
    #[arg(long, default_value = gots_codegen::config::DEFAULT_FALLBACK)]
    pub fallback_type: String,

    /// Spaces per indentation level
    #[arg(long, default_value_t = gots_codegen::config::DEFAULT_INDENT_WIDTH)]
    pub indent: usize,

    /// Emit every constant on its own instead of grouping runs
    #[arg(long)]
    pub no_group_constants: bool,

    /// How grouped constants are written
    #[arg(long, value_enum, default_value_t = ConstStyleArg::Alias)]
    pub const_style: ConstStyleArg,

    #[arg(long, value_enum, default_value_t = FlavorArg::Default)]
    pub flavor: FlavorArg,

    #[arg(long, value_enum, default_value_t = CommentsArg::Default)]
    pub preserve_comments: CommentsArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FlavorArg {
    Default,
    Yaml,
}

impl From<FlavorArg> for Flavor {
    fn from(arg: FlavorArg) -> Self {
        match arg {
            FlavorArg::Default => Flavor::Default,
            FlavorArg::Yaml => Flavor::Yaml,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConstStyleArg {
    Alias,
    Union,
    Enum,
}

impl From<ConstStyleArg> for ConstStyle {
    fn from(arg: ConstStyleArg) -> Self {
        match arg {
            ConstStyleArg::Alias => ConstStyle::Alias,
            ConstStyleArg::Union => ConstStyle::Union,
            ConstStyleArg::Enum => ConstStyle::Enum,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CommentsArg {
    Default,
    Types,
    None,
}

impl From<CommentsArg> for CommentMode {
    fn from(arg: CommentsArg) -> Self {
        match arg {
            CommentsArg::Default => CommentMode::Default,
            CommentsArg::Types => CommentMode::Types,
            CommentsArg::None => CommentMode::None,
        }
    }
}

fn parse_mapping(raw: &str) -> Result<(String, String), String> {
    let (name, expr) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=EXPR, got `{raw}`"))?;
    let (name, expr) = (name.trim(), expr.trim());
    if name.is_empty() || expr.is_empty() {
        return Err(format!("expected NAME=EXPR, got `{raw}`"));
    }
    Ok((name.to_string(), expr.to_string()))
}
