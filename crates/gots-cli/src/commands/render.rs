use std::io;

use gots_codegen::{CodeGenerator, Config, OverrideRules, SourcePackage};

use crate::cli::RenderArgs;
use crate::error::{CliError, Result};

pub fn run(args: RenderArgs) -> Result<()> {
    let overrides = OverrideRules::from_rules(args.mappings.iter().cloned())?;
    let config = Config::new()
        .with_overrides(overrides)
        .with_fallback_type(args.fallback_type.as_str())
        .with_indent_width(args.indent)
        .with_group_constants(!args.no_group_constants)
        .with_const_style(args.const_style.into())
        .with_flavor(args.flavor.into())
        .with_preserve_comments(args.preserve_comments.into());

    let mut generator = CodeGenerator::with_config(config)?;
    for input in &args.inputs {
        let sources = SourcePackage::load_all(input)?;
        if sources.is_empty() {
            return Err(CliError::UnsupportedInput(input.clone()));
        }
        for source in &sources {
            generator.add_package(source)?;
        }
    }

    match &args.output {
        Some(path) => generator.write_to_file(path)?,
        None => generator.write_to(io::stdout().lock())?,
    }
    Ok(())
}
