use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use gots_codegen::{CodeGenerator, Config, SourcePackage};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::cli::GenerateArgs;
use crate::config::{self, PackageConfig};
use crate::error::{CliError, Result};

/// Nothing is written unless every package validates and renders.
pub fn run(args: GenerateArgs) -> Result<()> {
    let file_config = config::load(&args.config)?;
    if file_config.packages.is_empty() {
        return Err(CliError::NoPackages(args.config));
    }

    let configs = file_config
        .packages
        .iter()
        .map(PackageConfig::to_codegen_config)
        .collect::<Result<Vec<_>>>()?;
    check_outputs(&file_config.packages)?;

    let rendered = file_config
        .packages
        .par_iter()
        .zip(configs.into_par_iter())
        .map(|(package, config)| render_package(package, config))
        .collect::<Result<Vec<_>>>()?;

    for (path, code) in rendered {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| CliError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, code).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

fn check_outputs(packages: &[PackageConfig]) -> Result<()> {
    let mut seen: HashMap<PathBuf, &PathBuf> = HashMap::new();
    for package in packages {
        let output = package.resolved_output_path();
        if let Some(first) = seen.get(&output) {
            return Err(CliError::OutputCollision {
                path: output,
                first: (*first).clone(),
                second: package.path.clone(),
            });
        }
        seen.insert(output, &package.path);
    }
    Ok(())
}

fn render_package(package: &PackageConfig, config: Config) -> Result<(PathBuf, String)> {
    let sources = SourcePackage::load_all(&package.path)?;
    if sources.is_empty() {
        return Err(CliError::UnsupportedInput(package.path.clone()));
    }

    let mut generator = CodeGenerator::with_config(config)?;
    for mut source in sources {
        source.files.retain(|file| {
            let ignored = package.is_file_ignored(&file.name);
            if ignored {
                debug!(package = %source.package, file = %file.name, "file ignored");
            }
            !ignored
        });
        generator.add_package(&source)?;
    }

    debug!(path = %package.path.display(), units = generator.units().len(), "package loaded");
    Ok((package.resolved_output_path(), generator.generate()?))
}
