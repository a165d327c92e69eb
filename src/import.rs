use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Error};

use lio_import_format::{write_package, ProblemToml, SourceFormat};

use crate::Opt;

/// Suffix of the name of the package directory.
pub const PACKAGE_SUFFIX: &str = "proglv";

/// Convert the task as specified by the command line options.
pub fn main_import(opt: &Opt) -> Result<(), Error> {
    let format: SourceFormat = opt.format.parse().map_err(|e: String| anyhow!(e))?;
    if !format.is_valid(&opt.source) {
        bail!(
            "{} is not a valid {} task directory",
            opt.source.display(),
            format.name()
        );
    }

    let task = format
        .parse_task(&opt.source)
        .with_context(|| format!("Failed to parse the task at {}", opt.source.display()))?;
    info!(
        "Parsed task {:?}: {} examples, {} tests, {} groups",
        task.title,
        task.examples.len(),
        task.tests.len(),
        task.test_groups.len()
    );

    if opt.dry_run {
        let problem_toml = ProblemToml::from_task(&task)?.to_toml_string()?;
        print!("{}", problem_toml);
        return Ok(());
    }

    let package_dir = package_dir(&opt.source, &opt.dest)?;
    fs::create_dir(&package_dir)
        .with_context(|| format!("Failed to create directory {}", package_dir.display()))?;
    println!("New directory created at {}", package_dir.display());

    write_package(&task, &package_dir)
        .with_context(|| format!("Failed to write the package at {}", package_dir.display()))?;
    Ok(())
}

/// The directory of the package: `<dest>/<source name>_proglv`.
pub fn package_dir(source: &Path, dest: &Path) -> Result<PathBuf, Error> {
    let name = match source.file_name() {
        Some(name) => name.to_owned(),
        None => source
            .canonicalize()
            .with_context(|| format!("Invalid source directory {}", source.display()))?
            .file_name()
            .ok_or_else(|| anyhow!("Invalid source directory {}", source.display()))?
            .to_owned(),
    };
    Ok(dest.join(format!("{}_{}", name.to_string_lossy(), PACKAGE_SUFFIX)))
}
