use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use reporting::SweepStats;

use super::load_config;
use super::verify::Verifier;

/// File names that are build by-products rather than programs.
const SKIPPED_NAME_PARTS: &[&str] = &["cmake", "test", ".so", ".dylib"];
const SKIPPED_DIRS: &[&str] = &["CMakeFiles"];

pub struct SweepInputs {
    pub config_path: Option<PathBuf>,
    pub dir: PathBuf,
    pub strict: bool,
    pub verbose: bool,
    pub json: bool,
}

pub fn execute(inputs: SweepInputs) -> Result<i32> {
    let config = load_config(inputs.config_path)?;
    let strict = inputs.strict || config.policy.strict;
    let binaries = find_binaries(&inputs.dir)?;
    info!(dir = %inputs.dir.display(), count = binaries.len(), "sweep");

    let verifier = Verifier::from_config(&config);
    let results: Vec<_> = binaries
        .iter()
        .map(|binary| verifier.verify(binary, strict))
        .collect();
    let stats = SweepStats::from_results(&results);

    if inputs.json {
        println!("{}", reporting::render_json_many(&results)?);
    } else {
        for result in &results {
            println!("{}", reporting::render_human(result, inputs.verbose));
        }
        println!("{}", stats.human_summary());
    }
    Ok(stats.exit_code())
}

/// Executable regular files under `dir`, in path order.
pub fn find_binaries(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(anyhow::anyhow!("not a directory: {}", dir.display()));
    }
    let mut binaries = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry));
    for entry in walker {
        let entry = entry.with_context(|| format!("walk {}", dir.display()))?;
        if !entry.file_type().is_file() || is_skipped_name(entry.file_name().to_string_lossy().as_ref()) {
            continue;
        }
        if is_executable(&entry)? {
            debug!(path = %entry.path().display(), "candidate binary");
            binaries.push(entry.into_path());
        }
    }
    Ok(binaries)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && SKIPPED_DIRS
            .iter()
            .any(|name| entry.file_name().to_string_lossy() == *name)
}

fn is_skipped_name(name: &str) -> bool {
    let name = name.to_lowercase();
    SKIPPED_NAME_PARTS.iter().any(|part| name.contains(part)) || name.ends_with(".a")
}

#[cfg(unix)]
fn is_executable(entry: &DirEntry) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = entry
        .metadata()
        .with_context(|| format!("stat {}", entry.path().display()))?;
    Ok(metadata.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(entry: &DirEntry) -> Result<bool> {
    Ok(entry
        .path()
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("exe"))
        .unwrap_or(false))
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    use tempfile::TempDir;

    use super::*;

    fn touch(path: &Path, mode: u32) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"bin").unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn test_find_binaries_filters_build_noise() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("app"), 0o755);
        touch(&root.join("tools/helper"), 0o755);
        touch(&root.join("README"), 0o644);
        touch(&root.join("libfoo.so.1"), 0o755);
        touch(&root.join("libbar.a"), 0o755);
        touch(&root.join("unit_test"), 0o755);
        touch(&root.join("CMakeFiles/3.28/CompilerIdC/a.out"), 0o755);

        let found: Vec<_> = find_binaries(root)
            .unwrap()
            .into_iter()
            .map(|path| path.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(found, vec![PathBuf::from("app"), PathBuf::from("tools/helper")]);
    }

    #[test]
    fn test_find_binaries_rejects_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app");
        touch(&file, 0o755);
        assert!(find_binaries(&file).is_err());
    }
}
