//! `otool -L` output parsing.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use staticlink_core::{InspectError, Platform, RawDependency};

use crate::command::ToolCommand;
use crate::{file_name, DependencySource};

pub struct OtoolSource {
    program: String,
    timeout: Duration,
}

impl OtoolSource {
    pub fn new(program: &str, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            timeout,
        }
    }
}

impl DependencySource for OtoolSource {
    fn platform(&self) -> Platform {
        Platform::MacOs
    }

    fn tool(&self) -> &str {
        &self.program
    }

    fn extract(&self, binary: &Path) -> Result<Vec<RawDependency>, InspectError> {
        let output =
            ToolCommand::new(&self.program, &["-L"], binary.to_path_buf(), self.timeout).run()?;
        if !output.status.success() {
            return Err(InspectError::ToolError {
                tool: self.program.clone(),
                message: output.failure_text(),
            });
        }
        Ok(parse_otool_output(&output.stdout))
    }
}

/// The first line echoes the binary itself and is always dropped. Universal
/// binaries list the same libraries once per architecture; each path is kept
/// only at its first appearance.
pub fn parse_otool_output(output: &str) -> Vec<RawDependency> {
    let mut seen = HashSet::new();
    output
        .trim()
        .lines()
        .skip(1)
        .filter_map(|line| {
            // Architecture headers look like `<binary> (architecture arm64):`.
            if line.trim_end().ends_with(':') {
                return None;
            }
            let path = line.split_whitespace().next()?;
            seen.insert(path)
                .then(|| RawDependency::new(file_name(path), Some(path.to_string())))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_libsystem() {
        let output = "\
/Users/dev/build/app:
\t/usr/lib/libSystem.B.dylib (compatibility version 1.0.0, current version 1345.100.2)
";
        assert_eq!(
            parse_otool_output(output),
            vec![RawDependency::new(
                "libSystem.B.dylib",
                Some("/usr/lib/libSystem.B.dylib".to_string())
            )]
        );
    }

    #[test]
    fn test_mixed_dependencies() {
        let output = "\
build/app:
\t@rpath/libfoo.dylib (compatibility version 0.0.0, current version 0.0.0)
\t/System/Library/Frameworks/CoreFoundation.framework/Versions/A/CoreFoundation (compatibility version 150.0.0, current version 2048.1.101)
\t/opt/homebrew/opt/openssl@3/lib/libssl.3.dylib (compatibility version 3.0.0, current version 3.0.0)
\t/usr/lib/libSystem.B.dylib (compatibility version 1.0.0, current version 1345.100.2)
";
        let deps = parse_otool_output(output);
        let names: Vec<_> = deps.iter().map(|dep| dep.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["libfoo.dylib", "CoreFoundation", "libssl.3.dylib", "libSystem.B.dylib"]
        );
        assert_eq!(deps[0].path.as_deref(), Some("@rpath/libfoo.dylib"));
    }

    #[test]
    fn test_header_only_has_no_dependencies() {
        assert!(parse_otool_output("build/app:\n").is_empty());
        assert!(parse_otool_output("").is_empty());
    }

    #[test]
    fn test_universal_binary_headers_skipped() {
        let output = "\
app (architecture x86_64):
\t/usr/lib/libSystem.B.dylib (compatibility version 1.0.0, current version 1345.100.2)
app (architecture arm64):
\t/usr/lib/libSystem.B.dylib (compatibility version 1.0.0, current version 1345.100.2)
";
        assert_eq!(
            parse_otool_output(output),
            vec![RawDependency::new(
                "libSystem.B.dylib",
                Some("/usr/lib/libSystem.B.dylib".to_string())
            )]
        );
    }

    #[test]
    fn test_universal_binary_keeps_first_order() {
        let output = "\
app (architecture x86_64):
\t@rpath/libfoo.dylib (compatibility version 0.0.0, current version 0.0.0)
\t/usr/lib/libSystem.B.dylib (compatibility version 1.0.0, current version 1345.100.2)
app (architecture arm64):
\t/usr/lib/libSystem.B.dylib (compatibility version 1.0.0, current version 1345.100.2)
\t@rpath/libfoo.dylib (compatibility version 0.0.0, current version 0.0.0)
\t/usr/lib/libc++.1.dylib (compatibility version 1.0.0, current version 1700.255.0)
";
        let names: Vec<_> = parse_otool_output(output)
            .into_iter()
            .map(|dep| dep.name)
            .collect();
        assert_eq!(names, vec!["libfoo.dylib", "libSystem.B.dylib", "libc++.1.dylib"]);
    }
}
