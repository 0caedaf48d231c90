use std::path::{Path, PathBuf};

use anyhow::Result;

use inspector::{run_source, DependencySource, Inspector};
use policy_engine::PolicyEngine;
use staticlink_core::{Config, InspectError, Platform, RawDependency, VerificationResult};

use super::load_config;

pub struct VerifyInputs {
    pub config_path: Option<PathBuf>,
    pub binary: PathBuf,
    pub strict: bool,
    pub verbose: bool,
    pub json: bool,
}

/// Runs extraction, classification and evaluation for one binary at a time.
pub struct Verifier {
    inspector: Inspector,
    policy: PolicyEngine,
}

impl Verifier {
    pub fn from_config(config: &Config) -> Self {
        Self {
            inspector: Inspector::new(config.inspector.clone()),
            policy: PolicyEngine::from_config(config),
        }
    }

    /// Verifies a binary with the host platform's inspection tool.
    pub fn verify(&self, binary: &Path, strict: bool) -> VerificationResult {
        let platform = Platform::detect();
        let raw = check_input(binary)
            .and_then(|()| self.inspector.extract_on(platform.clone(), binary))
            .map(|extraction| extraction.dependencies);
        self.conclude(&platform, binary, raw, strict)
    }

    /// Verifies a binary with a caller-chosen dependency source.
    pub fn verify_with(
        &self,
        source: &dyn DependencySource,
        binary: &Path,
        strict: bool,
    ) -> VerificationResult {
        let raw = check_input(binary).and_then(|()| run_source(source, binary));
        self.conclude(&source.platform(), binary, raw, strict)
    }

    fn conclude(
        &self,
        platform: &Platform,
        binary: &Path,
        raw: Result<Vec<RawDependency>, InspectError>,
        strict: bool,
    ) -> VerificationResult {
        match raw {
            Ok(raw) => {
                let dependencies = self.policy.classify_all(platform, raw);
                self.policy
                    .evaluate(platform, binary.to_path_buf(), dependencies, strict)
            }
            Err(err) => self.policy.failure(platform, binary.to_path_buf(), &err),
        }
    }
}

/// The binary must exist and be a regular file before any tool runs.
pub fn check_input(binary: &Path) -> Result<(), InspectError> {
    if !binary.exists() {
        return Err(InspectError::BinaryNotFound(binary.to_path_buf()));
    }
    if !binary.is_file() {
        return Err(InspectError::NotAFile(binary.to_path_buf()));
    }
    Ok(())
}

pub fn execute(inputs: VerifyInputs) -> Result<i32> {
    let config = load_config(inputs.config_path)?;
    let strict = inputs.strict || config.policy.strict;
    let verifier = Verifier::from_config(&config);
    let result = verifier.verify(&inputs.binary, strict);

    let code = reporting::exit_code(result.status());
    if inputs.json {
        println!("{}", reporting::render_json(&result)?);
    } else {
        println!("{}", reporting::render_human(&result, inputs.verbose));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fs;

    use inspector::linux::{parse_ldd_output, LddOutput};
    use inspector::macos::parse_otool_output;
    use inspector::windows::parse_dumpbin_output;
    use staticlink_core::Status;
    use tempfile::TempDir;

    use super::*;

    /// Feeds captured tool output through the real parsers.
    struct CannedSource {
        platform: Platform,
        output: &'static str,
        calls: Cell<u32>,
    }

    impl CannedSource {
        fn new(platform: Platform, output: &'static str) -> Self {
            Self {
                platform,
                output,
                calls: Cell::new(0),
            }
        }
    }

    impl DependencySource for CannedSource {
        fn platform(&self) -> Platform {
            self.platform.clone()
        }

        fn tool(&self) -> &str {
            "canned"
        }

        fn extract(&self, _binary: &Path) -> Result<Vec<RawDependency>, InspectError> {
            self.calls.set(self.calls.get() + 1);
            let deps = match self.platform {
                Platform::Linux => match parse_ldd_output(self.output) {
                    LddOutput::NotDynamic => Vec::new(),
                    LddOutput::Dependencies(deps) => deps,
                },
                Platform::MacOs => parse_otool_output(self.output),
                Platform::Windows => parse_dumpbin_output(self.output).unwrap_or_default(),
                Platform::Unsupported(_) => Vec::new(),
            };
            Ok(deps)
        }
    }

    struct FailingSource;

    impl DependencySource for FailingSource {
        fn platform(&self) -> Platform {
            Platform::Linux
        }

        fn tool(&self) -> &str {
            "ldd"
        }

        fn extract(&self, _binary: &Path) -> Result<Vec<RawDependency>, InspectError> {
            Err(InspectError::Timeout {
                tool: "ldd".to_string(),
                seconds: 10,
            })
        }
    }

    fn fixture() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let binary = dir.path().join("app");
        fs::write(&binary, b"\x7fELF").unwrap();
        (dir, binary)
    }

    fn verifier() -> Verifier {
        Verifier::from_config(&Config::default_config())
    }

    #[test]
    fn test_linux_not_dynamic() {
        let (_dir, binary) = fixture();
        let source = CannedSource::new(Platform::Linux, "\tnot a dynamic executable\n");
        let result = verifier().verify_with(&source, &binary, false);
        assert_eq!(result.status(), Status::Success);
        assert!(result.dependencies().is_empty());
    }

    #[test]
    fn test_linux_system_only_strict() {
        let (_dir, binary) = fixture();
        let output = "\
\tlinux-vdso.so.1 (0x00007ffd6b5f2000)
\tlibc.so.6 => /lib/x86_64-linux-gnu/libc.so.6 (0x00007f2a1c200000)
\t/lib64/ld-linux-x86-64.so.2 (0x00007f2a1cb8a000)
";
        let source = CannedSource::new(Platform::Linux, output);
        assert_eq!(verifier().verify_with(&source, &binary, false).status(), Status::Success);
        assert_eq!(verifier().verify_with(&source, &binary, true).status(), Status::Warning);
    }

    #[test]
    fn test_macos_libsystem_only() {
        let (_dir, binary) = fixture();
        let source = CannedSource::new(
            Platform::MacOs,
            "app:\n\t/usr/lib/libSystem.B.dylib (compatibility version 1.0.0, current version 1345.100.2)\n",
        );
        let result = verifier().verify_with(&source, &binary, false);
        assert_eq!(result.status(), Status::Success);
        assert!(result.message().contains("Optimal"));
    }

    #[test]
    fn test_macos_universal_libsystem_only() {
        let (_dir, binary) = fixture();
        let source = CannedSource::new(
            Platform::MacOs,
            "app (architecture x86_64):\n\t/usr/lib/libSystem.B.dylib (compatibility version 1.0.0, current version 1345.100.2)\napp (architecture arm64):\n\t/usr/lib/libSystem.B.dylib (compatibility version 1.0.0, current version 1345.100.2)\n",
        );
        let result = verifier().verify_with(&source, &binary, true);
        assert_eq!(result.status(), Status::Success);
        assert!(result.message().contains("Optimal"));
        assert_eq!(result.dependencies().len(), 1);
    }

    #[test]
    fn test_windows_third_party() {
        let (_dir, binary) = fixture();
        let source = CannedSource::new(
            Platform::Windows,
            "Dump of file app.exe\n\nFile Type: EXECUTABLE IMAGE\n\n  Image has the following dependencies:\n\n    kernel32.dll\n    mylib.dll\n\n  Summary\n",
        );
        let result = verifier().verify_with(&source, &binary, false);
        assert_eq!(result.status(), Status::Error);
        let third_party: Vec<_> = result
            .third_party_dependencies()
            .map(|dep| dep.name.as_str())
            .collect();
        assert_eq!(third_party, vec!["mylib.dll"]);
        assert!(result.message().contains("with 1 third-party"));
    }

    #[test]
    fn test_missing_binary_never_invokes_tool() {
        let dir = TempDir::new().unwrap();
        let source = CannedSource::new(Platform::Linux, "");
        let result = verifier().verify_with(&source, &dir.path().join("missing"), false);
        assert_eq!(result.status(), Status::Error);
        assert!(result.message().contains("not found"));
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = TempDir::new().unwrap();
        let source = CannedSource::new(Platform::Linux, "");
        let result = verifier().verify_with(&source, dir.path(), false);
        assert_eq!(result.status(), Status::Error);
        assert!(result.message().starts_with("Not a file"));
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn test_tool_failure_is_error_with_hint() {
        let (_dir, binary) = fixture();
        let result = verifier().verify_with(&FailingSource, &binary, false);
        assert_eq!(result.status(), Status::Error);
        assert!(result.message().contains("timed out"));
        assert!(result.details().iter().any(|detail| detail.contains("ldd")));
    }

    #[test]
    fn test_verify_missing_binary_on_host() {
        let dir = TempDir::new().unwrap();
        let result = verifier().verify(&dir.path().join("missing"), false);
        assert_eq!(result.status(), Status::Error);
        assert!(result.message().contains("not found"));
    }
}
