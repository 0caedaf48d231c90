use std::path::PathBuf;

use staticlink_core::{Dependency, InspectError, Platform, PolicyConfig, Status, VerificationResult};

/// Reduces a classified dependency list to a verdict. First matching rule wins.
pub fn evaluate(
    policy: &PolicyConfig,
    platform: &Platform,
    binary: PathBuf,
    dependencies: Vec<Dependency>,
    strict: bool,
) -> VerificationResult {
    let platform = platform.clone();
    let total = dependencies.len();

    if total == 0 {
        return VerificationResult::new(
            Status::Success,
            platform,
            binary,
            dependencies,
            "Fully static binary (no dynamic dependencies)",
            vec![
                "Binary is completely static".to_string(),
                "No shared libraries linked".to_string(),
            ],
        );
    }

    let third_party = dependencies.iter().filter(|dep| !dep.is_system).count();
    if third_party > 0 {
        return VerificationResult::new(
            Status::Error,
            platform,
            binary,
            dependencies,
            format!("Dynamic binary with {third_party} third-party dependencies"),
            vec![
                format!("Total dependencies: {total}"),
                format!("Third-party dependencies: {third_party}"),
            ],
        );
    }

    let is_macos = platform == Platform::MacOs;
    if is_macos && total == 1 && dependencies[0].path.as_deref() == Some(policy.macos_runtime.as_str()) {
        let runtime = dependencies[0].name.clone();
        return VerificationResult::new(
            Status::Success,
            platform,
            binary,
            dependencies,
            "Optimal static binary (only libSystem required by macOS)",
            vec![
                format!("Only system library: {runtime}"),
                "Third-party libraries are statically linked".to_string(),
            ],
        );
    }

    if is_macos && total > policy.macos_max_system_deps {
        return VerificationResult::new(
            Status::Warning,
            platform,
            binary,
            dependencies,
            format!("Many system dependencies ({total}), review"),
            vec![
                format!("System dependencies: {total}"),
                format!(
                    "More than {} system libraries linked; consider reviewing dependencies",
                    policy.macos_max_system_deps
                ),
            ],
        );
    }

    let mut details = vec![
        format!("System dependencies: {total}"),
        "All dependencies are system libraries".to_string(),
    ];
    if strict {
        details.push("Strict mode requires no dynamic dependencies".to_string());
        return VerificationResult::new(
            Status::Warning,
            platform,
            binary,
            dependencies,
            "Not fully static (strict mode)",
            details,
        );
    }
    VerificationResult::new(
        Status::Success,
        platform,
        binary,
        dependencies,
        "Static binary (only system libraries)",
        details,
    )
}

/// The single ERROR result for a run that never reached a verdict.
pub fn failure(platform: &Platform, binary: PathBuf, err: &InspectError) -> VerificationResult {
    let mut details = Vec::new();
    if err.is_tool_failure() {
        if let Some(hint) = platform.remediation() {
            details.push(hint.to_string());
        }
    }
    if let InspectError::Timeout { .. } = err {
        details.push("The inspection tool was terminated after exceeding its time limit".to_string());
    }
    if let InspectError::UnsupportedPlatform(_) = err {
        details.push("Supported platforms: Linux, macOS, Windows".to_string());
    }
    VerificationResult::error(platform.clone(), binary, err.to_string(), details)
}
