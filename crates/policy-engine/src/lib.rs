use std::path::PathBuf;

use tracing::{debug, info};

use staticlink_core::{
    Config, Dependency, InspectError, Platform, PolicyConfig, RawDependency, VerificationResult,
};

mod classify;
mod decision;

pub use classify::ClassificationRules;
pub use decision::{evaluate, failure};

/// Classifies dependencies and turns them into a verdict.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    rules: ClassificationRules,
    policy: PolicyConfig,
}

impl PolicyEngine {
    pub fn new(rules: ClassificationRules, policy: PolicyConfig) -> Self {
        Self { rules, policy }
    }

    /// Creates a new PolicyEngine from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ClassificationRules::from_config(&config.classifier),
            config.policy.clone(),
        )
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    pub fn classify(&self, platform: &Platform, raw: RawDependency) -> Dependency {
        self.rules.classify(platform, raw)
    }

    /// Classifies every dependency, keeping the tool's order.
    pub fn classify_all(&self, platform: &Platform, raw: Vec<RawDependency>) -> Vec<Dependency> {
        raw.into_iter()
            .map(|dep| {
                let dep = self.classify(platform, dep);
                debug!(name = %dep.name, path = ?dep.path, is_system = dep.is_system, "classified");
                dep
            })
            .collect()
    }

    pub fn evaluate(
        &self,
        platform: &Platform,
        binary: PathBuf,
        dependencies: Vec<Dependency>,
        strict: bool,
    ) -> VerificationResult {
        let result = evaluate(&self.policy, platform, binary, dependencies, strict);
        info!(
            status = ?result.status(),
            binary = %result.binary().display(),
            message = result.message(),
            "verdict"
        );
        result
    }

    pub fn failure(&self, platform: &Platform, binary: PathBuf, err: &InspectError) -> VerificationResult {
        info!(binary = %binary.display(), error = %err, "verification failed");
        failure(platform, binary, err)
    }
}
