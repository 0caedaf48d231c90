use staticlink_core::config::{ClassifierConfig, MatchField, MatchKind, Matcher};
use staticlink_core::{Dependency, Platform, RawDependency};

/// System library markers per platform. A dependency is system-provided when
/// any matcher for its platform hits; everything else is third-party.
#[derive(Debug, Clone)]
pub struct ClassificationRules {
    config: ClassifierConfig,
}

impl ClassificationRules {
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn matchers(&self, platform: &Platform) -> &[Matcher] {
        self.config.for_platform(platform)
    }

    pub fn is_system(&self, platform: &Platform, raw: &RawDependency) -> bool {
        self.matchers(platform)
            .iter()
            .any(|matcher| matcher_hits(matcher, raw))
    }

    pub fn classify(&self, platform: &Platform, raw: RawDependency) -> Dependency {
        let is_system = self.is_system(platform, &raw);
        Dependency::classified(raw, is_system)
    }
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}

fn matcher_hits(matcher: &Matcher, raw: &RawDependency) -> bool {
    let subject = match matcher.field {
        MatchField::Path => raw.path.as_deref().unwrap_or(&raw.name),
        MatchField::Name => raw.name.as_str(),
    };
    let (subject, pattern) = if matcher.case_insensitive {
        (subject.to_lowercase(), matcher.pattern.to_lowercase())
    } else {
        (subject.to_string(), matcher.pattern.clone())
    };
    match matcher.kind {
        MatchKind::Contains => subject.contains(&pattern),
        MatchKind::Prefix => subject.starts_with(&pattern),
    }
}
