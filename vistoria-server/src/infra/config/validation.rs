use super::models::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

/// Non-fatal findings collected while loading configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push(&mut self, message: impl Into<String>) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint(&mut self, message: impl Into<String>, hint: impl Into<String>) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Clamp inconsistent values in place and report what changed.
pub fn apply_guard_rails(config: &mut Config) -> ConfigWarnings {
    let mut warnings = ConfigWarnings::default();
    let catalog = &mut config.catalog;

    if catalog.max_page_size == 0 {
        warnings.push_with_hint(
            "catalog.max_page_size is 0; using 1",
            "Set CATALOG_MAX_PAGE_SIZE to a positive value",
        );
        catalog.max_page_size = 1;
    }
    if catalog.default_page_size == 0 || catalog.default_page_size > catalog.max_page_size {
        let clamped = catalog.default_page_size.clamp(1, catalog.max_page_size);
        warnings.push(format!(
            "catalog.default_page_size {} is outside 1..={}; using {clamped}",
            catalog.default_page_size, catalog.max_page_size
        ));
        catalog.default_page_size = clamped;
    }

    if config.database.max_connections == 0 {
        warnings.push("database.max_connections is 0; using 1");
        config.database.max_connections = 1;
    }

    if config.identity.subject_header.trim().is_empty() {
        warnings.push_with_hint(
            "identity.subject_header is empty; callers can never be identified",
            "Set IDENTITY_SUBJECT_HEADER to the header your gateway forwards",
        );
    }

    if config.dev_mode {
        warnings.push("dev_mode is enabled; CORS is permissive");
    } else if config.cors.allowed_origins.is_empty() {
        warnings.push_with_hint(
            "No CORS origins configured; any origin will be accepted",
            "Set CORS_ALLOWED_ORIGINS to a comma-separated list",
        );
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_default_page_is_clamped() {
        let mut config = Config::default();
        config.catalog.default_page_size = 500;
        config.catalog.max_page_size = 50;

        let warnings = apply_guard_rails(&mut config);
        assert_eq!(config.catalog.default_page_size, 50);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn defaults_are_clean() {
        let mut config = Config::default();
        assert!(apply_guard_rails(&mut config).is_empty());
    }
}
