//! Digester configuration

/// Default `log` target for engine and stock-rule messages
pub const DEFAULT_LOG_TARGET: &str = "rustydigester";

/// Default number of memoized path lookups
pub const DEFAULT_MATCH_CACHE_CAPACITY: usize = 128;

/// Options for a [`Digester`](super::Digester)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigesterConfig {
    /// Resolve namespace prefixes in the bundled tokenizer
    pub namespace_aware: bool,
    /// Capacity of the path → rules cache; 0 disables it
    pub match_cache_capacity: usize,
    /// Do not deliver whitespace-only body text to rules
    pub skip_whitespace_body: bool,
    pub log_target: String,
}

impl Default for DigesterConfig {
    fn default() -> Self {
        DigesterConfig {
            namespace_aware: true,
            match_cache_capacity: DEFAULT_MATCH_CACHE_CAPACITY,
            skip_whitespace_body: false,
            log_target: DEFAULT_LOG_TARGET.to_string(),
        }
    }
}

impl DigesterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespace_aware(mut self, enabled: bool) -> Self {
        self.namespace_aware = enabled;
        self
    }

    pub fn match_cache_capacity(mut self, capacity: usize) -> Self {
        self.match_cache_capacity = capacity;
        self
    }

    pub fn skip_whitespace_body(mut self, enabled: bool) -> Self {
        self.skip_whitespace_body = enabled;
        self
    }

    pub fn log_target(mut self, target: impl Into<String>) -> Self {
        self.log_target = target.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DigesterConfig::default();
        assert!(config.namespace_aware);
        assert_eq!(config.match_cache_capacity, 128);
        assert!(!config.skip_whitespace_body);
        assert_eq!(config.log_target, "rustydigester");
    }

    #[test]
    fn test_builder_setters() {
        let config = DigesterConfig::new()
            .namespace_aware(false)
            .match_cache_capacity(0)
            .skip_whitespace_body(true)
            .log_target("catalog");
        assert!(!config.namespace_aware);
        assert_eq!(config.match_cache_capacity, 0);
        assert!(config.skip_whitespace_body);
        assert_eq!(config.log_target, "catalog");
    }
}
