//! Tracing initialisation.
//!
//! Log lines go to stderr. Progress reports are printed to stdout by the
//! extractor, so they stay readable whatever the log level.

use std::collections::HashMap;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log level per component.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    pub level: String,
    /// Override per component: crate name → level
    pub components: HashMap<String, String>,
    /// Emit JSON structured logs instead of text
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            components: HashMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// `--verbose` turns on debug output for the ENSIndex crates only.
    pub fn verbose(mut self) -> Self {
        for krate in ["ensindex-core", "ensindex-evm", "ensindex-storage"] {
            self.components.insert(krate.to_string(), "debug".to_string());
        }
        self
    }

    /// Filter directives, e.g. `"info,ensindex_core=debug"`.
    pub fn directives(&self) -> String {
        let mut components: Vec<_> = self.components.iter().collect();
        components.sort();

        let mut directives = self.level.clone();
        for (component, level) in components {
            directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
        }
        directives
    }
}

/// Install the global subscriber. Call once at start-up.
pub fn init_tracing(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.directives()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives() {
        assert_eq!(LogConfig::default().directives(), "info");
    }

    #[test]
    fn verbose_directives_are_sorted_and_underscored() {
        let cfg = LogConfig {
            level: "warn".into(),
            ..LogConfig::default()
        }
        .verbose();
        assert_eq!(
            cfg.directives(),
            "warn,ensindex_core=debug,ensindex_evm=debug,ensindex_storage=debug"
        );
    }
}
