use tracing_subscriber::EnvFilter;

/// Application-level constants
pub const APP_NAME: &str = "Quizforge";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default log filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "quizforge=info"
}

/// Initialize tracing for a host binary or test harness.
/// Safe to call once per process.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .init();
}

/// Engine configuration: collaborator endpoints and timeouts.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the text-structuring collaborator.
    pub structuring_base_url: String,
    /// Timeout for structuring/proofreading HTTP calls.
    pub structuring_timeout_secs: u64,
    /// Audit log retention, in days.
    pub audit_retention_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            structuring_base_url: "http://localhost:8087".into(),
            structuring_timeout_secs: 120,
            audit_retention_days: 365,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_quizforge() {
        assert_eq!(APP_NAME, "Quizforge");
    }

    #[test]
    fn default_config_has_sane_timeouts() {
        let config = EngineConfig::default();
        assert!(config.structuring_timeout_secs > 0);
        assert!(config.audit_retention_days > 0);
    }
}
