//! Tracing setup.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::RootConfig;

/// Environment variable holding filter directives; it wins over the
/// configuration.
pub const ENV_VAR: &str = "REACTK_LOG";

const DEFAULT_FILTER: &str = "info";

static TRACING_INSTALLED: Once = Once::new();

/// Installs a `fmt` subscriber (idempotent).
///
/// Does nothing if the application installed its own global subscriber.
pub fn init(config: &RootConfig) {
    TRACING_INSTALLED.call_once(|| {
        let filter = filter(std::env::var(ENV_VAR).ok().as_deref(), config);
        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_err()
        {
            tracing::debug!("a global subscriber is already installed");
        }
    });
}

fn filter(env: Option<&str>, config: &RootConfig) -> EnvFilter {
    env.or(config.log_filter.as_deref())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_wins_over_config() {
        let config = RootConfig {
            log_filter: Some("reactk_core=trace".into()),
            ..RootConfig::default()
        };
        assert_eq!(filter(Some("warn"), &config).to_string(), "warn");
        assert_eq!(filter(None, &config).to_string(), "reactk_core=trace");
    }

    #[test]
    fn falls_back_to_info() {
        assert_eq!(filter(None, &RootConfig::default()).to_string(), "info");
    }

    #[test]
    fn init_twice_is_harmless() {
        init(&RootConfig::default());
        init(&RootConfig::default());
    }
}
