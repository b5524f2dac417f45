//! Subscriber setup for binaries embedding the engine.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Registry};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,wayphase_runtime=debug";

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install a stdout subscriber. `RUST_LOG` overrides `default_filter`.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_target(true)
        .init();
}

/// Like [`init_tracing`] but reports an already-installed subscriber as an error.
pub fn try_init_tracing(default_filter: &str) -> Result<(), TryInitError> {
    Registry::default()
        .with(env_filter(default_filter))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_is_reported() {
        let _ = try_init_tracing(DEFAULT_FILTER);
        assert!(try_init_tracing(DEFAULT_FILTER).is_err());
    }
}
