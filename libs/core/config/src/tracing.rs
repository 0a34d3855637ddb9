use crate::Environment;
use tracing::debug;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre with the project-standard configuration.
///
/// Call early in main(), before any fallible operations. Safe to call
/// multiple times (subsequent installs are ignored).
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Initialize tracing with environment-aware output.
///
/// - Production (`APP_ENV=production`): JSON format for log aggregation,
///   module targets hidden, default level `info`.
/// - Development: pretty-printed format, default level `debug`.
///
/// `RUST_LOG` overrides the default filter in both environments. Includes
/// `tracing_error::ErrorLayer` so eyre reports carry span traces. Safe to
/// call multiple times (common in tests).
pub fn init_tracing(environment: &Environment) {
    let is_production = environment.is_production();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("debug")
        }
    });

    let result = if is_production {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_target(false).pretty())
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    if result.is_err() {
        // Already initialized, fine in tests
        debug!("Tracing already initialized, skipping re-initialization");
    }
}
