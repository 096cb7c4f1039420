//! # Layerwarp
//!
//! Applies one translate, rotate or scale to every selected layer of an
//! image document at once, through a host's action-descriptor channel:
//! - Normal layers have their pixels transformed
//! - Layers with a mask have the mask transformed instead
//! - Other layers without a mask are skipped
//! - The user's selection and layer focus are put back afterwards
//! - The whole run is one undo step
//!
//! ## Architecture
//!
//! Layerwarp is organized as a workspace with multiple crates:
//!
//! 1. **layerwarp-core** - Snapshot model, descriptors, host traits, events, errors
//! 2. **layerwarp-settings** - Orchestrator configuration (TOML/JSON)
//! 3. **layerwarp-transform** - Descriptor builders, target resolver, selection
//!    snapshot, orchestrator state machine, history transaction, operation gate
//! 4. **layerwarp-host** - In-memory simulated host for tests and dry runs
//! 5. **layerwarp** - This facade

pub use layerwarp_core::{
    CommandChannel, Descriptor, DescriptorResult, DocumentId, DocumentQuery, DocumentSnapshot,
    EventDispatcher, HistoryControl, Host, HostError, LayerId, LayerInfo, LayerKind,
    OperationState, ScaleUnit, SuspensionToken, TransformCenter, TransformEvent, TransformKind,
    TransformTarget,
};

pub use layerwarp_settings::{ConfigError, ReentrancyPolicy, SettingsError, TransformConfig};

pub use layerwarp_transform::{
    descriptors, params, MoveDirection, MultiLayerTransform, OperationGate, ProcessedLayer,
    RotateDirection, TransformCommand, TransformError, TransformOrchestrator, TransformReport,
    TransformRequest,
};

pub use layerwarp_host as host;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support (default `info`)
///
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

/// Initialize logging with one JSON object per event on stdout
pub fn init_json_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_current_span(true))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}
