//! Core of the SaveDemo host plugin.
//! Keeps one `(radius, height)` record in sync across the floating panel,
//! the sphere drawn in the active document and the copy persisted inside it.

pub mod codec;
pub mod config;
pub mod event;
pub mod host;
pub mod logging;
pub mod model;
pub mod repo;
pub mod runtime;
pub mod service;
pub mod ui;

pub use codec::{decode, encode, DecodeError};
pub use config::{ConfigError, GeometryPolicy, PluginConfig, PLUGIN_ID, STATE_KEY_NAME};
pub use event::{AppEvent, DocumentEvent, EventListener, EventSource, SubscriptionId};
pub use host::memory::{InMemoryHost, MemoryDocument};
pub use host::{DocumentObject, HostDocument, HostError, ObjectId};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::state::{
    derive_geometry, Point3, Sphere, StateRecord, DEFAULT_HEIGHT, DEFAULT_RADIUS, RADIUS_MAX,
    RADIUS_MIN,
};
pub use repo::document_store::{DocumentStore, StateStore, StoreError, StoreResult};
pub use runtime::plugin::{CommandError, PluginRuntime, SHOW_PANEL_COMMAND};
pub use runtime::tasks::{TaskQueue, UiTask};
pub use service::controller::{ControllerError, ControllerPhase, LifecycleController, LoadSource};
pub use ui::memory::{RecordingSurface, RecordingSurfaceFactory};
pub use ui::panel::{ControlChange, PanelAdapter, ShowOutcome};
pub use ui::{PanelControl, PanelEvent, PanelLayout, SurfaceFactory, UiSurface};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
