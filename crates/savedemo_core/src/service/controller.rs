//! Document lifecycle controller.
//!
//! # Responsibility
//! - Own the current document's `StateRecord`.
//! - React to plugin-load, new, end-of-open and close signals.
//! - Rebuild the displayed sphere and persist the state on every edit.
//!
//! # Invariants
//! - This is the only writer of the document store.
//! - After a successful rebuild the document holds exactly one plugin sphere.
//! - Decode and store failures are logged and recovered, never returned.
//! - State never crosses a document switch: every lifecycle signal replaces it.

use crate::codec::{decode, encode};
use crate::config::{GeometryPolicy, PluginConfig};
use crate::host::{HostDocument, ObjectId};
use crate::model::state::{clamp_radius, StateRecord};
use crate::repo::document_store::{DocumentStore, StateStore, StoreError};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const OWNED_OBJECT_KEY_SUFFIX: &str = ".object";

/// Controller lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    /// Constructed; plugin load has not run yet.
    Uninitialized,
    /// Holds a state for the current document.
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerError {
    /// Plugin load has not run; callers reschedule.
    NotYetInitialized,
    /// Edit value is NaN or infinite.
    InvalidRadius(f64),
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotYetInitialized => write!(f, "controller is not initialized yet"),
            Self::InvalidRadius(value) => write!(f, "radius must be a finite number, got {value}"),
        }
    }
}

impl Error for ControllerError {}

/// Where a loaded state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Decoded from the document blob.
    Document,
    /// No blob in the document.
    DefaultMissing,
    /// Blob was present but could not be decoded.
    DefaultCorrupt,
}

pub struct LifecycleController<D: HostDocument> {
    document: D,
    config: PluginConfig,
    owner: String,
    state: Option<StateRecord>,
    owned_sphere: Option<ObjectId>,
    revision: u64,
}

impl<D: HostDocument> LifecycleController<D> {
    /// Creates an uninitialized controller bound to the host document API.
    pub fn new(document: D, config: PluginConfig) -> Self {
        let owner = config.owner();
        Self {
            document,
            config,
            owner,
            state: None,
            owned_sphere: None,
            revision: 0,
        }
    }

    pub fn phase(&self) -> ControllerPhase {
        if self.state.is_some() {
            ControllerPhase::Ready
        } else {
            ControllerPhase::Uninitialized
        }
    }

    /// Current state of the active document.
    pub fn current(&self) -> Result<StateRecord, ControllerError> {
        self.state.ok_or(ControllerError::NotYetInitialized)
    }

    /// Number of state replacements and applied edits so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    /// `Uninitialized -> Ready(default)`. Repeated loads keep the current state.
    pub fn on_plugin_load(&mut self) {
        if self.state.is_some() {
            debug!("event=plugin_load module=controller status=skip reason=already_ready");
            return;
        }
        self.replace_state(StateRecord::default());
        info!("event=plugin_load module=controller status=ok");
    }

    /// A new empty document became active: reset and draw the default sphere.
    pub fn on_new_document(&mut self) {
        self.owned_sphere = None;
        self.replace_state(StateRecord::default());
        info!("event=document_new module=controller status=ok state=reset");
        self.rebuild_geometry();
    }

    /// A document finished opening: load its state (or defaults) and redraw.
    pub fn on_document_opened(&mut self) -> LoadSource {
        let (state, source) = self.load_state();
        self.owned_sphere = self.load_owned_sphere();
        self.replace_state(state);
        info!(
            "event=document_open module=controller status=ok source={:?} radius={:.1} height={:.1}",
            source, state.radius, state.height
        );
        self.rebuild_geometry();
        source
    }

    /// The active document is closing; its state goes with it.
    pub fn on_close_document(&mut self) {
        self.owned_sphere = None;
        self.replace_state(StateRecord::default());
        info!("event=document_close module=controller status=ok state=cleared");
    }

    /// Applies a user radius edit, rebuilds the sphere and persists.
    ///
    /// Values outside the control range are clamped. Without an active
    /// document the in-memory state still changes; rebuild and save are
    /// skipped.
    ///
    /// # Errors
    /// - `InvalidRadius` when `radius` is not finite.
    /// - `NotYetInitialized` before plugin load.
    pub fn on_user_edit(&mut self, radius: f64) -> Result<(), ControllerError> {
        if !radius.is_finite() {
            warn!("event=user_edit module=controller status=error error_code=invalid_radius");
            return Err(ControllerError::InvalidRadius(radius));
        }
        let state = self
            .state
            .as_mut()
            .ok_or(ControllerError::NotYetInitialized)?;

        let applied = clamp_radius(radius);
        if applied != radius {
            debug!(
                "event=user_edit module=controller status=clamped requested={} applied={}",
                radius, applied
            );
        }
        state.radius = applied;
        self.revision += 1;
        debug!(
            "event=user_edit module=controller status=ok radius={:.1} revision={}",
            applied, self.revision
        );

        self.rebuild_geometry();
        self.persist();
        Ok(())
    }

    /// Writes the current state into the active document.
    /// Store failures are logged here and never surfaced.
    fn persist(&mut self) {
        let Some(state) = self.state else {
            debug!("event=state_save module=controller status=skip reason=not_initialized");
            return;
        };
        let blob = encode(&state);
        let mut store = DocumentStore::new(&mut self.document);
        match store.save(&self.owner, &self.config.key_name, &blob) {
            Ok(()) => debug!(
                "event=state_save module=controller status=ok bytes={}",
                blob.len()
            ),
            Err(StoreError::Unavailable) => {
                debug!("event=state_save module=controller status=skip reason=no_active_document")
            }
            Err(err) => error!("event=state_save module=controller status=error error={err}"),
        }
    }

    /// Replaces the plugin sphere in the active document.
    /// Skipped without an active document; host refusals are logged.
    ///
    /// Under `ReplaceOwned` the new sphere is added before the old one is
    /// deleted, so a refused add leaves the previous sphere and its id intact.
    fn rebuild_geometry(&mut self) {
        if !self.document.has_active_document() {
            debug!("event=geometry_rebuild module=controller status=skip reason=no_active_document");
            return;
        }
        let Some(state) = self.state else {
            debug!("event=geometry_rebuild module=controller status=skip reason=not_initialized");
            return;
        };
        let sphere = state.build_geometry();

        if self.config.geometry_policy == GeometryPolicy::ClearDocument {
            if let Err(err) = self.document.clear_objects() {
                error!("event=geometry_rebuild module=controller status=error stage=clear error={err}");
                return;
            }
            self.owned_sphere = None;
        }

        let id = match self.document.add_sphere(&sphere) {
            Ok(id) => id,
            Err(err) => {
                error!("event=geometry_rebuild module=controller status=error stage=add error={err}");
                return;
            }
        };
        if let Some(previous) = self.owned_sphere.replace(id) {
            if let Err(err) = self.document.delete_object(previous) {
                error!(
                    "event=geometry_rebuild module=controller status=error stage=delete object={} error={err}",
                    previous
                );
            }
        }
        if self.config.geometry_policy == GeometryPolicy::ReplaceOwned {
            self.save_owned_sphere(id);
        }
        self.document.redraw_views();
        debug!(
            "event=geometry_rebuild module=controller status=ok object={} radius={:.1}",
            id, sphere.radius
        );
    }

    fn load_state(&mut self) -> (StateRecord, LoadSource) {
        let store = DocumentStore::new(&mut self.document);
        let Some(blob) = store.load(&self.owner, &self.config.key_name) else {
            info!("event=state_load module=controller status=ok source=default reason=missing");
            return (StateRecord::default(), LoadSource::DefaultMissing);
        };

        match decode(&blob) {
            Ok(decoded) => {
                let (state, adjustments) = decoded.sanitized();
                if adjustments.any() {
                    warn!(
                        "event=state_load module=controller status=adjusted radius_clamped={} radius_defaulted={} height_defaulted={}",
                        adjustments.radius_clamped,
                        adjustments.radius_defaulted,
                        adjustments.height_defaulted
                    );
                }
                (state, LoadSource::Document)
            }
            Err(err) => {
                warn!(
                    "event=state_load module=controller status=error error_code=decode_failed error={err} fallback=default"
                );
                (StateRecord::default(), LoadSource::DefaultCorrupt)
            }
        }
    }

    fn load_owned_sphere(&mut self) -> Option<ObjectId> {
        if self.config.geometry_policy != GeometryPolicy::ReplaceOwned {
            return None;
        }
        let key = self.owned_object_key();
        let store = DocumentStore::new(&mut self.document);
        store
            .load(&self.owner, &key)
            .and_then(|text| text.trim().parse::<u64>().ok())
            .map(ObjectId)
    }

    fn save_owned_sphere(&mut self, id: ObjectId) {
        let key = self.owned_object_key();
        let mut store = DocumentStore::new(&mut self.document);
        if let Err(err) = store.save(&self.owner, &key, &id.0.to_string()) {
            warn!("event=state_save module=controller status=error target=owned_object error={err}");
        }
    }

    fn owned_object_key(&self) -> String {
        format!("{}{}", self.config.key_name, OWNED_OBJECT_KEY_SUFFIX)
    }

    fn replace_state(&mut self, state: StateRecord) {
        self.state = Some(state);
        self.revision += 1;
    }
}
