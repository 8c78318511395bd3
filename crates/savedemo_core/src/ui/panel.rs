//! Binding between the floating panel and the lifecycle controller.
//!
//! # Responsibility
//! - Turn user control changes into controller edits.
//! - Mirror each change into the sibling control.
//! - Pull controller state into both controls on init and refresh.
//! - Own the surface lifetime: show, bring to front, recreate after close.
//!
//! # Invariants
//! - Never writes the document store or mutates state directly; every edit
//!   goes through `LifecycleController::on_user_edit`.
//! - Edits are gated until the first successful init/refresh.
//! - A value written programmatically does not come back as a user edit,
//!   even when the toolkit delivers its echo after later writes.

use crate::host::HostDocument;
use crate::service::controller::{ControllerError, LifecycleController};
use crate::ui::{PanelControl, PanelLayout, SurfaceFactory, UiSurface};
use log::{debug, info};
use std::collections::VecDeque;

const VALUE_EPSILON: f64 = 1e-9;
const MAX_PENDING_ECHOES: usize = 16;

/// What happened to one control notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlChange {
    /// Forwarded to the controller as a user edit.
    Applied,
    /// Echo of a programmatic write; dropped.
    Echo,
    /// Panel not initialized yet; dropped.
    Gated,
    /// No live surface; dropped.
    NoSurface,
}

/// Result of [`PanelAdapter::show`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    /// A new surface was constructed and needs initialization.
    Created,
    /// The existing surface was brought to front.
    Raised,
}

pub struct PanelAdapter<F: SurfaceFactory> {
    factory: F,
    layout: PanelLayout,
    surface: Option<F::Surface>,
    closed: bool,
    initialized: bool,
    /// Outstanding programmatic writes per control, oldest first.
    pending_echo: [VecDeque<f64>; 2],
}

impl<F: SurfaceFactory> PanelAdapter<F> {
    pub fn new(factory: F) -> Self {
        Self::with_layout(factory, PanelLayout::default())
    }

    pub fn with_layout(factory: F, layout: PanelLayout) -> Self {
        Self {
            factory,
            layout,
            surface: None,
            closed: true,
            initialized: false,
            pending_echo: [VecDeque::new(), VecDeque::new()],
        }
    }

    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn surface(&self) -> Option<&F::Surface> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut F::Surface> {
        self.surface.as_mut()
    }

    /// Whether a live, not-closed surface exists.
    pub fn is_visible(&self) -> bool {
        self.surface.is_some() && !self.closed
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Shows the panel, creating a surface only when none is live.
    pub fn show(&mut self) -> ShowOutcome {
        if let Some(surface) = self.surface.as_mut().filter(|_| !self.closed) {
            surface.bring_to_front();
            debug!("event=panel_show module=panel status=ok action=raise");
            return ShowOutcome::Raised;
        }

        let mut surface = self.factory.create_surface(&self.layout);
        surface.show();
        surface.bring_to_front();
        self.surface = Some(surface);
        self.closed = false;
        self.initialized = false;
        self.clear_pending_echoes();
        info!("event=panel_show module=panel status=ok action=create");
        ShowOutcome::Created
    }

    /// Closes the live surface, if any.
    pub fn close(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.close();
        }
        self.on_closed();
    }

    /// Handles the surface's closed notification; the next show recreates.
    pub fn on_closed(&mut self) {
        self.closed = true;
        self.initialized = false;
        self.surface = None;
        self.clear_pending_echoes();
        info!("event=panel_closed module=panel status=ok");
    }

    /// First sync after construction; opens the edit gate.
    ///
    /// # Errors
    /// - `NotYetInitialized` when the controller has no state yet; the
    ///   caller reschedules.
    pub fn initialize<D: HostDocument>(
        &mut self,
        controller: &LifecycleController<D>,
    ) -> Result<(), ControllerError> {
        self.sync_from(controller, "panel_init")
    }

    /// Writes the controller radius into both controls without editing.
    pub fn refresh<D: HostDocument>(
        &mut self,
        controller: &LifecycleController<D>,
    ) -> Result<(), ControllerError> {
        self.sync_from(controller, "panel_refresh")
    }

    pub fn on_slider_changed<D: HostDocument>(
        &mut self,
        controller: &mut LifecycleController<D>,
        value: f64,
    ) -> Result<ControlChange, ControllerError> {
        self.on_control_changed(controller, PanelControl::Slider, value)
    }

    pub fn on_numeric_changed<D: HostDocument>(
        &mut self,
        controller: &mut LifecycleController<D>,
        value: f64,
    ) -> Result<ControlChange, ControllerError> {
        self.on_control_changed(controller, PanelControl::Numeric, value)
    }

    /// Mirrors `value` into the sibling control, then forwards one edit.
    pub fn on_control_changed<D: HostDocument>(
        &mut self,
        controller: &mut LifecycleController<D>,
        control: PanelControl,
        value: f64,
    ) -> Result<ControlChange, ControllerError> {
        if !self.is_visible() {
            return Ok(ControlChange::NoSurface);
        }
        let pending = &mut self.pending_echo[control.index()];
        if let Some(position) = pending.iter().position(|expected| same_value(*expected, value)) {
            pending.remove(position);
            return Ok(ControlChange::Echo);
        }
        if !self.initialized {
            debug!("event=user_edit module=panel status=skip reason=not_initialized");
            return Ok(ControlChange::Gated);
        }

        self.write_control(control.sibling(), value);
        controller.on_user_edit(value)?;
        Ok(ControlChange::Applied)
    }

    fn sync_from<D: HostDocument>(
        &mut self,
        controller: &LifecycleController<D>,
        event: &str,
    ) -> Result<(), ControllerError> {
        if !self.is_visible() {
            return Ok(());
        }
        let radius = controller.current()?.radius;
        self.write_control(PanelControl::Slider, radius);
        self.write_control(PanelControl::Numeric, radius);
        self.initialized = true;
        info!("event={event} module=panel status=ok radius={radius:.1}");
        Ok(())
    }

    /// Programmatic write; remembers the value so its echo is dropped.
    fn write_control(&mut self, control: PanelControl, value: f64) {
        let value = match control {
            PanelControl::Slider => self.layout.slider_position(value),
            PanelControl::Numeric => value,
        };
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if same_value(surface.control_value(control), value) {
            return;
        }
        surface.set_control_value(control, value);
        if !surface.echoes_writes() {
            return;
        }
        let pending = &mut self.pending_echo[control.index()];
        pending.push_back(value);
        if pending.len() > MAX_PENDING_ECHOES {
            pending.pop_front();
            debug!("event=panel_echo module=panel status=skip reason=pending_overflow control={control:?}");
        }
    }

    fn clear_pending_echoes(&mut self) {
        for pending in &mut self.pending_echo {
            pending.clear();
        }
    }
}

fn same_value(a: f64, b: f64) -> bool {
    (a - b).abs() <= VALUE_EPSILON
}
