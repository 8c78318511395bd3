//! Headless panel surface used by the smoke CLI and tests.

use crate::ui::{PanelControl, PanelEvent, PanelLayout, SurfaceFactory, UiSurface};

/// Surface that records every call made on it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSurface {
    pub serial: u32,
    pub layout: PanelLayout,
    pub shown: bool,
    pub closed: bool,
    pub front_requests: u32,
    values: [f64; 2],
    echo_programmatic: bool,
    notifications: Vec<PanelEvent>,
}

impl RecordingSurface {
    fn new(serial: u32, layout: &PanelLayout, echo_programmatic: bool) -> Self {
        Self {
            serial,
            layout: layout.clone(),
            shown: false,
            closed: false,
            front_requests: 0,
            values: [f64::from(layout.slider_min), layout.numeric_min],
            echo_programmatic,
            notifications: Vec::new(),
        }
    }

    /// Simulates the user moving `control`; returns the notification to deliver.
    pub fn user_input(&mut self, control: PanelControl, value: f64) -> PanelEvent {
        self.values[control.index()] = value;
        PanelEvent::ValueChanged { control, value }
    }

    /// Drains value-changed notifications raised by programmatic writes.
    pub fn take_notifications(&mut self) -> Vec<PanelEvent> {
        std::mem::take(&mut self.notifications)
    }
}

impl UiSurface for RecordingSurface {
    fn show(&mut self) {
        self.shown = true;
    }

    fn bring_to_front(&mut self) {
        self.front_requests += 1;
    }

    fn close(&mut self) {
        self.shown = false;
        self.closed = true;
    }

    fn set_control_value(&mut self, control: PanelControl, value: f64) {
        self.values[control.index()] = value;
        if self.echo_programmatic {
            self.notifications
                .push(PanelEvent::ValueChanged { control, value });
        }
    }

    fn control_value(&self, control: PanelControl) -> f64 {
        self.values[control.index()]
    }

    fn echoes_writes(&self) -> bool {
        self.echo_programmatic
    }
}

/// Factory for [`RecordingSurface`].
///
/// With echo enabled, programmatic writes queue a value-changed notification
/// the way most desktop toolkits do.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurfaceFactory {
    created: u32,
    echo_programmatic: bool,
}

impl RecordingSurfaceFactory {
    pub fn with_echo() -> Self {
        Self {
            created: 0,
            echo_programmatic: true,
        }
    }

    /// Number of surfaces constructed so far.
    pub fn created(&self) -> u32 {
        self.created
    }
}

impl SurfaceFactory for RecordingSurfaceFactory {
    type Surface = RecordingSurface;

    fn create_surface(&mut self, layout: &PanelLayout) -> RecordingSurface {
        self.created += 1;
        RecordingSurface::new(self.created, layout, self.echo_programmatic)
    }
}
