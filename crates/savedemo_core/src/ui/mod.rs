//! Floating panel contract.
//!
//! # Responsibility
//! - Describe the UI surface operations the core drives (construct, show,
//!   bring to front, close, set/get control values).
//! - Describe the notifications a surface sends back.
//!
//! Layout, centering and window chrome belong to the surface implementation.

pub mod memory;
pub mod panel;

use crate::model::state::{RADIUS_MAX, RADIUS_MIN};

/// The two controls bound to the radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelControl {
    /// Integer slider.
    Slider,
    /// Numeric stepper with one decimal place.
    Numeric,
}

impl PanelControl {
    /// The control that mirrors this one.
    pub fn sibling(self) -> Self {
        match self {
            Self::Slider => Self::Numeric,
            Self::Numeric => Self::Slider,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Slider => 0,
            Self::Numeric => 1,
        }
    }
}

/// Notification sent by a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEvent {
    ValueChanged { control: PanelControl, value: f64 },
    /// The window was closed and disposed.
    Closed,
}

/// Construction parameters handed to the surface factory.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    pub title: &'static str,
    pub heading: &'static str,
    pub label: &'static str,
    pub slider_min: i32,
    pub slider_max: i32,
    pub numeric_min: f64,
    pub numeric_max: f64,
    pub decimal_places: u32,
    pub increment: f64,
    pub client_width: u32,
    pub client_height: u32,
    pub topmost: bool,
    pub show_in_taskbar: bool,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            title: "Save Demo Panel",
            heading: "Adjust Sphere Scale",
            label: "Scale",
            slider_min: RADIUS_MIN as i32,
            slider_max: RADIUS_MAX as i32,
            numeric_min: RADIUS_MIN,
            numeric_max: RADIUS_MAX,
            decimal_places: 1,
            increment: 0.1,
            client_width: 320,
            client_height: 120,
            topmost: true,
            show_in_taskbar: false,
        }
    }
}

impl PanelLayout {
    /// Slider position for `value`: truncated toward zero, then clamped.
    pub fn slider_position(&self, value: f64) -> f64 {
        let position = value.trunc() as i32;
        f64::from(position.clamp(self.slider_min, self.slider_max))
    }
}

/// A live floating panel.
pub trait UiSurface {
    fn show(&mut self);
    fn bring_to_front(&mut self);
    /// Closes and disposes the window. The surface is unusable afterwards.
    fn close(&mut self);
    fn set_control_value(&mut self, control: PanelControl, value: f64);
    fn control_value(&self, control: PanelControl) -> f64;

    /// Whether `set_control_value` raises a value-changed notification.
    fn echoes_writes(&self) -> bool {
        true
    }
}

/// Constructs fresh surfaces; called again after every close.
pub trait SurfaceFactory {
    type Surface: UiSurface;

    fn create_surface(&mut self, layout: &PanelLayout) -> Self::Surface;
}
