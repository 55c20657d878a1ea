//! Configuration values carried from the build phase into the index.
//!
//! Every settings type has documented defaults so a request document may omit
//! any key. With the `serde` feature enabled they deserialize from the JSON
//! shape used by the request layer.

use std::path::PathBuf;

use crate::models::types::{Result, TransitError};

/// Parameters of the routing graph.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RoutingSettings {
    /// Minutes spent waiting at a stop before boarding any bus.
    pub bus_wait_time: u32,
    /// Bus speed in km/h.
    pub bus_velocity: f64,
}

impl RoutingSettings {
    pub const DEFAULT_WAIT_TIME: u32 = 6;
    pub const DEFAULT_VELOCITY: f64 = 40.0;

    pub fn new(bus_wait_time: u32, bus_velocity: f64) -> Self {
        Self {
            bus_wait_time,
            bus_velocity,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.bus_velocity.is_finite() || self.bus_velocity <= 0.0 {
            return Err(TransitError::InvalidConfiguration(format!(
                "bus velocity must be positive, got {}",
                self.bus_velocity
            )));
        }
        Ok(())
    }

    /// Minutes needed to ride `meters` at the configured velocity.
    pub fn travel_minutes(&self, meters: f64) -> f64 {
        meters / (self.bus_velocity * 1000.0 / 60.0)
    }
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WAIT_TIME, Self::DEFAULT_VELOCITY)
    }
}

/// A map colour: nothing, a named/CSS colour, or explicit RGB(A) channels.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Color {
    #[default]
    None,
    Named(String),
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, f64),
}

/// Label offset in pixels, `[dx, dy]` on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offset(pub f64, pub f64);

/// Map appearance. Not interpreted by the catalogue itself; it travels with
/// the index so the serve phase sees what the build phase was given.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderSettings {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub line_width: f64,
    pub stop_radius: f64,
    pub bus_label_font_size: u32,
    pub bus_label_offset: Offset,
    pub stop_label_font_size: u32,
    pub stop_label_offset: Offset,
    pub underlayer_color: Color,
    pub underlayer_width: f64,
    pub color_palette: Vec<Color>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 1200.0,
            padding: 50.0,
            line_width: 14.0,
            stop_radius: 5.0,
            bus_label_font_size: 20,
            bus_label_offset: Offset(7.0, 15.0),
            stop_label_font_size: 20,
            stop_label_offset: Offset(7.0, -3.0),
            underlayer_color: Color::Rgba(255, 255, 255, 0.85),
            underlayer_width: 3.0,
            color_palette: vec![
                Color::Named("green".into()),
                Color::Rgb(255, 160, 0),
                Color::Named("red".into()),
            ],
        }
    }
}

/// Location of the persisted index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SerializationSettings {
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_velocity_validation() {
        assert!(RoutingSettings::default().validate().is_ok());

        for velocity in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = RoutingSettings::new(6, velocity).validate().unwrap_err();
            assert!(matches!(err, TransitError::InvalidConfiguration(_)));
        }
    }

    #[test]
    fn test_travel_minutes() {
        // 40 km/h covers 2/3 km per minute
        let settings = RoutingSettings::new(6, 40.0);
        assert_relative_eq!(settings.travel_minutes(2000.0), 3.0);
        assert_relative_eq!(settings.travel_minutes(0.0), 0.0);
    }
}
