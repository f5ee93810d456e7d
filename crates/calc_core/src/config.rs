use anyhow::{bail, Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit the trigonometric functions work in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleMode {
    #[default]
    Radians,
    Degrees,
}

impl AngleMode {
    /// Converts an angle in this unit to radians.
    pub fn to_radians(self, angle: f64) -> f64 {
        match self {
            AngleMode::Radians => angle,
            AngleMode::Degrees => angle.to_radians(),
        }
    }

    /// Converts an angle in radians to this unit.
    pub fn from_radians(self, angle: f64) -> f64 {
        match self {
            AngleMode::Radians => angle,
            AngleMode::Degrees => angle.to_degrees(),
        }
    }

    /// Lenient selector used by the UI toggle: `"deg"` picks degrees, anything else radians.
    pub fn from_toggle(value: &str) -> Self {
        if value == "deg" {
            AngleMode::Degrees
        } else {
            AngleMode::Radians
        }
    }
}

impl FromStr for AngleMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rad" | "radian" | "radians" => Ok(AngleMode::Radians),
            "deg" | "degree" | "degrees" => Ok(AngleMode::Degrees),
            other => bail!("Unknown angle mode: {other}"),
        }
    }
}

impl fmt::Display for AngleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AngleMode::Radians => write!(f, "rad"),
            AngleMode::Degrees => write!(f, "deg"),
        }
    }
}

/// Session-level configuration of the expression engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub angles: AngleMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_mode_defaults_to_radians() {
        assert_eq!(EngineConfig::default().angles, AngleMode::Radians);
    }

    #[test]
    fn angle_mode_parses_short_and_long_names() {
        assert_eq!("deg".parse::<AngleMode>().unwrap(), AngleMode::Degrees);
        assert_eq!(" Radians ".parse::<AngleMode>().unwrap(), AngleMode::Radians);
        let err = "grad".parse::<AngleMode>().expect_err("expected error");
        assert!(err.to_string().contains("Unknown angle mode"));
    }

    #[test]
    fn toggle_falls_back_to_radians() {
        assert_eq!(AngleMode::from_toggle("deg"), AngleMode::Degrees);
        assert_eq!(AngleMode::from_toggle("rad"), AngleMode::Radians);
        assert_eq!(AngleMode::from_toggle("anything"), AngleMode::Radians);
    }

    #[test]
    fn degree_conversion_round_trips_through_radians() {
        let mode = AngleMode::Degrees;
        assert!((mode.to_radians(180.0) - std::f64::consts::PI).abs() < 1e-12);
        assert!((mode.from_radians(std::f64::consts::FRAC_PI_2) - 90.0).abs() < 1e-12);
        assert_eq!(AngleMode::Radians.to_radians(1.25), 1.25);
    }

    #[test]
    fn display_matches_toggle_values() {
        assert_eq!(AngleMode::Degrees.to_string(), "deg");
        assert_eq!(AngleMode::from_toggle(&AngleMode::Radians.to_string()), AngleMode::Radians);
    }
}
