use std::str::FromStr;

use color::DynamicColor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::model::PinRole;

/// Error raised when a color string cannot be parsed.
#[derive(Debug, Error)]
#[error("invalid color '{input}': {reason}")]
pub struct ColorError {
    input: String,
    reason: String,
}

/// Wrapper around the `DynamicColor` type from the color crate.
///
/// Wire colors come from two places: an explicit CSS color string on a
/// connection, or the role-keyed default palette ([`Color::for_role`]).
#[derive(Clone, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Create a new `Color` from a string.
    /// This will parse CSS color strings such as "#ff0000", "rgb(255, 0, 0)", "red", etc.
    pub fn new(color_str: &str) -> Result<Self, ColorError> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Color { color }),
            Err(err) => Err(ColorError {
                input: color_str.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    /// The default wire color for a pin role.
    ///
    /// Wires without an explicit color on their connection are drawn in the
    /// conventional color of the source pin's electrical role.
    pub fn for_role(role: PinRole) -> Self {
        let name = match role {
            PinRole::Power => "red",
            PinRole::Ground => "black",
            PinRole::Gpio => "blue",
            PinRole::Analog => "green",
            PinRole::Pwm => "orange",
            PinRole::I2c => "purple",
            PinRole::Spi => "teal",
            PinRole::Uart => "brown",
        };
        Self::new(name).unwrap()
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black").unwrap()
    }
}

// Colors travel as CSS strings, matching how collaborators supply them.
impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.color)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Color::new(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_color() {
        assert!(Color::new("red").is_ok());
        assert!(Color::new("rebeccapurple").is_ok());
    }

    #[test]
    fn test_parse_hex_color() {
        assert!(Color::new("#00ff00").is_ok());
    }

    #[test]
    fn test_parse_invalid_color() {
        let err = Color::new("definitely-not-a-color").unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-color"));
    }

    #[test]
    fn test_default_is_black() {
        assert_eq!(Color::default(), Color::new("black").unwrap());
    }

    #[test]
    fn test_role_palette_is_distinct() {
        let roles = [
            PinRole::Power,
            PinRole::Ground,
            PinRole::Gpio,
            PinRole::Analog,
            PinRole::Pwm,
            PinRole::I2c,
            PinRole::Spi,
            PinRole::Uart,
        ];
        for (i, a) in roles.iter().enumerate() {
            for b in &roles[i + 1..] {
                assert_ne!(Color::for_role(*a), Color::for_role(*b));
            }
        }
    }
}
