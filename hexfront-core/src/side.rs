//! The two opposing factions

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two sides fighting over the map
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Axis = 0,
    Allies = 1,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Axis => Side::Allies,
            Side::Allies => Side::Axis,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Side::Axis => "Axis",
            Side::Allies => "Allies",
        }
    }

    /// UI color as (r, g, b)
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Side::Axis => (255, 0, 0),
            Side::Allies => (0, 0, 255),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(Side::Axis.opponent(), Side::Allies);
        assert_eq!(Side::Allies.opponent(), Side::Axis);
        assert_eq!(Side::Axis.opponent().opponent(), Side::Axis);
    }

    #[test]
    fn test_names() {
        assert_eq!(Side::Axis.name(), "Axis");
        assert_eq!(Side::Allies.to_string(), "Allies");
    }
}
