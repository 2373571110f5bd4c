//! Direction-derived marker icon selector.

use serde::{Deserialize, Serialize};

use buswatch_core::types::Direction;

/// Which marker icon a bus renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerIcon {
    Eastbound,
    Westbound,
}

impl MarkerIcon {
    pub fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Eastbound => MarkerIcon::Eastbound,
            Direction::Westbound => MarkerIcon::Westbound,
        }
    }

    /// Arrow glyph shown inside the marker.
    pub fn glyph(&self) -> &'static str {
        match self {
            MarkerIcon::Eastbound => "→",
            MarkerIcon::Westbound => "←",
        }
    }

    /// CSS class consumers attach to the marker element.
    pub fn css_class(&self) -> &'static str {
        "bus-icon"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_follows_direction() {
        assert_eq!(
            MarkerIcon::for_direction(Direction::Eastbound),
            MarkerIcon::Eastbound
        );
        assert_eq!(
            MarkerIcon::for_direction(Direction::Westbound),
            MarkerIcon::Westbound
        );
    }

    #[test]
    fn glyphs_are_arrows() {
        assert_eq!(MarkerIcon::Eastbound.glyph(), "→");
        assert_eq!(MarkerIcon::Westbound.glyph(), "←");
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&MarkerIcon::Eastbound).expect("serialize");
        assert_eq!(json, r#""eastbound""#);
    }
}
