use serde::{Deserialize, Serialize};

/// Elemental affinity of a character or boss.
///
/// Elements drive the hit-effect palette, the advantage cycle used by the
/// battle outcome formula and the weakness/resistance bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    /// Fire beats wind.
    #[default]
    Fire,
    /// Water beats fire.
    Water,
    /// Wind beats earth.
    Wind,
    /// Earth beats water.
    Earth,
    /// Dark and light beat each other.
    Dark,
    Light,
}

impl Element {
    pub const ALL: [Self; 6] = [
        Self::Fire,
        Self::Water,
        Self::Wind,
        Self::Earth,
        Self::Dark,
        Self::Light,
    ];

    /// Parses an element tag, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "fire" => Some(Self::Fire),
            "water" => Some(Self::Water),
            "wind" => Some(Self::Wind),
            "earth" => Some(Self::Earth),
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Wind => "wind",
            Self::Earth => "earth",
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fire => "Fire",
            Self::Water => "Water",
            Self::Wind => "Wind",
            Self::Earth => "Earth",
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }

    /// The element this one has a type advantage over.
    pub fn advantage_over(self) -> Self {
        match self {
            Self::Fire => Self::Wind,
            Self::Wind => Self::Earth,
            Self::Earth => Self::Water,
            Self::Water => Self::Fire,
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn has_advantage_over(self, other: Self) -> bool {
        self.advantage_over() == other
    }

    /// HUD accent colour as `#rrggbb`.
    pub fn accent_hex(self) -> &'static str {
        match self {
            Self::Fire => "#ff4444",
            Self::Water => "#4488ff",
            Self::Wind => "#44ff88",
            Self::Earth => "#cc8833",
            Self::Dark => "#aa44ff",
            Self::Light => "#ffdd44",
        }
    }
}
