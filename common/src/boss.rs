use crate::element::Element;
use crate::stats::CharacterStats;

/// Number of distinct boss looks; stages past this cycle around.
pub const BOSS_VARIANTS: usize = 10;

const BOSS_NAMES: [&str; BOSS_VARIANTS] = [
    "Dark Dragon",
    "Chaos Wyvern",
    "Abyss Drake",
    "Void Serpent",
    "Necro Bahamut",
    "Shadow Leviathan",
    "Death Phoenix",
    "Blood Tiamat",
    "Inferno Hydra",
    "Eternal Dragon",
];

/// Body palette per variant, indexed like [`BASE_PALETTE`].
const BOSS_PALETTES: [[&str; 5]; BOSS_VARIANTS] = [
    ["#2a1a3e", "#3a2a4e", "#1a0a2e", "#3a1a5e", "#2a0a4e"],
    ["#3e1a1a", "#4e2a2a", "#2e0a0a", "#5e1a1a", "#4e0a0a"],
    ["#1a2a3e", "#2a3a4e", "#0a1a2e", "#1a3a5e", "#0a2a4e"],
    ["#1a3e1a", "#2a4e2a", "#0a2e0a", "#1a5e1a", "#0a4e0a"],
    ["#3e3e1a", "#4e4e2a", "#2e2e0a", "#5e5e1a", "#4e4e0a"],
    ["#3e1a2a", "#4e2a3a", "#2e0a1a", "#5e1a2a", "#4e0a1a"],
    ["#2a3e1a", "#3a4e2a", "#1a2e0a", "#2a5e1a", "#1a4e0a"],
    ["#1a1a3e", "#2a2a4e", "#0a0a2e", "#1a1a5e", "#0a0a4e"],
    ["#3e2a1a", "#4e3a2a", "#2e1a0a", "#5e2a1a", "#4e1a0a"],
    ["#2a1a2a", "#3a2a3a", "#1a0a1a", "#3a1a3a", "#2a0a2a"],
];

const BOSS_EYES: [&str; BOSS_VARIANTS] = [
    "#ff0000", "#ff4400", "#00ffff", "#44ff00", "#ffff00", "#ff00ff", "#ff8800", "#0088ff",
    "#ff2200", "#ffffff",
];

/// Colours of the base dragon model that get swapped per stage.
pub const BASE_PALETTE: [&str; 5] = BOSS_PALETTES[0];
/// Eye colour of the base dragon model (used as both colour and emissive).
pub const BASE_EYE: &str = "#ff0000";

/// Stats and recolouring instructions for the boss of one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct BossProfile {
    pub stage: u32,
    pub stats: CharacterStats,
    pub palette: [&'static str; 5],
    pub eye: &'static str,
}

impl BossProfile {
    /// Doubles the base dragon per stage and cycles its name and colours.
    pub fn for_stage(stage: u32) -> Self {
        let stage = stage.max(1);
        let multiplier = 2f64.powi(stage as i32 - 1);
        let index = (stage as usize - 1) % BOSS_VARIANTS;
        let scale = |value: u32| (value as f64 * multiplier).round() as u32;

        Self {
            stage,
            stats: CharacterStats {
                name: BOSS_NAMES[index].to_string(),
                hp: scale(500),
                attack: scale(85),
                defense: scale(60),
                speed: scale(35),
                element: Element::Dark,
                rarity: (4 + (stage - 1) / 2).min(crate::stats::MAX_RARITY),
                trait_text: None,
                special_ability: Some("Dark Breath".to_string()),
                weakness: Some(Element::Light),
                resistance: Some(Element::Dark),
            },
            palette: BOSS_PALETTES[index],
            eye: BOSS_EYES[index],
        }
    }

    /// Maps a base-model colour to this stage's colour, if it is recoloured.
    pub fn recolor(&self, color: &str) -> Option<&'static str> {
        BASE_PALETTE
            .iter()
            .position(|base| base.eq_ignore_ascii_case(color))
            .map(|slot| self.palette[slot])
    }

    /// Battle scale of the boss model for this stage.
    pub fn model_scale(&self) -> f32 {
        1.15 + (self.stage - 1) as f32 * 0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_one_is_the_base_dragon() {
        let boss = BossProfile::for_stage(1);
        assert_eq!(boss.stats.name, "Dark Dragon");
        assert_eq!(boss.stats.hp, 500);
        assert_eq!(boss.stats.rarity, 4);
        assert_eq!(boss.recolor("#2a1a3e"), Some("#2a1a3e"));
    }

    #[test]
    fn stats_double_per_stage_and_looks_cycle() {
        let boss = BossProfile::for_stage(3);
        assert_eq!(boss.stats.hp, 2000);
        assert_eq!(boss.stats.attack, 340);
        assert_eq!(boss.stats.rarity, 5);
        assert_eq!(boss.eye, "#00ffff");
        assert_eq!(boss.recolor("#3A2A4E"), Some("#2a3a4e"));
        assert_eq!(boss.recolor("#123456"), None);

        assert_eq!(BossProfile::for_stage(11).stats.name, "Dark Dragon");
    }
}
