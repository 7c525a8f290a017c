use crate::element::Element;
use crate::lenient;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const MAX_RARITY: u32 = 5;

const UNKNOWN_TRAIT: &str = "A mysterious being whose true identity is unknown. They possess \
strange powers, emanating magic so intense it warps the air around them.";

/// Stat block of a character, boss or fusion unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterStats {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::stat")]
    pub hp: u32,
    #[serde(deserialize_with = "lenient::stat")]
    pub attack: u32,
    #[serde(deserialize_with = "lenient::stat")]
    pub defense: u32,
    #[serde(deserialize_with = "lenient::stat")]
    pub speed: u32,
    #[serde(deserialize_with = "lenient::element")]
    pub element: Element,
    #[serde(deserialize_with = "lenient::stat")]
    pub rarity: u32,
    #[serde(
        rename = "trait",
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub trait_text: Option<String>,
    #[serde(
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub special_ability: Option<String>,
    #[serde(
        deserialize_with = "lenient::optional_element",
        skip_serializing_if = "Option::is_none"
    )]
    pub weakness: Option<Element>,
    #[serde(
        deserialize_with = "lenient::optional_element",
        skip_serializing_if = "Option::is_none"
    )]
    pub resistance: Option<Element>,
}

impl CharacterStats {
    /// Rarity used by bonus formulas; unrated characters count as 1.
    pub fn effective_rarity(&self) -> u32 {
        if self.rarity == 0 { 1 } else { self.rarity }
    }

    /// Scales the four combat stats, rounding to the nearest integer.
    pub fn amplified(&self, multiplier: f32) -> Self {
        let scale = |value: u32| (value as f32 * multiplier).round().max(0.0) as u32;
        Self {
            hp: scale(self.hp),
            attack: scale(self.attack),
            defense: scale(self.defense),
            speed: scale(self.speed),
            ..self.clone()
        }
    }

    /// Stats used when the fusion service answers without a usable stat block.
    /// Grows the first pick's stats; zero stats count as 100 hp / 50 otherwise.
    pub fn fallback_fusion(first: &Self, second: &Self) -> Self {
        let grow = |value: u32, default: u32, factor: f64| {
            let base = if value == 0 { default } else { value };
            (base as f64 * factor).floor() as u32
        };
        Self {
            name: format!("{}×{}", first.name, second.name),
            hp: grow(first.hp, 100, 1.5),
            attack: grow(first.attack, 50, 1.3),
            defense: grow(first.defense, 50, 1.3),
            speed: grow(first.speed, 50, 1.3),
            element: first.element,
            rarity: (first.effective_rarity().max(second.effective_rarity()) + 1).min(MAX_RARITY),
            trait_text: None,
            special_ability: None,
            weakness: None,
            resistance: None,
        }
    }

    /// Stats rolled for a generated character whose reply had none.
    pub fn random_for<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Self {
        Self {
            name: name.to_string(),
            hp: rng.gen_range(50..250),
            attack: rng.gen_range(20..120),
            defense: rng.gen_range(20..120),
            speed: rng.gen_range(20..120),
            element: Element::ALL[rng.gen_range(0..Element::ALL.len())],
            rarity: rng.gen_range(1..=MAX_RARITY),
            trait_text: Some(UNKNOWN_TRAIT.to_string()),
            special_ability: None,
            weakness: None,
            resistance: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_sloppy_stat_block() {
        let stats: CharacterStats = serde_json::from_str(
            r#"{"name":"Ember","hp":"120","attack":80.6,"defense":null,"speed":40,
                "element":"Fire","rarity":2,"trait":"brave","weakness":"WATER",
                "resistance":"plasma"}"#,
        )
        .unwrap();

        assert_eq!(stats.hp, 120);
        assert_eq!(stats.attack, 81);
        assert_eq!(stats.defense, 0);
        assert_eq!(stats.element, Element::Fire);
        assert_eq!(stats.trait_text.as_deref(), Some("brave"));
        assert_eq!(stats.weakness, Some(Element::Water));
        assert_eq!(stats.resistance, None);
    }

    #[test]
    fn missing_element_falls_back_to_fire() {
        let stats: CharacterStats = serde_json::from_str(r#"{"name":"Blob"}"#).unwrap();
        assert_eq!(stats.element, Element::Fire);
        assert_eq!(stats.effective_rarity(), 1);
    }

    #[test]
    fn amplified_rounds_each_stat() {
        let stats = CharacterStats {
            hp: 101,
            attack: 33,
            defense: 10,
            speed: 7,
            ..Default::default()
        };
        let boosted = stats.amplified(1.5);
        assert_eq!(
            (boosted.hp, boosted.attack, boosted.defense, boosted.speed),
            (152, 50, 15, 11)
        );
    }

    #[test]
    fn fallback_fusion_caps_rarity() {
        let a = CharacterStats {
            name: "A".into(),
            hp: 100,
            rarity: 5,
            element: Element::Dark,
            ..Default::default()
        };
        let b = CharacterStats {
            name: "B".into(),
            hp: 200,
            rarity: 3,
            ..Default::default()
        };
        let fused = CharacterStats::fallback_fusion(&a, &b);
        assert_eq!(fused.name, "A×B");
        assert_eq!(fused.hp, 150);
        assert_eq!(fused.attack, 65);
        assert_eq!(fused.rarity, 5);
        assert_eq!(fused.element, Element::Dark);
    }

    #[test]
    fn rolled_stats_stay_in_range() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let stats = CharacterStats::random_for("glass owl", &mut rng);
            assert_eq!(stats.name, "glass owl");
            assert!((50..250).contains(&stats.hp));
            for value in [stats.attack, stats.defense, stats.speed] {
                assert!((20..120).contains(&value));
            }
            assert!((1..=MAX_RARITY).contains(&stats.rarity));
            assert!(stats.trait_text.as_deref().is_some_and(|text| text.contains("mysterious")));
        }
    }
}
