//! Request and response payloads of the character and narration services.

use crate::scene::SceneNode;
use common::lenient;
use common::{CharacterStats, DramaEvent, Winner};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Complete description of a character: how it looks and how it fights.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterDefinition {
    pub model: SceneNode,
    pub stats: CharacterStats,
}

/// Decoded character response whose stat block may be missing.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterPayload {
    pub model: SceneNode,
    pub stats: Option<CharacterStats>,
}

impl CharacterPayload {
    /// Completes a generation response. A reply without a stat block takes
    /// the stats made by `fallback`.
    #[must_use]
    pub fn into_generated(self, fallback: impl FnOnce() -> CharacterStats) -> CharacterDefinition {
        CharacterDefinition {
            model: self.model,
            stats: self.stats.unwrap_or_else(fallback),
        }
    }

    /// Completes a fusion response, falling back to derived stats and
    /// applying the dice multiplier when it amplifies.
    #[must_use]
    pub fn into_fusion(self, request: &FusionRequest) -> CharacterDefinition {
        let mut stats = self
            .stats
            .unwrap_or_else(|| CharacterStats::fallback_fusion(&request.char1, &request.char2));
        let multiplier = request.effective_multiplier();
        if multiplier > 1.0 {
            stats = stats.amplified(multiplier);
        }
        CharacterDefinition {
            model: self.model,
            stats,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionRequest {
    pub char1: CharacterStats,
    pub char2: CharacterStats,
    pub is_super: bool,
    pub super_mult: f32,
}

impl FusionRequest {
    #[must_use]
    pub fn effective_multiplier(&self) -> f32 {
        if self.is_super { self.super_mult } else { 1.0 }
    }
}

/// Everything the narration service needs to script a battle whose winner
/// is already decided.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationRequest {
    pub party_stats: Vec<CharacterStats>,
    pub fusion_stats: CharacterStats,
    pub boss: CharacterStats,
    pub stage: u32,
    pub winner: Winner,
    pub drama: Vec<DramaEvent>,
}

/// Kind of beat in a battle script.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleAction {
    Attack,
    Special,
    Drama,
    Event,
    FusionArrive,
    Result,
    /// Unrecognised action; played as a narration beat.
    #[default]
    Unknown,
}

impl BattleAction {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "attack" => Self::Attack,
            "special" => Self::Special,
            "drama" => Self::Drama,
            "event" => Self::Event,
            "fusion_arrive" | "fusion-arrive" | "fusion_arrival" => Self::FusionArrive,
            "result" => Self::Result,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn is_strike(self) -> bool {
        matches!(self, Self::Attack | Self::Special)
    }

    #[must_use]
    pub const fn is_result(self) -> bool {
        matches!(self, Self::Result)
    }
}

/// One scripted beat of a battle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BattleEvent {
    #[serde(deserialize_with = "lenient::text")]
    pub actor: String,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub target: Option<String>,
    #[serde(deserialize_with = "action")]
    pub action: BattleAction,
    #[serde(deserialize_with = "lenient::stat")]
    pub damage: u32,
    #[serde(deserialize_with = "lenient::text")]
    pub text: String,
    #[serde(deserialize_with = "crit")]
    pub crit: bool,
    #[serde(deserialize_with = "winner")]
    pub winner: Option<Winner>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub fusion_name: Option<String>,
}

fn action<'de, D>(deserializer: D) -> Result<BattleAction, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(name)) => BattleAction::from_name(&name),
        _ => BattleAction::Unknown,
    })
}

fn crit<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(matches!(value, Some(Value::Bool(true))))
}

fn winner<'de, D>(deserializer: D) -> Result<Option<Winner>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(name)) => match name.trim().to_ascii_lowercase().as_str() {
            "party" => Some(Winner::Party),
            "boss" => Some(Winner::Boss),
            _ => None,
        },
        _ => None,
    })
}
