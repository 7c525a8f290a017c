use crate::stats::CharacterStats;
use serde::{Deserialize, Serialize};

/// Party wins when its total reaches this share of the boss power.
pub const WIN_RATIO_THRESHOLD: f64 = 0.85;
pub const BOSS_POWER_FACTOR: f64 = 1.3;
pub const WEAKNESS_BONUS: f64 = 80.0;
pub const RESISTANCE_PENALTY: f64 = 40.0;
pub const ADVANTAGE_BONUS: f64 = 30.0;
pub const RARITY_BONUS_FACTOR: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Party,
    Boss,
}

impl Winner {
    pub fn name(self) -> &'static str {
        match self {
            Self::Party => "party",
            Self::Boss => "boss",
        }
    }
}

/// Precomputed result of a battle, decided before any narration exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BattleOutcome {
    pub party_total: f64,
    pub boss_power: f64,
    pub ratio: f64,
    pub winner: Winner,
}

impl BattleOutcome {
    pub fn party_wins(&self) -> bool {
        self.winner == Winner::Party
    }

    pub fn party_total_rounded(&self) -> i64 {
        self.party_total.round() as i64
    }

    pub fn boss_power_rounded(&self) -> i64 {
        self.boss_power.round() as i64
    }

    pub fn ratio_percent(&self) -> i64 {
        (self.ratio * 100.0).round() as i64
    }
}

pub fn power_score(stats: &CharacterStats) -> f64 {
    stats.hp as f64 + stats.attack as f64 * 2.5 + stats.defense as f64 * 1.5 + stats.speed as f64 * 1.2
}

pub fn element_bonus<'a>(
    units: impl IntoIterator<Item = &'a CharacterStats>,
    boss: &CharacterStats,
) -> f64 {
    units
        .into_iter()
        .map(|unit| {
            let mut bonus = 0.0;
            if Some(unit.element) == boss.weakness {
                bonus += WEAKNESS_BONUS;
            }
            if Some(unit.element) == boss.resistance {
                bonus -= RESISTANCE_PENALTY;
            }
            if unit.element.has_advantage_over(boss.element) {
                bonus += ADVANTAGE_BONUS;
            }
            bonus
        })
        .sum()
}

/// Scores the party (plus the fusion unit, when present) against the boss.
pub fn calc_battle_outcome(
    party: &[CharacterStats],
    fusion: Option<&CharacterStats>,
    boss: &CharacterStats,
) -> BattleOutcome {
    let units: Vec<&CharacterStats> = party.iter().chain(fusion).collect();

    let mut party_total: f64 = units.iter().map(|unit| power_score(unit)).sum();
    party_total += element_bonus(units.iter().copied(), boss);

    if !units.is_empty() {
        let rarity_sum: u32 = units.iter().map(|unit| unit.effective_rarity()).sum();
        let average_rarity = rarity_sum as f64 / units.len() as f64;
        party_total += average_rarity * RARITY_BONUS_FACTOR;
    }

    let boss_power = power_score(boss) * BOSS_POWER_FACTOR;
    let ratio = if boss_power > 0.0 {
        party_total / boss_power
    } else {
        f64::INFINITY
    };

    BattleOutcome {
        party_total,
        boss_power,
        ratio,
        winner: if ratio >= WIN_RATIO_THRESHOLD {
            Winner::Party
        } else {
            Winner::Boss
        },
    }
}
