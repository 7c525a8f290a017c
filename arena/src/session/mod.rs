//! Session state that outlives a single battle: the stage counter, the
//! roster on the field, the fusion and party picks and the dice history.

use bevy::prelude::*;
use common::{DiceHistory, DiceRoll};
use protocol::CharacterDefinition;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::model::CompiledModel;

/// Characters that must be on the field before fusion is offered.
pub const MIN_ROSTER_FOR_FUSION: usize = 3;
/// Super fusion unlocks from this stage on.
pub const SUPER_FUSION_STAGE: u32 = 2;

/// Randomness shared by every gameplay system.
#[derive(Resource)]
pub struct SessionRng(pub StdRng);

impl Default for SessionRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl SessionRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// How the next battle's fusion unit is coming along.
#[derive(Debug, Clone, Default)]
pub enum FusionState {
    #[default]
    Idle,
    /// Waiting for the dice before a super fusion.
    Rolling,
    Generating {
        is_super: bool,
    },
    Ready(Box<FusionResult>),
    Failed(String),
}

impl FusionState {
    pub fn is_started(&self) -> bool {
        !matches!(self, Self::Idle | Self::Rolling)
    }

    pub fn result(&self) -> Option<&FusionResult> {
        match self {
            Self::Ready(result) => Some(result),
            _ => None,
        }
    }
}

/// A fusion unit ready to join the battle.
#[derive(Debug, Clone)]
pub struct FusionResult {
    pub character: PreparedCharacter,
    pub is_super: bool,
    /// The dice came up short and the unit is a copy of the first pick.
    pub misfire: bool,
}

/// A character whose model is compiled and ready to spawn.
#[derive(Debug, Clone)]
pub struct PreparedCharacter {
    pub definition: CharacterDefinition,
    pub compiled: CompiledModel,
}

#[derive(Resource, Debug)]
pub struct GameSession {
    pub stage: u32,
    /// Field characters in the order they arrived.
    pub roster: Vec<Entity>,
    /// Up to two characters picked for fusion, oldest first.
    pub fusion_pair: Vec<Entity>,
    pub party: Vec<Entity>,
    pub fusion: FusionState,
    pub dice: DiceHistory,
    pub last_roll: Option<DiceRoll>,
    /// Characters generated during a battle, added once it ends.
    pub pending: Vec<PreparedCharacter>,
    pub generating: bool,
    pub last_error: Option<String>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            stage: 1,
            roster: Vec::new(),
            fusion_pair: Vec::new(),
            party: Vec::new(),
            fusion: FusionState::Idle,
            dice: DiceHistory::default(),
            last_roll: None,
            pending: Vec::new(),
            generating: false,
            last_error: None,
        }
    }
}

impl GameSession {
    pub fn super_fusion_unlocked(&self) -> bool {
        self.stage >= SUPER_FUSION_STAGE
    }

    pub fn fusion_offered(&self) -> bool {
        self.roster.len() >= MIN_ROSTER_FOR_FUSION
    }

    /// Toggles `entity` in the fusion pair. A third pick pushes out the
    /// oldest one. Picks are frozen once the fusion has started.
    pub fn toggle_fusion_pick(&mut self, entity: Entity) {
        if self.fusion.is_started() {
            return;
        }
        if let Some(index) = self.fusion_pair.iter().position(|picked| *picked == entity) {
            self.fusion_pair.remove(index);
        } else {
            if self.fusion_pair.len() >= 2 {
                self.fusion_pair.remove(0);
            }
            self.fusion_pair.push(entity);
        }
    }

    /// Toggles `entity` in the battle party; fusion picks cannot join.
    pub fn toggle_party_pick(&mut self, entity: Entity) {
        if self.fusion_pair.contains(&entity) {
            return;
        }
        if let Some(index) = self.party.iter().position(|picked| *picked == entity) {
            self.party.remove(index);
        } else {
            self.party.push(entity);
        }
    }

    pub fn can_start_battle(&self) -> bool {
        self.fusion.is_started() && !self.party.is_empty()
    }

    /// Clears every pick and the fusion, as after a battle.
    pub fn reset_selection(&mut self) {
        self.fusion_pair.clear();
        self.party.clear();
        self.fusion = FusionState::Idle;
        self.last_roll = None;
    }

    /// Forgets a character that left the field.
    pub fn remove_from_roster(&mut self, entity: Entity) {
        self.roster.retain(|member| *member != entity);
        self.fusion_pair.retain(|member| *member != entity);
        self.party.retain(|member| *member != entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities() -> Vec<Entity> {
        let mut world = World::new();
        (0..4).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn third_fusion_pick_replaces_the_oldest() {
        let e = entities();
        let mut session = GameSession::default();
        session.toggle_fusion_pick(e[0]);
        session.toggle_fusion_pick(e[1]);
        session.toggle_fusion_pick(e[2]);
        assert_eq!(session.fusion_pair, vec![e[1], e[2]]);

        session.toggle_fusion_pick(e[1]);
        assert_eq!(session.fusion_pair, vec![e[2]]);
    }

    #[test]
    fn fusion_picks_cannot_join_the_party() {
        let e = entities();
        let mut session = GameSession::default();
        session.toggle_fusion_pick(e[0]);
        session.toggle_fusion_pick(e[1]);
        session.toggle_party_pick(e[0]);
        session.toggle_party_pick(e[2]);
        session.toggle_party_pick(e[3]);
        session.toggle_party_pick(e[3]);
        assert_eq!(session.party, vec![e[2]]);
    }

    #[test]
    fn battle_needs_a_started_fusion_and_a_party() {
        let e = entities();
        let mut session = GameSession::default();
        session.toggle_party_pick(e[2]);
        assert!(!session.can_start_battle());
        session.fusion = FusionState::Generating { is_super: false };
        assert!(session.can_start_battle());

        session.toggle_fusion_pick(e[3]);
        assert!(session.fusion_pair.is_empty());
    }

    #[test]
    fn super_fusion_unlocks_at_stage_two() {
        let mut session = GameSession::default();
        assert!(!session.super_fusion_unlocked());
        session.stage = 2;
        assert!(session.super_fusion_unlocked());
    }

    #[test]
    fn removing_a_character_clears_its_picks() {
        let e = entities();
        let mut session = GameSession::default();
        session.roster = e.clone();
        session.toggle_fusion_pick(e[0]);
        session.toggle_party_pick(e[1]);
        session.remove_from_roster(e[0]);
        session.remove_from_roster(e[1]);
        assert_eq!(session.roster, vec![e[2], e[3]]);
        assert!(session.fusion_pair.is_empty());
        assert!(session.party.is_empty());
    }
}
