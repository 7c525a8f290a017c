use bevy::prelude::*;

use super::SceneController;
use crate::AppState;
use crate::battle::BattlePlugin;
use crate::combat::CombatPlugin;
use crate::vfx::VfxPlugin;

/// Party against the stage boss, played from the narrated script.
pub struct BattleScene;

impl SceneController for BattleScene {
    fn register(app: &mut App) {
        app.add_plugins((CombatPlugin, VfxPlugin, BattlePlugin));
    }

    fn state() -> AppState {
        AppState::Battle
    }

    fn label() -> &'static str {
        "battle"
    }
}
