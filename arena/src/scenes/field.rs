use bevy::prelude::*;

use super::SceneController;
use crate::AppState;
use crate::character::CharacterPlugin;
use crate::field::FieldPlugin;

/// Wandering roster, generation and fusion prep.
pub struct FieldScene;

impl SceneController for FieldScene {
    fn register(app: &mut App) {
        app.add_plugins((CharacterPlugin, FieldPlugin));
    }

    fn state() -> AppState {
        AppState::Field
    }

    fn label() -> &'static str {
        "field"
    }
}
