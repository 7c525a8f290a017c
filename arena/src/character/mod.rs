pub mod factory;
pub mod idle;
pub mod types;
pub mod wander;

pub use factory::{CharacterFactory, spiral_slot};
pub use idle::{animate_idle_parts, float_characters, pose};
pub use types::{CharacterRoot, Creature, FieldCharacter, Floating, RestHeight};
pub use wander::{Wander, wander_field_characters};

use bevy::prelude::*;

use crate::AppState;

pub struct CharacterPlugin;

impl Plugin for CharacterPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (animate_idle_parts, float_characters))
            .add_systems(
                FixedUpdate,
                wander_field_characters.run_if(in_state(AppState::Field)),
            );
    }
}
