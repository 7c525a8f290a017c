use std::marker::PhantomData;

use bevy::prelude::*;

use crate::AppState;

pub mod battle;
pub mod field;

pub use battle::BattleScene;
pub use field::FieldScene;

pub trait SceneController: Send + Sync + 'static {
    fn register(app: &mut App);

    fn state() -> AppState;

    fn label() -> &'static str;
}

pub struct SceneControllerPlugin<C: SceneController> {
    _marker: PhantomData<C>,
}

impl<C: SceneController> Default for SceneControllerPlugin<C> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<C: SceneController> Plugin for SceneControllerPlugin<C> {
    fn build(&self, app: &mut App) {
        C::register(app);
        app.add_systems(OnEnter(C::state()), log_scene_entered::<C>);
    }
}

fn log_scene_entered<C: SceneController>() {
    info!("Entered {} scene", C::label());
}

pub fn transition_to(next_state: &mut NextState<AppState>, target: AppState) {
    next_state.set(target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::AppExtStates;

    #[test]
    fn transition_to_updates_state_machine() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, bevy::state::app::StatesPlugin))
            .init_state::<AppState>();

        transition_to(
            &mut app.world_mut().resource_mut::<NextState<AppState>>(),
            AppState::Battle,
        );

        app.update();

        assert_eq!(
            *app.world().resource::<State<AppState>>().get(),
            AppState::Battle
        );
    }
}
