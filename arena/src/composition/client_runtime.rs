use bevy::pbr::wireframe::WireframePlugin;
use bevy::prelude::*;
use bevy::state::app::AppExtStates;
use bevy_egui::EguiPlugin;

use crate::AppState;
use crate::app::plugins::{build_bevy_plugins, create_winit_settings};
use crate::audio::{SoundCue, SoundPlugin};
use crate::scenes::{BattleScene, FieldScene, SceneControllerPlugin};
use crate::services::{ServiceTasks, Services};
use crate::session::{GameSession, SessionRng};
use crate::settings::{GameSettings, SettingsPlugin, SettingsResource};
use crate::ui::HudPlugin;
use crate::world::WorldPlugin;

/// Fixed-step rate of the animation systems.
pub const FIXED_UPDATE_HZ: f64 = 60.0;

pub fn configure_client_app(app: &mut App, startup_settings: &GameSettings) {
    app.insert_resource(SettingsResource::new(startup_settings.clone()))
        .add_plugins(build_bevy_plugins(startup_settings))
        .insert_resource(create_winit_settings(startup_settings))
        .add_plugins(bevy::diagnostic::FrameTimeDiagnosticsPlugin::default())
        .add_plugins(WireframePlugin::default())
        .add_plugins(EguiPlugin::default())
        .init_state::<AppState>();

    register_game_runtime(app, startup_settings);

    app.add_plugins(WorldPlugin)
        .add_plugins(SettingsPlugin)
        .add_plugins(SoundPlugin)
        .add_plugins(HudPlugin);
}

/// Game resources and scenes, without windowing or rendering plugins.
pub fn register_game_runtime(app: &mut App, settings: &GameSettings) {
    app.insert_resource(Time::<Fixed>::from_hz(FIXED_UPDATE_HZ))
        .init_resource::<SessionRng>()
        .init_resource::<GameSession>()
        .init_resource::<ServiceTasks>()
        .insert_resource(Services::from_settings(&settings.service))
        .add_message::<SoundCue>()
        .add_plugins(SceneControllerPlugin::<FieldScene>::default())
        .add_plugins(SceneControllerPlugin::<BattleScene>::default());
}
