use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::AppExtStates;
use bevy::time::TimeUpdateStrategy;

use arena::AppState;
use arena::battle::{ActiveBattle, BattlePhase, BattleProp};
use arena::character::FieldCharacter;
use arena::composition::client_runtime::register_game_runtime;
use arena::field::{FieldCommand, starter_definitions};
use arena::scenes::transition_to;
use arena::services::{CreatureService, OfflineService, ServiceError, Services};
use arena::session::{FusionState, GameSession};
use arena::settings::{BattleSettings, GameSettings, SettingsResource};
use protocol::{
    BattleAction, BattleEvent, CharacterDefinition, FusionRequest, GenerateRequest,
    NarrationRequest,
};

/// Fuses into an overwhelming unit and scripts a two-beat battle.
struct ScriptedService {
    fusion: CharacterDefinition,
}

impl ScriptedService {
    fn new() -> Self {
        let mut fusion = starter_definitions().unwrap().remove(0);
        fusion.stats.name = "Titan".to_string();
        fusion.stats.hp = 5000;
        fusion.stats.attack = 400;
        Self { fusion }
    }
}

impl CreatureService for ScriptedService {
    fn generate(&self, request: &GenerateRequest) -> Result<CharacterDefinition, ServiceError> {
        let mut definition = self.fusion.clone();
        definition.stats.name = request.prompt.clone();
        Ok(definition)
    }

    fn fuse(&self, _: &FusionRequest) -> Result<CharacterDefinition, ServiceError> {
        Ok(self.fusion.clone())
    }

    fn narrate(&self, request: &NarrationRequest) -> Result<Vec<BattleEvent>, ServiceError> {
        Ok(vec![
            BattleEvent {
                actor: request.fusion_stats.name.clone(),
                action: BattleAction::FusionArrive,
                ..Default::default()
            },
            BattleEvent {
                actor: request.fusion_stats.name.clone(),
                action: BattleAction::Result,
                text: "The dust settles.".to_string(),
                winner: Some(request.winner),
                ..Default::default()
            },
        ])
    }
}

fn headless_app(service: impl CreatureService) -> App {
    let settings = GameSettings {
        battle: BattleSettings {
            opening_delay_ms: 0,
            attack_delay_ms: 0,
            event_delay_ms: 0,
            victory_delay_ms: 0,
            fusion_timeout_secs: 120,
        },
        ..Default::default()
    };

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        bevy::state::app::StatesPlugin,
        bevy::asset::AssetPlugin::default(),
    ))
    .init_asset::<Mesh>()
    .init_asset::<StandardMaterial>()
    .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / 60.0,
    )))
    .insert_resource(SettingsResource::new(settings.clone()))
    .init_state::<AppState>();
    register_game_runtime(&mut app, &settings);
    app.insert_resource(Services(Arc::new(service)));
    app.update();
    app
}

fn run_until(app: &mut App, done: impl Fn(&World) -> bool) -> bool {
    for _ in 0..600 {
        app.update();
        if done(app.world()) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    false
}

fn session(app: &App) -> &GameSession {
    app.world().resource::<GameSession>()
}

fn count<F: bevy::ecs::query::QueryFilter>(app: &mut App) -> usize {
    let mut query = app.world_mut().query_filtered::<Entity, F>();
    query.iter(app.world()).count()
}

/// Picks the first two starters for fusion and the third for the party.
fn prepare_fusion(app: &mut App) {
    let roster = session(app).roster.clone();
    assert_eq!(roster.len(), 3);
    for command in [
        FieldCommand::ToggleFusionPick(roster[0]),
        FieldCommand::ToggleFusionPick(roster[1]),
        FieldCommand::TogglePartyPick(roster[2]),
        FieldCommand::Fuse,
    ] {
        app.world_mut().write_message(command);
    }
}

#[test]
fn won_battle_adds_the_fusion_unit_and_advances_the_stage() {
    let mut app = headless_app(ScriptedService::new());
    assert_eq!(count::<With<FieldCharacter>>(&mut app), 3);

    prepare_fusion(&mut app);
    assert!(run_until(&mut app, |world| {
        world.resource::<GameSession>().fusion.result().is_some()
    }));

    app.world_mut().write_message(FieldCommand::StartBattle);
    assert!(run_until(&mut app, |world| {
        *world.resource::<State<AppState>>().get() == AppState::Battle
    }));
    assert!(app.world().contains_resource::<ActiveBattle>());

    assert!(run_until(&mut app, |world| {
        world.resource::<ActiveBattle>().director.phase().is_over()
    }));
    let battle = app.world().resource::<ActiveBattle>();
    assert_eq!(battle.director.phase(), BattlePhase::Won);
    assert!(battle.fusion.is_some());

    transition_to(
        &mut app.world_mut().resource_mut::<NextState<AppState>>(),
        AppState::Field,
    );
    app.update();
    app.update();

    assert!(!app.world().contains_resource::<ActiveBattle>());
    assert_eq!(count::<With<BattleProp>>(&mut app), 0);
    let session = session(&app);
    assert_eq!(session.stage, 2);
    assert_eq!(session.roster.len(), 2);
    assert!(session.party.is_empty());
    assert!(matches!(session.fusion, FusionState::Idle));
    assert_eq!(count::<With<FieldCharacter>>(&mut app), 2);
}

#[test]
fn failed_fusion_aborts_the_battle_and_restores_the_field() {
    let mut app = headless_app(OfflineService);

    prepare_fusion(&mut app);
    assert!(run_until(&mut app, |world| {
        matches!(world.resource::<GameSession>().fusion, FusionState::Failed(_))
    }));
    assert!(session(&app).last_error.is_some());

    app.world_mut().write_message(FieldCommand::StartBattle);
    assert!(run_until(&mut app, |world| {
        world
            .get_resource::<ActiveBattle>()
            .is_some_and(|battle| battle.director.phase() == BattlePhase::Error)
    }));

    transition_to(
        &mut app.world_mut().resource_mut::<NextState<AppState>>(),
        AppState::Field,
    );
    app.update();
    app.update();

    assert!(!app.world().contains_resource::<ActiveBattle>());
    assert_eq!(count::<With<BattleProp>>(&mut app), 0);
    let session = session(&app);
    assert_eq!(session.stage, 1);
    assert_eq!(session.roster.len(), 3);
    assert!(session.fusion_pair.is_empty());
    assert_eq!(count::<With<FieldCharacter>>(&mut app), 3);
}
