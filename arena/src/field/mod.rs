//! The field: the roster wanders here between battles, new characters are
//! generated and the next fusion is prepared.

use bevy::prelude::*;
use protocol::{CharacterDefinition, FusionRequest};

use crate::AppState;
use crate::audio::SoundCue;
use crate::character::{CharacterFactory, Creature, FieldCharacter, Wander, spiral_slot};
use crate::scenes::transition_to;
use crate::services::{Services, ServiceTasks, poll_task};
use crate::session::{FusionResult, FusionState, GameSession, PreparedCharacter, SessionRng};

/// Where the three starters stand on a fresh field.
pub const STARTER_SLOTS: [Vec2; 3] = [
    Vec2::new(-4.0, -2.0),
    Vec2::new(0.0, 3.0),
    Vec2::new(5.0, -1.0),
];

const STARTERS_JSON: &str = include_str!("../../../assets/data/starters.json");

/// Player intents coming from the HUD.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum FieldCommand {
    Generate(String),
    ToggleFusionPick(Entity),
    TogglePartyPick(Entity),
    ClearFusionPicks,
    Fuse,
    RollDice,
    /// Accept the rolled dice and fuse, or take the misfire.
    ConfirmDice,
    StartBattle,
}

pub struct FieldPlugin;

impl Plugin for FieldPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<FieldCommand>()
            .add_systems(Startup, spawn_starters)
            .add_systems(
                Update,
                (
                    handle_field_commands.run_if(in_state(AppState::Field)),
                    collect_generated_characters,
                    collect_fusion_result,
                ),
            );
    }
}

pub fn starter_definitions() -> Result<Vec<CharacterDefinition>, serde_json::Error> {
    serde_json::from_str(STARTERS_JSON)
}

/// Adds a compiled character to the field and the roster.
pub fn spawn_field_character(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    session: &mut GameSession,
    rng: &mut SessionRng,
    character: &PreparedCharacter,
    offset: Vec2,
) -> Entity {
    let entity = CharacterFactory::spawn(
        commands,
        meshes,
        materials,
        &character.definition,
        &character.compiled,
        offset,
    );
    commands
        .entity(entity)
        .insert((FieldCharacter, Wander::new(&mut rng.0)));
    session.roster.push(entity);
    entity
}

fn spawn_starters(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut session: ResMut<GameSession>,
    mut rng: ResMut<SessionRng>,
) {
    let definitions = match starter_definitions() {
        Ok(definitions) => definitions,
        Err(error) => {
            error!("Starter roster is unreadable: {error}");
            return;
        }
    };
    for (definition, slot) in definitions.into_iter().zip(STARTER_SLOTS) {
        let compiled = CharacterFactory::compile(&definition);
        spawn_field_character(
            &mut commands,
            &mut meshes,
            &mut materials,
            &mut session,
            &mut rng,
            &PreparedCharacter {
                definition,
                compiled,
            },
            slot,
        );
    }
    info!("Field ready with {} starters", session.roster.len());
}

#[allow(clippy::too_many_arguments)]
fn handle_field_commands(
    mut requests: MessageReader<FieldCommand>,
    mut session: ResMut<GameSession>,
    mut tasks: ResMut<ServiceTasks>,
    mut rng: ResMut<SessionRng>,
    services: Res<Services>,
    creatures: Query<&Creature>,
    mut cues: MessageWriter<SoundCue>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for request in requests.read() {
        match request {
            FieldCommand::Generate(prompt) => {
                let prompt = prompt.trim();
                if prompt.is_empty() || session.generating {
                    continue;
                }
                info!("Generating a character from '{prompt}'");
                session.generating = true;
                session.last_error = None;
                tasks.generate = Some(services.spawn_generate(prompt.to_string()));
            }
            FieldCommand::ToggleFusionPick(entity) => session.toggle_fusion_pick(*entity),
            FieldCommand::TogglePartyPick(entity) => session.toggle_party_pick(*entity),
            FieldCommand::ClearFusionPicks => {
                if !session.fusion.is_started() {
                    session.fusion_pair.clear();
                    session.fusion = FusionState::Idle;
                    session.last_roll = None;
                }
            }
            FieldCommand::Fuse => {
                if !matches!(session.fusion, FusionState::Idle) {
                    continue;
                }
                let Some(request) = fusion_request(&session, &creatures, false, 1.0) else {
                    continue;
                };
                start_fusion(&mut session, &mut tasks, &services, request);
            }
            FieldCommand::RollDice => {
                let ready = matches!(session.fusion, FusionState::Idle | FusionState::Rolling)
                    && session.super_fusion_unlocked()
                    && session.fusion_pair.len() == 2;
                if !ready || session.last_roll.is_some() {
                    continue;
                }
                let roll = session.dice.roll(&mut rng.0);
                info!("Dice rolled {} ({})", roll.face, roll.outcome.label());
                session.last_roll = Some(roll);
                session.fusion = FusionState::Rolling;
            }
            FieldCommand::ConfirmDice => {
                let (FusionState::Rolling, Some(roll)) = (&session.fusion, session.last_roll)
                else {
                    continue;
                };
                if roll.multiplier() <= 0.0 {
                    match misfire(&session, &creatures) {
                        Some(result) => {
                            info!("Super fusion misfired into '{}'", result.character.definition.stats.name);
                            session.fusion = FusionState::Ready(Box::new(result));
                        }
                        None => {
                            session.fusion = FusionState::Failed("fusion pick left the field".to_string());
                        }
                    }
                    cues.write(SoundCue::FusionFailure);
                    continue;
                }
                let Some(request) = fusion_request(&session, &creatures, true, roll.multiplier())
                else {
                    continue;
                };
                start_fusion(&mut session, &mut tasks, &services, request);
            }
            FieldCommand::StartBattle => {
                if session.can_start_battle() {
                    transition_to(&mut next_state, AppState::Battle);
                }
            }
        }
    }
}

fn fusion_request(
    session: &GameSession,
    creatures: &Query<&Creature>,
    is_super: bool,
    super_mult: f32,
) -> Option<FusionRequest> {
    let [first, second] = session.fusion_pair.as_slice() else {
        return None;
    };
    let (Ok(first), Ok(second)) = (creatures.get(*first), creatures.get(*second)) else {
        return None;
    };
    Some(FusionRequest {
        char1: first.definition.stats.clone(),
        char2: second.definition.stats.clone(),
        is_super,
        super_mult,
    })
}

fn start_fusion(
    session: &mut GameSession,
    tasks: &mut ServiceTasks,
    services: &Services,
    request: FusionRequest,
) {
    info!(
        "Fusing '{}' and '{}' (x{})",
        request.char1.name, request.char2.name, request.super_mult
    );
    session.fusion = FusionState::Generating {
        is_super: request.effective_multiplier() > 1.0,
    };
    tasks.fusion = Some(services.spawn_fusion(request));
}

/// A failed super fusion yields a copy of the first pick.
fn misfire(session: &GameSession, creatures: &Query<&Creature>) -> Option<FusionResult> {
    let first = creatures.get(*session.fusion_pair.first()?).ok()?;
    let definition = first.definition.clone();
    let compiled = CharacterFactory::compile(&definition);
    Some(FusionResult {
        character: PreparedCharacter {
            definition,
            compiled,
        },
        is_super: false,
        misfire: true,
    })
}

/// New characters join the field right away, or after the battle.
fn collect_generated_characters(
    mut commands: Commands,
    mut tasks: ResMut<ServiceTasks>,
    mut session: ResMut<GameSession>,
    mut rng: ResMut<SessionRng>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    state: Res<State<AppState>>,
) {
    let Some(result) = poll_task(&mut tasks.generate) else {
        return;
    };
    session.generating = false;
    match result {
        Ok(character) => {
            if *state.get() == AppState::Field {
                let slot = spiral_slot(session.roster.len(), &mut rng.0);
                spawn_field_character(
                    &mut commands,
                    &mut meshes,
                    &mut materials,
                    &mut session,
                    &mut rng,
                    &character,
                    slot,
                );
            } else {
                info!("'{}' waits for the battle to end", character.definition.stats.name);
                session.pending.push(character);
            }
        }
        Err(error) => {
            error!("Character generation failed: {error}");
            session.last_error = Some(error.to_string());
        }
    }
}

fn collect_fusion_result(
    mut tasks: ResMut<ServiceTasks>,
    mut session: ResMut<GameSession>,
    mut cues: MessageWriter<SoundCue>,
) {
    let Some(result) = poll_task(&mut tasks.fusion) else {
        return;
    };
    let FusionState::Generating { is_super } = session.fusion else {
        return;
    };
    match result {
        Ok(character) => {
            info!("Fusion produced '{}'", character.definition.stats.name);
            if is_super {
                cues.write(SoundCue::FusionSuccess);
            }
            session.fusion = FusionState::Ready(Box::new(FusionResult {
                character,
                is_super,
                misfire: false,
            }));
        }
        Err(error) => {
            error!("Fusion failed: {error}");
            session.last_error = Some(error.to_string());
            session.fusion = FusionState::Failed(error.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starters_are_bundled() {
        let starters = starter_definitions().unwrap();
        assert_eq!(starters.len(), STARTER_SLOTS.len());
        for starter in &starters {
            assert!(!starter.stats.name.is_empty());
            assert!(starter.model.node_count() > 1);
        }
    }
}
