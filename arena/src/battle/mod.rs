//! The battle scene: the director on stage.
//!
//! Entering [`AppState::Battle`] lines the party up against the stage boss
//! and creates a [`BattleDirector`]. Every frame the director is fed the
//! fusion result, the narration script and finished attacks, and its
//! commands are carried out on the entities. Leaving the state puts the
//! field back and settles the result.

pub mod director;
pub mod finale;
pub mod ledger;
pub mod stage;

pub use director::{
    BattleDirector, BattleError, BattlePhase, BattleTiming, Combatant, DirectorCommand,
};
pub use finale::{DefeatAnimation, FadeSaved, VictoryAnimation, play_defeats, play_victories};
pub use ledger::{Gauge, HpLedger};
pub use stage::FusionDrop;

use bevy::prelude::*;
use common::{BossProfile, Winner, pick_drama_events};
use protocol::{CharacterDefinition, SceneNode};

use crate::AppState;
use crate::audio::SoundCue;
use crate::character::{CharacterFactory, Creature, FieldCharacter, Floating, RestHeight, Wander};
use crate::combat::{AttackFinished, BeginAttack, Engaged, cancel_active_attack};
use crate::field::spawn_field_character;
use crate::services::{Services, ServiceTasks, poll_task};
use crate::session::{FusionState, GameSession, SessionRng};
use crate::settings::SettingsResource;

/// Scripted twists handed to the narrator per battle.
pub const DRAMA_EVENTS_PER_BATTLE: usize = 2;
const FIXED_TICKS_PER_SECOND: f64 = 60.0;

/// Field pose of a character, restored after the battle.
#[derive(Debug, Clone, Copy)]
pub struct FieldSnapshot {
    pub entity: Entity,
    pub transform: Transform,
    pub visibility: Visibility,
}

/// Spawned only for the battle; despawned on teardown.
#[derive(Component, Debug, Default)]
pub struct BattleProp;

#[derive(Resource)]
pub struct ActiveBattle {
    pub director: BattleDirector,
    pub boss: Entity,
    /// In the order of the director's party.
    pub party: Vec<Entity>,
    pub fusion: Option<Entity>,
    pub field: Vec<FieldSnapshot>,
}

impl ActiveBattle {
    pub fn entity(&self, combatant: Combatant) -> Option<Entity> {
        match combatant {
            Combatant::Boss => Some(self.boss),
            Combatant::Party(index) => self.party.get(index).copied(),
            Combatant::Fusion => self.fusion,
        }
    }

    /// Everyone on the party's side who is on screen.
    pub fn party_side(&self) -> impl Iterator<Item = Entity> + '_ {
        self.party.iter().copied().chain(self.fusion)
    }
}

pub struct BattlePlugin;

impl Plugin for BattlePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::Battle), stage_battle)
            .add_systems(
                Update,
                (feed_director, run_director)
                    .chain()
                    .run_if(in_state(AppState::Battle)),
            )
            .add_systems(
                FixedUpdate,
                (drop_fusion_unit, play_defeats, play_victories)
                    .run_if(in_state(AppState::Battle)),
            )
            .add_systems(
                OnExit(AppState::Battle),
                teardown_battle.after(cancel_active_attack),
            );
    }
}

fn fallback_boss_scene() -> SceneNode {
    SceneNode {
        color: Some(common::boss::BASE_PALETTE[0].to_string()),
        scale: Some([2.0, 2.0, 2.0]),
        ..Default::default()
    }
}

fn victory_delay_ticks(delay: std::time::Duration) -> u32 {
    let ticks = (delay.as_secs_f64() * FIXED_TICKS_PER_SECOND).round();
    u32::try_from(ticks as u64).unwrap_or(u32::MAX)
}

#[allow(clippy::too_many_arguments)]
fn stage_battle(
    mut commands: Commands,
    session: Res<GameSession>,
    settings: Res<SettingsResource>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut field: Query<
        (Entity, &mut Transform, &mut Visibility, &Creature, &RestHeight),
        With<FieldCharacter>,
    >,
) {
    let mut snapshots = Vec::new();
    for (entity, transform, mut visibility, _, _) in &mut field {
        snapshots.push(FieldSnapshot {
            entity,
            transform: *transform,
            visibility: *visibility,
        });
        *visibility = if session.party.contains(&entity) {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }

    let count = session
        .party
        .iter()
        .filter(|entity| field.contains(**entity))
        .count();
    let mut party = Vec::new();
    let mut party_stats = Vec::new();
    for entity in session.party.iter().copied() {
        let Ok((_, mut transform, _, creature, rest)) = field.get_mut(entity) else {
            continue;
        };
        *transform = stage::party_slot(party.len(), count, rest.0).with_scale(transform.scale);
        party.push(entity);
        party_stats.push(creature.definition.stats.clone());
    }

    let profile = BossProfile::for_stage(session.stage);
    let scene = stage::boss_scene(&profile).unwrap_or_else(|error| {
        error!("Boss model is unreadable, using a stand-in: {error}");
        fallback_boss_scene()
    });
    let definition = CharacterDefinition {
        model: scene,
        stats: profile.stats.clone(),
    };
    let compiled = CharacterFactory::compile(&definition);
    let boss = CharacterFactory::spawn(
        &mut commands,
        &mut meshes,
        &mut materials,
        &definition,
        &compiled,
        Vec2::ZERO,
    );
    let boss_transform = stage::boss_slot(
        compiled.base_y(),
        profile.model_scale(),
        compiled.root.transform.scale,
    );
    commands.entity(boss).insert((
        boss_transform,
        BattleProp,
        Floating {
            base_y: boss_transform.translation.y,
            amplitude: stage::BOSS_FLOAT_AMPLITUDE,
        },
    ));

    info!(
        "Stage {}: {} party members against '{}'",
        session.stage, count, profile.stats.name
    );
    let director = BattleDirector::new(
        session.stage,
        profile.stats,
        party_stats,
        settings.current.battle.timing(),
    );
    commands.insert_resource(ActiveBattle {
        director,
        boss,
        party,
        fusion: None,
        field: snapshots,
    });
}

/// Hands the fusion result and the narration script to the director.
fn feed_director(
    battle: Option<ResMut<ActiveBattle>>,
    session: Res<GameSession>,
    mut tasks: ResMut<ServiceTasks>,
    services: Res<Services>,
    mut rng: ResMut<SessionRng>,
) {
    let Some(mut battle) = battle else {
        return;
    };
    match (&session.fusion, battle.director.phase()) {
        (FusionState::Ready(result), BattlePhase::AwaitingFusion) => {
            let drama = pick_drama_events(&mut rng.0, DRAMA_EVENTS_PER_BATTLE);
            let stats = result.character.definition.stats.clone();
            if let Some(DirectorCommand::Narrate(request)) =
                battle.director.fusion_ready(stats, drama)
            {
                info!(
                    "Outcome decided for stage {}: {} wins",
                    request.stage,
                    request.winner.name()
                );
                tasks.narration = Some(services.spawn_narration(request));
            }
        }
        (FusionState::Failed(reason), BattlePhase::AwaitingFusion) => {
            battle
                .director
                .fail(BattleError::FusionFailed(reason.clone()));
        }
        _ => {}
    }

    match poll_task(&mut tasks.narration) {
        Some(Ok(events)) => {
            info!("Narration arrived with {} events", events.len());
            battle.director.narration_ready(events);
        }
        Some(Err(error)) => {
            error!("Battle narration failed: {error}");
            battle
                .director
                .fail(BattleError::Narration(error.to_string()));
        }
        None => {}
    }
}

#[allow(clippy::too_many_arguments)]
fn run_director(
    mut commands: Commands,
    time: Res<Time>,
    battle: Option<ResMut<ActiveBattle>>,
    session: Res<GameSession>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut finished: MessageReader<AttackFinished>,
    mut strikes: MessageWriter<BeginAttack>,
    mut cues: MessageWriter<SoundCue>,
    transforms: Query<&Transform>,
) {
    let Some(mut battle) = battle else {
        finished.read().for_each(drop);
        return;
    };
    for done in finished.read() {
        battle.director.attack_finished(done.ticket);
    }

    let phase = battle.director.phase();
    let logged = battle.director.log().len();
    let orders = battle.director.tick(time.delta());
    for line in battle.director.log().iter().skip(logged) {
        info!("{line}");
    }
    if battle.director.phase() != phase {
        info!("Battle phase {:?} -> {:?}", phase, battle.director.phase());
    }

    for order in orders {
        match order {
            DirectorCommand::Narrate(_) => {}
            DirectorCommand::Strike {
                ticket,
                attacker,
                target,
                element,
            } => {
                let (Some(attacker), Some(target)) =
                    (battle.entity(attacker), battle.entity(target))
                else {
                    battle.director.attack_finished(ticket);
                    continue;
                };
                strikes.write(BeginAttack {
                    ticket,
                    attacker,
                    target,
                    element,
                });
            }
            DirectorCommand::SummonFusion => {
                if battle.fusion.is_some() {
                    continue;
                }
                let Some(result) = session.fusion.result() else {
                    continue;
                };
                let character = &result.character;
                let entity = CharacterFactory::spawn(
                    &mut commands,
                    &mut meshes,
                    &mut materials,
                    &character.definition,
                    &character.compiled,
                    Vec2::ZERO,
                );
                let (start, drop) =
                    FusionDrop::entry(battle.party.len(), character.compiled.base_y());
                commands.entity(entity).insert((
                    start.with_scale(character.compiled.root.transform.scale),
                    drop,
                    BattleProp,
                ));
                battle.fusion = Some(entity);
            }
            DirectorCommand::Finale {
                winner,
                victory_delay,
            } => {
                let delay = victory_delay_ticks(victory_delay);
                let (winners, losers): (Vec<Entity>, Vec<Entity>) = match winner {
                    Winner::Party => (battle.party_side().collect(), vec![battle.boss]),
                    Winner::Boss => (vec![battle.boss], battle.party_side().collect()),
                };
                for entity in losers {
                    if let Ok(transform) = transforms.get(entity) {
                        commands
                            .entity(entity)
                            .remove::<Floating>()
                            .insert(DefeatAnimation::new(transform));
                    }
                }
                if winner == Winner::Party {
                    for (index, entity) in winners.into_iter().enumerate() {
                        if let Ok(transform) = transforms.get(entity) {
                            commands.entity(entity).insert(VictoryAnimation::staggered(
                                index,
                                delay,
                                transform.translation.y,
                            ));
                        }
                    }
                }
                cues.write(match winner {
                    Winner::Party => SoundCue::Win,
                    Winner::Boss => SoundCue::Lose,
                });
            }
        }
    }
}

fn drop_fusion_unit(
    mut commands: Commands,
    mut falling: Query<(Entity, &FusionDrop, &mut Transform), Without<Engaged>>,
) {
    for (entity, drop, mut transform) in &mut falling {
        let (y, landed) = drop.step(transform.translation.y);
        transform.translation.y = y;
        if landed {
            commands.entity(entity).remove::<FusionDrop>();
        }
    }
}

/// Restores the field, despawns the battle cast and settles the result.
#[allow(clippy::too_many_arguments)]
fn teardown_battle(
    mut commands: Commands,
    battle: Option<Res<ActiveBattle>>,
    mut session: ResMut<GameSession>,
    mut tasks: ResMut<ServiceTasks>,
    mut rng: ResMut<SessionRng>,
    children: Query<&Children>,
    fades: Query<(&MeshMaterial3d<StandardMaterial>, Option<&FadeSaved>)>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut poses: Query<(&mut Transform, &mut Visibility)>,
) {
    let Some(battle) = battle else {
        return;
    };
    tasks.narration = None;
    tasks.fusion = None;
    let won = battle.director.party_won();

    for entity in battle.party_side() {
        finale::restore_fade(&mut commands, entity, &children, &fades, &mut materials);
        commands
            .entity(entity)
            .remove::<(DefeatAnimation, VictoryAnimation, FusionDrop)>();
    }
    for snapshot in &battle.field {
        if let Ok((mut transform, mut visibility)) = poses.get_mut(snapshot.entity) {
            *transform = snapshot.transform;
            *visibility = snapshot.visibility;
        }
    }
    commands.entity(battle.boss).try_despawn();

    let fusion = session.fusion.result().cloned();
    match (won, fusion) {
        (true, Some(result)) => {
            for entity in session.fusion_pair.clone() {
                commands.entity(entity).try_despawn();
                session.remove_from_roster(entity);
            }
            let mut home = result.character.compiled.root.transform;
            home.translation = Vec3::new(0.0, result.character.compiled.base_y(), 0.0);
            let entity = match battle.fusion {
                Some(entity) => {
                    commands.entity(entity).remove::<BattleProp>().insert((
                        FieldCharacter,
                        Wander::new(&mut rng.0),
                    ));
                    session.roster.push(entity);
                    entity
                }
                None => spawn_field_character(
                    &mut commands,
                    &mut meshes,
                    &mut materials,
                    &mut session,
                    &mut rng,
                    &result.character,
                    Vec2::ZERO,
                ),
            };
            commands.entity(entity).insert(home);
            info!(
                "'{}' joins the field; stage {} cleared",
                result.character.definition.stats.name, session.stage
            );
            session.stage += 1;
        }
        (true, None) => {
            session.stage += 1;
            if let Some(entity) = battle.fusion {
                commands.entity(entity).try_despawn();
            }
        }
        (false, _) => {
            if let Some(entity) = battle.fusion {
                commands.entity(entity).try_despawn();
            }
        }
    }

    let pending = std::mem::take(&mut session.pending);
    for character in &pending {
        let slot = crate::character::spiral_slot(session.roster.len(), &mut rng.0);
        spawn_field_character(
            &mut commands,
            &mut meshes,
            &mut materials,
            &mut session,
            &mut rng,
            character,
            slot,
        );
    }
    session.reset_selection();
    commands.remove_resource::<ActiveBattle>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn victory_delay_is_counted_in_fixed_ticks() {
        assert_eq!(victory_delay_ticks(Duration::from_millis(800)), 48);
        assert_eq!(victory_delay_ticks(Duration::ZERO), 0);
        assert_eq!(victory_delay_ticks(Duration::from_millis(30)), 2);
        assert_eq!(victory_delay_ticks(Duration::from_millis(10)), 1);
        assert_eq!(victory_delay_ticks(Duration::from_secs(u64::MAX / 2)), u32::MAX);
    }

    #[test]
    fn combatants_map_to_their_entities() {
        let mut world = World::new();
        let boss = world.spawn_empty().id();
        let ember = world.spawn_empty().id();
        let fused = world.spawn_empty().id();
        let mut battle = ActiveBattle {
            director: BattleDirector::new(
                1,
                BossProfile::for_stage(1).stats,
                Vec::new(),
                BattleTiming::default(),
            ),
            boss,
            party: vec![ember],
            fusion: None,
            field: Vec::new(),
        };
        assert_eq!(battle.entity(Combatant::Boss), Some(boss));
        assert_eq!(battle.entity(Combatant::Party(0)), Some(ember));
        assert_eq!(battle.entity(Combatant::Party(3)), None);
        assert_eq!(battle.entity(Combatant::Fusion), None);

        battle.fusion = Some(fused);
        assert_eq!(battle.party_side().collect::<Vec<_>>(), vec![ember, fused]);
    }
}
