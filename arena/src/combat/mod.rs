//! Attack playback on the fixed tick.
//!
//! Requests arrive as [`BeginAttack`] messages; one attack plays at a time and
//! its end is reported with [`AttackFinished`] carrying the request's ticket.

pub mod attack;
pub mod flash;

pub use attack::{AttackAnimation, AttackCue, AttackPhase, AttackStep, AttackTicket, AttackTiming};
pub use flash::{FlashSaved, flash_model, restore_model};

use bevy::prelude::*;
use common::Element;
use thiserror::Error;

use crate::AppState;
use crate::session::SessionRng;

/// Marks the attacker and target of the running attack; idle float and
/// wander leave them alone.
#[derive(Component, Debug, Default)]
pub struct Engaged;

#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct BeginAttack {
    pub ticket: AttackTicket,
    pub attacker: Entity,
    pub target: Entity,
    pub element: Element,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackFinished {
    pub ticket: AttackTicket,
}

/// The moment an attack connects.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct AttackImpact {
    pub position: Vec3,
    pub element: Element,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CombatError {
    #[error("attack {requested:?} rejected: attack {running:?} is still playing")]
    AttackInProgress {
        requested: AttackTicket,
        running: AttackTicket,
    },
    #[error("attack {0:?} has no attacker or target on screen")]
    MissingCombatant(AttackTicket),
}

#[derive(Resource, Debug, Default)]
pub struct ActiveAttack(pub Option<AttackAnimation>);

impl ActiveAttack {
    pub fn is_busy(&self) -> bool {
        self.0.is_some()
    }

    /// Starts `animation` unless another attack is still playing.
    pub fn start(&mut self, animation: AttackAnimation) -> Result<(), CombatError> {
        if let Some(running) = &self.0 {
            return Err(CombatError::AttackInProgress {
                requested: animation.ticket,
                running: running.ticket,
            });
        }
        self.0 = Some(animation);
        Ok(())
    }
}

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<BeginAttack>()
            .add_message::<AttackFinished>()
            .add_message::<AttackImpact>()
            .init_resource::<ActiveAttack>()
            .init_resource::<AttackTiming>()
            .add_systems(
                FixedUpdate,
                (start_requested_attacks, advance_attack).chain(),
            )
            .add_systems(OnExit(AppState::Battle), cancel_active_attack);
    }
}

/// Rejected and unplayable requests are completed right away so the caller
/// never waits on them.
pub fn start_requested_attacks(
    mut commands: Commands,
    mut requests: MessageReader<BeginAttack>,
    mut finished: MessageWriter<AttackFinished>,
    mut active: ResMut<ActiveAttack>,
    timing: Res<AttackTiming>,
    transforms: Query<&Transform>,
) {
    for request in requests.read() {
        let (Ok(attacker), Ok(target)) = (
            transforms.get(request.attacker),
            transforms.get(request.target),
        ) else {
            warn!("{}", CombatError::MissingCombatant(request.ticket));
            finished.write(AttackFinished {
                ticket: request.ticket,
            });
            continue;
        };

        let animation = AttackAnimation::new(
            request.ticket,
            (request.attacker, attacker.translation),
            (request.target, target.translation, target.rotation),
            request.element,
            *timing,
        );
        match active.start(animation) {
            Ok(()) => {
                debug!(
                    "Attack {:?}: {:?} -> {:?} ({:?})",
                    request.ticket, request.attacker, request.target, request.element
                );
                commands.entity(request.attacker).insert(Engaged);
                commands.entity(request.target).insert(Engaged);
            }
            Err(error) => {
                warn!("{error}");
                finished.write(AttackFinished {
                    ticket: request.ticket,
                });
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn advance_attack(
    mut commands: Commands,
    mut active: ResMut<ActiveAttack>,
    mut rng: ResMut<SessionRng>,
    mut transforms: Query<&mut Transform>,
    children: Query<&Children>,
    meshes: Query<(&MeshMaterial3d<StandardMaterial>, Option<&FlashSaved>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut impacts: MessageWriter<AttackImpact>,
    mut finished: MessageWriter<AttackFinished>,
) {
    let Some(animation) = active.0.as_mut() else {
        return;
    };
    if transforms.get(animation.attacker).is_err() || transforms.get(animation.target).is_err() {
        warn!("{}", CombatError::MissingCombatant(animation.ticket));
        let ticket = animation.ticket;
        release(&mut commands, animation);
        active.0 = None;
        finished.write(AttackFinished { ticket });
        return;
    }

    let step = animation.tick(&mut rng.0);
    if let Some(position) = step.attacker {
        if let Ok(mut transform) = transforms.get_mut(animation.attacker) {
            transform.translation = position;
        }
    }
    if let Ok(mut transform) = transforms.get_mut(animation.target) {
        if let Some(position) = step.target {
            transform.translation = position;
        }
        let (x, y, _) = animation.target_rotation.to_euler(EulerRot::XYZ);
        transform.rotation = match step.target_roll {
            Some(roll) => Quat::from_euler(EulerRot::XYZ, x, y, roll),
            None => animation.target_rotation,
        };
    }

    for cue in step.cues {
        match cue {
            AttackCue::Impact { position, element } => {
                impacts.write(AttackImpact { position, element });
            }
            AttackCue::FlashTarget => {
                flash_model(
                    &mut commands,
                    animation.target,
                    &children,
                    &meshes,
                    &mut materials,
                );
            }
            AttackCue::RestoreTarget => {
                restore_model(
                    &mut commands,
                    animation.target,
                    &children,
                    &meshes,
                    &mut materials,
                );
            }
            AttackCue::Finished => {
                let ticket = animation.ticket;
                release(&mut commands, animation);
                active.0 = None;
                finished.write(AttackFinished { ticket });
                return;
            }
        }
    }
}

/// Drops a half-played attack when the battle is left, undoing the flash.
pub fn cancel_active_attack(
    mut commands: Commands,
    mut active: ResMut<ActiveAttack>,
    children: Query<&Children>,
    meshes: Query<(&MeshMaterial3d<StandardMaterial>, Option<&FlashSaved>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(animation) = active.0.take() else {
        return;
    };
    info!("Cancelled attack {:?}", animation.ticket);
    if commands.get_entity(animation.target).is_ok() {
        restore_model(
            &mut commands,
            animation.target,
            &children,
            &meshes,
            &mut materials,
        );
    }
    release(&mut commands, &animation);
}

fn release(commands: &mut Commands, animation: &AttackAnimation) {
    for entity in [animation.attacker, animation.target] {
        if let Ok(mut entity) = commands.get_entity(entity) {
            entity.remove::<Engaged>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animation(ticket: u64) -> AttackAnimation {
        AttackAnimation::new(
            AttackTicket(ticket),
            (Entity::PLACEHOLDER, Vec3::ZERO),
            (Entity::PLACEHOLDER, Vec3::X * 10.0, Quat::IDENTITY),
            Element::Fire,
            AttackTiming::default(),
        )
    }

    #[test]
    fn second_attack_is_rejected_while_one_plays() {
        let mut active = ActiveAttack::default();
        assert!(active.start(animation(1)).is_ok());
        assert!(active.is_busy());
        assert_eq!(
            active.start(animation(2)),
            Err(CombatError::AttackInProgress {
                requested: AttackTicket(2),
                running: AttackTicket(1),
            })
        );
        assert_eq!(active.0.as_ref().map(|a| a.ticket), Some(AttackTicket(1)));
    }
}
