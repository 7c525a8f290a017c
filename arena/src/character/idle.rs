//! Procedural idle animation: a stateless pose per part tag, evaluated from
//! the elapsed time every frame.

use std::f32::consts::PI;

use bevy::prelude::*;

use super::types::{CharacterRoot, Floating};
use crate::combat::Engaged;
use crate::model::{ModelPart, PartTag};

/// Idle clock runs at three units per second.
pub const IDLE_TIME_SCALE: f32 = 3.0;
/// Angular frequency of the walk cycle.
pub const WALK_FREQUENCY: f32 = 1.2;
/// Outward Z tilt of an arm declared without one.
pub const DEFAULT_ARM_SPLAY: f32 = 0.2;

/// Euler (XYZ) channels a pose overrides; `None` keeps the current angle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
}

impl Pose {
    /// Replaces the overridden channels of `rotation`.
    pub fn apply(&self, rotation: Quat) -> Quat {
        let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
        Quat::from_euler(
            EulerRot::XYZ,
            self.x.unwrap_or(x),
            self.y.unwrap_or(y),
            self.z.unwrap_or(z),
        )
    }
}

/// Pose of a tagged part at idle time `t`. Arms keep their declared splay
/// (`base_rotation_z`) while swinging, or [`DEFAULT_ARM_SPLAY`] outward when
/// none was declared.
pub fn pose(tag: PartTag, t: f32, base_rotation_z: f32) -> Pose {
    let gait = (t * WALK_FREQUENCY).sin();
    let counter_gait = (t * WALK_FREQUENCY + PI).sin();
    match tag {
        PartTag::LegFl | PartTag::LegBr => Pose {
            x: Some(gait * 0.35),
            ..default()
        },
        PartTag::LegFr | PartTag::LegBl => Pose {
            x: Some(counter_gait * 0.35),
            ..default()
        },
        PartTag::ArmL => Pose {
            x: Some(gait * 0.25),
            z: Some(arm_splay(base_rotation_z, -DEFAULT_ARM_SPLAY)),
            ..default()
        },
        PartTag::ArmR => Pose {
            x: Some(counter_gait * 0.25),
            z: Some(arm_splay(base_rotation_z, DEFAULT_ARM_SPLAY)),
            ..default()
        },
        PartTag::WingL => Pose {
            z: Some(0.15 + (t * 2.0).sin() * 0.3),
            ..default()
        },
        PartTag::WingR => Pose {
            z: Some(-0.15 - (t * 2.0).sin() * 0.3),
            ..default()
        },
        PartTag::Tail => Pose {
            y: Some((t * 1.5).sin() * 0.3),
            ..default()
        },
        PartTag::Head => Pose {
            x: Some((t * WALK_FREQUENCY * 0.5).sin() * 0.04),
            ..default()
        },
    }
}

fn arm_splay(declared: f32, fallback: f32) -> f32 {
    if declared == 0.0 { fallback } else { declared }
}

pub fn idle_clock(time: &Time) -> f32 {
    time.elapsed_secs() * IDLE_TIME_SCALE
}

/// Poses the tagged direct children of every visible character.
pub fn animate_idle_parts(
    time: Res<Time>,
    roots: Query<&Visibility, With<CharacterRoot>>,
    mut parts: Query<(&ModelPart, &ChildOf, &mut Transform)>,
) {
    let t = idle_clock(&time);
    for (part, child_of, mut transform) in &mut parts {
        let Ok(visibility) = roots.get(child_of.parent()) else {
            continue;
        };
        if matches!(visibility, Visibility::Hidden) {
            continue;
        }
        let pose = pose(part.tag, t, part.base_rotation.z);
        transform.rotation = pose.apply(transform.rotation);
    }
}

pub fn float_characters(
    time: Res<Time>,
    mut floating: Query<(&Floating, &mut Transform), Without<Engaged>>,
) {
    let t = idle_clock(&time);
    for (float, mut transform) in &mut floating {
        transform.translation.y = float.base_y + t.sin() * float.amplitude;
    }
}
