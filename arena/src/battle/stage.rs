//! Where everyone stands during a battle, and the boss model.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use common::BossProfile;
use common::boss::BASE_EYE;
use protocol::SceneNode;

/// How far the battlefield floor sits below the field floor.
pub const BATTLE_FLOOR_DROP: f32 = 4.0;
pub const PARTY_X: f32 = -5.0;
pub const PARTY_SPACING: f32 = 2.5;
pub const BOSS_X: f32 = 5.0;
pub const BOSS_SINK: f32 = 1.0;
pub const BOSS_FLOAT_AMPLITUDE: f32 = 0.4;
/// Height the fusion unit falls from, and how fast.
pub const FUSION_DROP_HEIGHT: f32 = 3.0;
pub const FUSION_DROP_SPEED: f32 = 0.15;

const BOSS_MODEL_JSON: &str = include_str!("../../../assets/data/boss_model.json");

/// The `index`-th of `count` party members, facing the boss.
pub fn party_slot(index: usize, count: usize, rest_height: f32) -> Transform {
    let spread = (index as f32 - (count.max(1) - 1) as f32 / 2.0) * PARTY_SPACING;
    Transform::from_xyz(PARTY_X, rest_height - BATTLE_FLOOR_DROP, spread)
        .with_rotation(Quat::from_rotation_y(FRAC_PI_2))
}

/// The boss hovers one unit under its resting height, facing the party.
pub fn boss_slot(rest_height: f32, scale: f32, model_scale: Vec3) -> Transform {
    Transform::from_xyz(BOSS_X, rest_height - BOSS_SINK, 0.0)
        .with_rotation(Quat::from_rotation_y(-FRAC_PI_2))
        .with_scale(model_scale * scale)
}

/// Falls from above the end of the party line to the battlefield floor.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct FusionDrop {
    pub target_y: f32,
}

impl FusionDrop {
    /// Start transform and drop for a unit joining a party of `party_size`.
    pub fn entry(party_size: usize, rest_height: f32) -> (Transform, Self) {
        let last = party_slot(party_size.saturating_sub(1), party_size, rest_height);
        let z = if party_size == 0 {
            0.0
        } else {
            last.translation.z + PARTY_SPACING
        };
        let start = Transform::from_xyz(PARTY_X, FUSION_DROP_HEIGHT, z)
            .with_rotation(Quat::from_rotation_y(FRAC_PI_2));
        (
            start,
            Self {
                target_y: rest_height - BATTLE_FLOOR_DROP,
            },
        )
    }

    /// Next height; `true` once landed.
    pub fn step(&self, y: f32) -> (f32, bool) {
        let next = y - FUSION_DROP_SPEED;
        if next <= self.target_y {
            (self.target_y, true)
        } else {
            (next, false)
        }
    }
}

/// The dark dragon, recoloured for the stage.
pub fn boss_scene(profile: &BossProfile) -> Result<SceneNode, serde_json::Error> {
    let mut scene: SceneNode = serde_json::from_str(BOSS_MODEL_JSON)?;
    recolor_boss(&mut scene, profile);
    Ok(scene)
}

pub fn recolor_boss(scene: &mut SceneNode, profile: &BossProfile) {
    scene.visit_mut(&mut |node| {
        if let Some(color) = node.color.as_mut() {
            if color.eq_ignore_ascii_case(BASE_EYE) {
                *color = profile.eye.to_string();
            } else if let Some(replacement) = profile.recolor(color) {
                *color = replacement.to_string();
            }
        }
        if let Some(emissive) = node.emissive_color.as_mut() {
            if emissive.eq_ignore_ascii_case(BASE_EYE) {
                *emissive = profile.eye.to_string();
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn party_is_centred_on_the_line() {
        let slots: Vec<f32> = (0..3).map(|i| party_slot(i, 3, 1.0).translation.z).collect();
        assert_eq!(slots, vec![-2.5, 0.0, 2.5]);
        let single = party_slot(0, 1, 1.0);
        assert_eq!(single.translation, Vec3::new(PARTY_X, -3.0, 0.0));
        let (_, yaw, _) = single.rotation.to_euler(EulerRot::XYZ);
        assert!((yaw - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn fusion_unit_drops_next_to_the_last_member() {
        let (start, drop) = FusionDrop::entry(2, 1.5);
        assert_eq!(start.translation, Vec3::new(PARTY_X, FUSION_DROP_HEIGHT, 3.75));
        assert_eq!(drop.target_y, -2.5);

        let mut y = start.translation.y;
        let mut ticks = 0;
        loop {
            let (next, landed) = drop.step(y);
            y = next;
            ticks += 1;
            if landed {
                break;
            }
        }
        assert_eq!(y, -2.5);
        assert_eq!(ticks, 37);
    }

    #[test]
    fn boss_model_is_recoloured_per_stage() {
        let profile = BossProfile::for_stage(3);
        let mut scene = boss_scene(&profile).unwrap();
        let mut colors = Vec::new();
        scene.visit_mut(&mut |node| colors.extend(node.color.clone()));
        assert!(colors.iter().any(|color| color == profile.eye));
        assert!(!colors.iter().any(|color| color.eq_ignore_ascii_case("#2a1a3e")));
    }
}
