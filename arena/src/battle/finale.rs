//! End-of-battle presentation: losers topple and fade, winners bounce.

use std::f32::consts::{FRAC_PI_2, TAU};

use bevy::prelude::*;

const DEFEAT_STEP: f32 = 0.015;
const DEFEAT_TILT: f32 = 0.4;
const DEFEAT_SINK: f32 = 1.5;
const DEFEAT_MIN_OPACITY: f32 = 0.3;
const VICTORY_STEP: f32 = 0.032;
const VICTORY_JUMP: f32 = 2.5;
const VICTORY_SPIN: f32 = 0.04;
/// Ticks between one winner starting to celebrate and the next.
pub const VICTORY_STAGGER: u32 = 15;

/// Topple over onto the side, sink and fade.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct DefeatAnimation {
    pub progress: f32,
    pub start_rotation: Vec3,
    pub start_y: f32,
}

/// Pose of a defeat at one tick; `opacity` is set once the fade has begun.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefeatPose {
    pub rotation: Quat,
    pub y: Option<f32>,
    pub opacity: Option<f32>,
    pub done: bool,
}

impl DefeatAnimation {
    pub fn new(transform: &Transform) -> Self {
        let (x, y, z) = transform.rotation.to_euler(EulerRot::XYZ);
        Self {
            progress: 0.0,
            start_rotation: Vec3::new(x, y, z),
            start_y: transform.translation.y,
        }
    }

    pub fn is_done(&self) -> bool {
        self.progress >= 1.0
    }

    pub fn step(&mut self) -> DefeatPose {
        self.progress = (self.progress + DEFEAT_STEP).min(1.0);
        let p = self.progress;
        let eased = 1.0 - (1.0 - p).powi(3);
        let start = self.start_rotation;
        DefeatPose {
            rotation: Quat::from_euler(
                EulerRot::XYZ,
                start.x + eased * DEFEAT_TILT,
                start.y,
                start.z + (FRAC_PI_2 - start.z) * eased,
            ),
            y: (p > 0.2).then(|| self.start_y - eased * DEFEAT_SINK),
            opacity: (p > 0.6)
                .then(|| (1.0 - (p - 0.6) / 0.4 * (1.0 - DEFEAT_MIN_OPACITY)).max(DEFEAT_MIN_OPACITY)),
            done: p >= 1.0,
        }
    }
}

/// Bounce and spin in place after `delay` ticks.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct VictoryAnimation {
    pub delay: u32,
    pub progress: f32,
    pub base_y: f32,
}

impl VictoryAnimation {
    /// Celebration of the `index`-th winner, `base_delay` ticks after the result.
    pub fn staggered(index: usize, base_delay: u32, base_y: f32) -> Self {
        Self {
            delay: base_delay + index as u32 * VICTORY_STAGGER,
            progress: 0.0,
            base_y,
        }
    }

    /// Returns the height to jump to and the yaw to add, once started.
    pub fn step(&mut self) -> Option<(f32, f32)> {
        if self.delay > 0 {
            self.delay -= 1;
            return None;
        }
        self.progress += VICTORY_STEP;
        let jump = (self.progress % TAU).sin().abs() * VICTORY_JUMP;
        Some((self.base_y + jump, VICTORY_SPIN))
    }
}

/// Opacity settings a material had before fading.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct FadeSaved {
    pub alpha: f32,
    pub alpha_mode: AlphaMode,
}

pub fn play_defeats(
    mut commands: Commands,
    mut defeated: Query<(Entity, &mut DefeatAnimation, &mut Transform)>,
    children: Query<&Children>,
    meshes: Query<(&MeshMaterial3d<StandardMaterial>, Option<&FadeSaved>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, mut animation, mut transform) in &mut defeated {
        if animation.is_done() {
            continue;
        }
        let pose = animation.step();
        transform.rotation = pose.rotation;
        if let Some(y) = pose.y {
            transform.translation.y = y;
        }
        let Some(opacity) = pose.opacity else {
            continue;
        };
        for part in children.iter_descendants(entity) {
            let Ok((handle, saved)) = meshes.get(part) else {
                continue;
            };
            let Some(material) = materials.get_mut(&handle.0) else {
                continue;
            };
            if saved.is_none() {
                commands.entity(part).insert(FadeSaved {
                    alpha: material.base_color.alpha(),
                    alpha_mode: material.alpha_mode,
                });
            }
            material.base_color.set_alpha(opacity);
            material.alpha_mode = AlphaMode::Blend;
        }
    }
}

pub fn play_victories(mut winners: Query<(&mut VictoryAnimation, &mut Transform)>) {
    for (mut animation, mut transform) in &mut winners {
        if let Some((y, spin)) = animation.step() {
            transform.translation.y = y;
            transform.rotate_y(spin);
        }
    }
}

/// Undoes the fade of every mesh under `root`.
pub fn restore_fade(
    commands: &mut Commands,
    root: Entity,
    children: &Query<&Children>,
    meshes: &Query<(&MeshMaterial3d<StandardMaterial>, Option<&FadeSaved>)>,
    materials: &mut Assets<StandardMaterial>,
) {
    for part in children.iter_descendants(root) {
        let Ok((handle, Some(saved))) = meshes.get(part) else {
            continue;
        };
        if let Some(material) = materials.get_mut(&handle.0) {
            material.base_color.set_alpha(saved.alpha);
            material.alpha_mode = saved.alpha_mode;
        }
        commands.entity(part).remove::<FadeSaved>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defeat_topples_sinks_and_fades() {
        let mut animation = DefeatAnimation::new(&Transform::from_xyz(0.0, 2.0, 0.0));
        let first = animation.step();
        assert!(first.y.is_none());
        assert!(first.opacity.is_none());

        let mut last = first;
        let mut ticks = 1;
        while !last.done {
            last = animation.step();
            ticks += 1;
        }
        assert!((66..=68).contains(&ticks), "{ticks}");
        let (x, _, z) = last.rotation.to_euler(EulerRot::XYZ);
        assert!((z - FRAC_PI_2).abs() < 1e-4);
        assert!((x - DEFEAT_TILT).abs() < 1e-4);
        assert!((last.y.unwrap() - 0.5).abs() < 1e-5);
        assert!((last.opacity.unwrap() - DEFEAT_MIN_OPACITY).abs() < 1e-5);
    }

    #[test]
    fn winners_wait_their_turn_then_bounce() {
        let mut second = VictoryAnimation::staggered(1, 0, 1.0);
        for _ in 0..VICTORY_STAGGER {
            assert!(second.step().is_none());
        }
        let (y, spin) = second.step().unwrap();
        assert!(y > 1.0 && y <= 1.0 + VICTORY_JUMP);
        assert_eq!(spin, VICTORY_SPIN);

        let mut bouncing = VictoryAnimation::staggered(0, 0, 0.0);
        for _ in 0..200 {
            let (y, _) = bouncing.step().unwrap();
            assert!((0.0..=VICTORY_JUMP).contains(&y));
        }
    }
}
