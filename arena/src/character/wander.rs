use std::f32::consts::{FRAC_PI_2, PI, TAU};

use bevy::prelude::*;
use rand::Rng;

use super::types::FieldCharacter;
use crate::session::SessionRng;

/// Headings a wanderer walks along: +z, +x, -z, -x.
pub const HEADINGS: [f32; 4] = [0.0, FRAC_PI_2, PI, PI * 1.5];
/// Half size of the square the field characters stay inside.
pub const FIELD_BOUND: f32 = 12.0;
const STEP_LENGTH: f32 = 0.5;
const TURN_RATE: f32 = 0.15;

/// Four-direction random walk state of a field character.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Wander {
    pub heading: f32,
    pub speed: f32,
    pub travelled: f32,
    pub steps: f32,
}

impl Wander {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            heading: HEADINGS[rng.gen_range(0..HEADINGS.len())],
            speed: 0.008 + rng.gen_range(0.0..0.007),
            travelled: 0.0,
            steps: 5.0,
        }
    }

    /// Advances one tick: walks, turns toward the heading and keeps the
    /// character inside the field.
    pub fn advance<R: Rng + ?Sized>(&mut self, transform: &mut Transform, rng: &mut R) {
        transform.translation.x += self.heading.sin() * self.speed;
        transform.translation.z += self.heading.cos() * self.speed;
        self.travelled += self.speed;
        if self.travelled >= self.steps * STEP_LENGTH {
            self.travelled = 0.0;
            self.heading = HEADINGS[rng.gen_range(0..HEADINGS.len())];
            self.steps = 4.0 + rng.gen_range(0.0..2.0);
        }

        let (x, yaw, z) = transform.rotation.to_euler(EulerRot::XYZ);
        let yaw = yaw + wrap_angle(self.heading - yaw) * TURN_RATE;
        transform.rotation = Quat::from_euler(EulerRot::XYZ, x, yaw, z);

        let position = &mut transform.translation;
        if position.x.abs() > FIELD_BOUND || position.z.abs() > FIELD_BOUND {
            position.x = position.x.clamp(-FIELD_BOUND, FIELD_BOUND);
            position.z = position.z.clamp(-FIELD_BOUND, FIELD_BOUND);
            self.heading = HEADINGS[rng.gen_range(0..HEADINGS.len())];
            self.travelled = 0.0;
        }
    }
}

/// Wraps an angle difference into [-π, π].
pub fn wrap_angle(mut angle: f32) -> f32 {
    while angle > PI {
        angle -= TAU;
    }
    while angle < -PI {
        angle += TAU;
    }
    angle
}

pub fn wander_field_characters(
    mut rng: ResMut<SessionRng>,
    mut wanderers: Query<(&mut Wander, &mut Transform, &Visibility), With<FieldCharacter>>,
) {
    for (mut wander, mut transform, visibility) in &mut wanderers {
        if matches!(visibility, Visibility::Hidden) {
            continue;
        }
        wander.advance(&mut transform, &mut rng.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn walks_along_one_of_four_headings() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut wander = Wander::new(&mut rng);
        assert!(HEADINGS.contains(&wander.heading));
        assert!((0.008..0.015).contains(&wander.speed));

        wander.heading = FRAC_PI_2;
        let mut transform = Transform::IDENTITY;
        wander.advance(&mut transform, &mut rng);
        assert!((transform.translation.x - wander.speed).abs() < 1e-6);
        assert!(transform.translation.z.abs() < 1e-6);
    }

    #[test]
    fn picks_a_new_heading_after_its_steps() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut wander = Wander {
            heading: 0.0,
            speed: 0.5,
            travelled: 2.4,
            steps: 5.0,
        };
        let mut transform = Transform::IDENTITY;
        wander.advance(&mut transform, &mut rng);

        assert_eq!(wander.travelled, 0.0);
        assert!((4.0..6.0).contains(&wander.steps));
    }

    #[test]
    fn never_leaves_the_field() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut wander = Wander {
            heading: FRAC_PI_2,
            speed: 0.5,
            travelled: 0.0,
            steps: 1000.0,
        };
        let mut transform = Transform::from_xyz(11.8, 0.0, -11.9);
        for _ in 0..200 {
            wander.advance(&mut transform, &mut rng);
            assert!(transform.translation.x.abs() <= FIELD_BOUND);
            assert!(transform.translation.z.abs() <= FIELD_BOUND);
        }
    }

    #[test]
    fn turning_takes_the_short_way_round() {
        assert!((wrap_angle(1.5 * PI) + 0.5 * PI).abs() < 1e-5);
        assert!((wrap_angle(-1.5 * PI) - 0.5 * PI).abs() < 1e-5);

        let mut rng = StdRng::seed_from_u64(1);
        let mut wander = Wander {
            heading: PI * 1.5,
            speed: 0.0,
            travelled: 0.0,
            steps: 5.0,
        };
        let mut transform = Transform::IDENTITY;
        wander.advance(&mut transform, &mut rng);
        let (_, yaw, _) = transform.rotation.to_euler(EulerRot::XYZ);
        assert!((yaw + 0.5 * PI * TURN_RATE).abs() < 1e-4);
    }
}
