//! Attack choreography as a per-tick state machine.
//!
//! `Forward` eases the attacker to just short of the target, `Hit` knocks the
//! target back with a shake and a flash, `KnockbackReturn` eases the target
//! home, and `Return` walks the attacker back. The machine owns no entities:
//! every tick yields the poses to write and the cues to act on.

use bevy::prelude::*;
use common::Element;
use rand::Rng;

/// Identifies one requested attack across begin and finish messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AttackTicket(pub u64);

/// Per-tick rates and distances of the choreography, at 60 ticks a second.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct AttackTiming {
    /// Progress per tick of `Forward`, `Hit` and `Return`.
    pub step: f32,
    /// Progress per tick of `KnockbackReturn`.
    pub knockback_return_step: f32,
    /// `Hit` ends once its progress reaches this value.
    pub hit_duration: f32,
    /// How far short of the target's home the attacker stops.
    pub clearance: f32,
    pub knockback_speed: f32,
    pub knockback_cap: f32,
    /// Full width of the random roll shake.
    pub shake_roll: f32,
    /// Full width of the random vertical shake.
    pub shake_height: f32,
}

impl Default for AttackTiming {
    fn default() -> Self {
        Self {
            step: 0.025,
            knockback_return_step: 0.012,
            hit_duration: 0.4,
            clearance: 2.0,
            knockback_speed: 0.25,
            knockback_cap: 4.0,
            shake_roll: 0.4,
            shake_height: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackPhase {
    Forward,
    Hit,
    KnockbackReturn,
    Return,
    Done,
}

/// Side effect requested by a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackCue {
    /// Spawn the element's burst at `position` and play the hit sound.
    Impact { position: Vec3, element: Element },
    FlashTarget,
    RestoreTarget,
    Finished,
}

/// Poses to write after one tick. `target_roll` replaces the Euler Z of the
/// target's rotation captured at the start of the attack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttackStep {
    pub attacker: Option<Vec3>,
    pub target: Option<Vec3>,
    pub target_roll: Option<f32>,
    pub cues: Vec<AttackCue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttackAnimation {
    pub ticket: AttackTicket,
    pub attacker: Entity,
    pub target: Entity,
    pub element: Element,
    pub phase: AttackPhase,
    pub progress: f32,
    pub home: Vec3,
    pub hit_position: Vec3,
    pub target_home: Vec3,
    /// Target rotation before the shake.
    pub target_rotation: Quat,
    knock_direction: Vec3,
    knock_distance: f32,
    knock_start: Vec3,
    target_position: Vec3,
    effect_spawned: bool,
    timing: AttackTiming,
}

impl AttackAnimation {
    pub fn new(
        ticket: AttackTicket,
        (attacker, home): (Entity, Vec3),
        (target, target_home, target_rotation): (Entity, Vec3, Quat),
        element: Element,
        timing: AttackTiming,
    ) -> Self {
        let direction = (target_home - home).normalize_or_zero();
        Self {
            ticket,
            attacker,
            target,
            element,
            phase: AttackPhase::Forward,
            progress: 0.0,
            home,
            hit_position: target_home - direction * timing.clearance,
            target_home,
            target_rotation,
            knock_direction: direction,
            knock_distance: 0.0,
            knock_start: target_home,
            target_position: target_home,
            effect_spawned: false,
            timing,
        }
    }

    pub fn is_done(&self) -> bool {
        self.phase == AttackPhase::Done
    }

    /// Horizontal distance the target is currently pushed from its home.
    pub fn knockback(&self) -> f32 {
        let offset = self.target_position - self.target_home;
        Vec2::new(offset.x, offset.z).length()
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> AttackStep {
        let mut step = AttackStep::default();
        self.progress += match self.phase {
            AttackPhase::KnockbackReturn => self.timing.knockback_return_step,
            _ => self.timing.step,
        };
        let p = self.progress.min(1.0);

        match self.phase {
            AttackPhase::Forward => {
                let eased = 1.0 - (1.0 - p).powi(3);
                step.attacker = Some(self.home.lerp(self.hit_position, eased));
                if p >= 1.0 {
                    self.enter(AttackPhase::Hit);
                }
            }
            AttackPhase::Hit => {
                if !self.effect_spawned {
                    self.effect_spawned = true;
                    step.cues.push(AttackCue::Impact {
                        position: self.target_home,
                        element: self.element,
                    });
                    step.cues.push(AttackCue::FlashTarget);
                }
                if self.knock_distance < self.timing.knockback_cap {
                    self.knock_distance = (self.knock_distance + self.timing.knockback_speed)
                        .min(self.timing.knockback_cap);
                    self.target_position = Vec3::new(
                        self.target_home.x + self.knock_direction.x * self.knock_distance,
                        self.target_home.y + (rng.r#gen::<f32>() - 0.5) * self.timing.shake_height,
                        self.target_home.z + self.knock_direction.z * self.knock_distance,
                    );
                    step.target = Some(self.target_position);
                    step.target_roll = Some((rng.r#gen::<f32>() - 0.5) * self.timing.shake_roll);
                }
                if self.progress >= self.timing.hit_duration {
                    step.cues.push(AttackCue::RestoreTarget);
                    step.target_roll = None;
                    self.knock_start = self.target_position;
                    self.enter(AttackPhase::KnockbackReturn);
                }
            }
            AttackPhase::KnockbackReturn => {
                let eased = p * p * (3.0 - 2.0 * p);
                self.target_position = self.knock_start.lerp(self.target_home, eased);
                if p >= 1.0 {
                    self.target_position = self.target_home;
                    self.enter(AttackPhase::Return);
                }
                step.target = Some(self.target_position);
            }
            AttackPhase::Return => {
                step.attacker = Some(self.hit_position.lerp(self.home, p));
                if p >= 1.0 {
                    self.enter(AttackPhase::Done);
                    step.cues.push(AttackCue::Finished);
                }
            }
            AttackPhase::Done => {}
        }
        step
    }

    fn enter(&mut self, phase: AttackPhase) {
        self.phase = phase;
        self.progress = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn animation(timing: AttackTiming) -> AttackAnimation {
        AttackAnimation::new(
            AttackTicket(1),
            (Entity::PLACEHOLDER, Vec3::new(-5.0, 0.0, 0.0)),
            (
                Entity::PLACEHOLDER,
                Vec3::new(5.0, -1.0, 0.0),
                Quat::IDENTITY,
            ),
            Element::Water,
            timing,
        )
    }

    fn run_to_end(animation: &mut AttackAnimation) -> Vec<AttackStep> {
        let mut rng = StdRng::seed_from_u64(9);
        let mut steps = Vec::new();
        while !animation.is_done() {
            steps.push(animation.tick(&mut rng));
            assert!(steps.len() < 10_000, "attack never finished");
        }
        steps
    }

    #[test]
    fn attacker_stops_short_of_target() {
        let animation = animation(AttackTiming::default());
        let gap = animation.target_home - animation.hit_position;
        assert!((gap.length() - 2.0).abs() < 1e-5);
        assert!(gap.normalize().dot(Vec3::new(10.0, -1.0, 0.0).normalize()) > 0.999);
    }

    #[test]
    fn phases_run_in_order_and_finish_once() {
        let mut animation = animation(AttackTiming::default());
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = vec![animation.phase];
        let mut finished = 0;
        let mut impacts = 0;
        while !animation.is_done() {
            let step = animation.tick(&mut rng);
            finished += step.cues.iter().filter(|cue| matches!(cue, AttackCue::Finished)).count();
            impacts += step
                .cues
                .iter()
                .filter(|cue| matches!(cue, AttackCue::Impact { .. }))
                .count();
            if seen.last() != Some(&animation.phase) {
                seen.push(animation.phase);
            }
        }
        assert_eq!(
            seen,
            vec![
                AttackPhase::Forward,
                AttackPhase::Hit,
                AttackPhase::KnockbackReturn,
                AttackPhase::Return,
                AttackPhase::Done
            ]
        );
        assert_eq!(finished, 1);
        assert_eq!(impacts, 1);
    }

    #[test]
    fn impact_lands_on_target_home_with_the_attack_element() {
        let mut animation = animation(AttackTiming::default());
        let steps = run_to_end(&mut animation);
        let impact = steps
            .iter()
            .flat_map(|step| step.cues.iter())
            .find_map(|cue| match cue {
                AttackCue::Impact { position, element } => Some((*position, *element)),
                _ => None,
            });
        assert_eq!(impact, Some((Vec3::new(5.0, -1.0, 0.0), Element::Water)));
    }

    #[test]
    fn forward_eases_out_and_return_ends_home() {
        let mut animation = animation(AttackTiming::default());
        let mut rng = StdRng::seed_from_u64(2);
        let first = animation.tick(&mut rng).attacker.unwrap();
        let eased = 1.0 - (1.0_f32 - 0.025).powi(3);
        let expected = animation.home.lerp(animation.hit_position, eased);
        assert!(first.abs_diff_eq(expected, 1e-5));

        let steps = run_to_end(&mut animation);
        let last_attacker = steps.iter().rev().find_map(|step| step.attacker).unwrap();
        assert!(last_attacker.abs_diff_eq(animation.home, 1e-5));
        let last_target = steps.iter().rev().find_map(|step| step.target).unwrap();
        assert_eq!(last_target, animation.target_home);
    }

    #[test]
    fn flash_is_restored_before_knockback_return() {
        let mut animation = animation(AttackTiming::default());
        let steps = run_to_end(&mut animation);
        let cues: Vec<AttackCue> = steps.iter().flat_map(|step| step.cues.clone()).collect();
        let flash = cues.iter().position(|cue| *cue == AttackCue::FlashTarget).unwrap();
        let restore = cues.iter().position(|cue| *cue == AttackCue::RestoreTarget).unwrap();
        assert!(flash < restore);
        assert_eq!(cues.iter().filter(|cue| **cue == AttackCue::RestoreTarget).count(), 1);
    }

    #[test]
    fn knockback_never_exceeds_its_cap() {
        let timing = AttackTiming {
            hit_duration: 5.0,
            ..Default::default()
        };
        let mut animation = animation(timing);
        let mut rng = StdRng::seed_from_u64(4);
        let mut farthest: f32 = 0.0;
        while !animation.is_done() {
            animation.tick(&mut rng);
            farthest = farthest.max(animation.knockback());
        }
        assert!(farthest <= 4.0 + 1e-5, "{farthest}");
        assert!((farthest - 4.0).abs() < 1e-4);
    }

    #[test]
    fn shake_stays_within_bounds() {
        let mut animation = animation(AttackTiming::default());
        for step in run_to_end(&mut animation) {
            if let Some(roll) = step.target_roll {
                assert!(roll.abs() <= 0.2);
            }
            if let Some(target) = step.target {
                assert!((target.y - animation.target_home.y).abs() <= 0.15);
            }
        }
    }

    #[test]
    fn coincident_attacker_and_target_do_not_produce_nan() {
        let mut animation = AttackAnimation::new(
            AttackTicket(3),
            (Entity::PLACEHOLDER, Vec3::ZERO),
            (Entity::PLACEHOLDER, Vec3::ZERO, Quat::IDENTITY),
            Element::Fire,
            AttackTiming::default(),
        );
        for step in run_to_end(&mut animation) {
            for position in step.attacker.into_iter().chain(step.target) {
                assert!(position.is_finite());
            }
        }
    }
}
