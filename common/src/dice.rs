//! Super-fusion dice.
//!
//! Faces are drawn with weights that fall off for recently rolled faces, so
//! streaks are rare without being impossible.

use rand::Rng;

pub const FACES: u8 = 6;
/// History is trimmed back to `HISTORY_KEEP` once it grows past `HISTORY_LIMIT`.
pub const HISTORY_LIMIT: usize = 15;
pub const HISTORY_KEEP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiceOutcome {
    /// Faces 1-2: the fusion fizzles into a copy of the first pick.
    Fail,
    /// Faces 3-4.
    Normal,
    /// Faces 5-6.
    Super,
}

impl DiceOutcome {
    pub fn for_face(face: u8) -> Self {
        match face {
            0..=2 => Self::Fail,
            3..=4 => Self::Normal,
            _ => Self::Super,
        }
    }

    pub fn multiplier(self) -> f32 {
        match self {
            Self::Fail => 0.0,
            Self::Normal => 1.0,
            Self::Super => 1.5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fail => "Fusion failed",
            Self::Normal => "Normal fusion",
            Self::Super => "Super fusion",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiceRoll {
    pub face: u8,
    pub outcome: DiceOutcome,
}

impl DiceRoll {
    pub fn multiplier(&self) -> f32 {
        self.outcome.multiplier()
    }
}

/// Rolling history of faces, most recent last.
#[derive(Debug, Clone, Default)]
pub struct DiceHistory {
    faces: Vec<u8>,
}

impl DiceHistory {
    pub fn faces(&self) -> &[u8] {
        &self.faces
    }

    /// Draw weight of `face` given how many rolls ago it last came up.
    pub fn weight(&self, face: u8) -> f64 {
        let Some(last_index) = self.faces.iter().rposition(|&seen| seen == face) else {
            return 10.0;
        };
        match self.faces.len() - last_index {
            1 => 0.5,
            2 => 2.0,
            3 => 5.0,
            _ => 10.0,
        }
    }

    pub fn pick_face<R: Rng + ?Sized>(&self, rng: &mut R) -> u8 {
        let weights: Vec<f64> = (1..=FACES).map(|face| self.weight(face)).collect();
        let total: f64 = weights.iter().sum();
        let mut remaining = rng.gen_range(0.0..total);
        for (index, weight) in weights.iter().enumerate() {
            remaining -= weight;
            if remaining <= 0.0 {
                return index as u8 + 1;
            }
        }
        FACES
    }

    pub fn roll<R: Rng + ?Sized>(&mut self, rng: &mut R) -> DiceRoll {
        let face = self.pick_face(rng);
        self.record(face);
        DiceRoll {
            face,
            outcome: DiceOutcome::for_face(face),
        }
    }

    pub fn record(&mut self, face: u8) {
        self.faces.push(face);
        if self.faces.len() > HISTORY_LIMIT {
            let drop = self.faces.len() - HISTORY_KEEP;
            self.faces.drain(..drop);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn faces_map_to_outcomes() {
        assert_eq!(DiceOutcome::for_face(1), DiceOutcome::Fail);
        assert_eq!(DiceOutcome::for_face(2), DiceOutcome::Fail);
        assert_eq!(DiceOutcome::for_face(4), DiceOutcome::Normal);
        assert_eq!(DiceOutcome::for_face(6), DiceOutcome::Super);
        assert_eq!(DiceOutcome::Super.multiplier(), 1.5);
    }

    #[test]
    fn recent_faces_weigh_less() {
        let mut history = DiceHistory::default();
        for face in [1, 2, 3] {
            history.record(face);
        }
        assert_eq!(history.weight(3), 0.5);
        assert_eq!(history.weight(2), 2.0);
        assert_eq!(history.weight(1), 5.0);
        assert_eq!(history.weight(6), 10.0);
    }

    #[test]
    fn history_is_trimmed() {
        let mut history = DiceHistory::default();
        for roll in 0..16 {
            history.record(roll % 6 + 1);
        }
        assert_eq!(history.faces().len(), HISTORY_KEEP);
    }

    #[test]
    fn rolls_stay_on_the_die() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut history = DiceHistory::default();
        for _ in 0..200 {
            let roll = history.roll(&mut rng);
            assert!((1..=FACES).contains(&roll.face));
        }
    }
}
