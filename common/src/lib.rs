//! Game rules shared by the arena client and the service wire formats.
//!
//! Everything here is pure: elements and their advantage cycle, character
//! stat blocks, the battle outcome formula, per-stage boss scaling, the
//! super-fusion dice and the pool of scripted battle twists.

pub mod boss;
pub mod dice;
pub mod drama;
pub mod element;
pub mod lenient;
pub mod outcome;
pub mod stats;

pub use boss::BossProfile;
pub use dice::{DiceHistory, DiceOutcome, DiceRoll};
pub use drama::{DramaEvent, pick_drama_events};
pub use element::Element;
pub use outcome::{BattleOutcome, Winner, calc_battle_outcome, power_score};
pub use stats::CharacterStats;
