//! Wire formats of the external character-generation and battle-narration
//! services.
//!
//! The services are backed by a language model, so responses are decoded
//! leniently: see [`codec`] for the text repairs and [`scene`] for the
//! tolerant scene-graph schema.

pub mod codec;
pub mod message;
pub mod scene;

pub use codec::{PayloadError, decode_battle_script, decode_character, force_winner};
pub use message::{
    BattleAction, BattleEvent, CharacterDefinition, CharacterPayload, FusionRequest,
    GenerateRequest, NarrationRequest,
};
pub use scene::{SceneNode, ShapeKind};

/// Returns the protocol crate version string.
pub fn protocol_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_matches_pkg() {
        assert_eq!(protocol_version(), env!("CARGO_PKG_VERSION"));
    }
}
