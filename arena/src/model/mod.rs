//! Character models: compiling generated scene graphs into Bevy hierarchies.
//!
//! The pipeline is pure up to [`spawn::spawn_render_node`]: [`builder::build`]
//! produces a [`RenderNode`] tree, [`prune::remove_floating_parts`] and
//! [`ground::adjust_ground`] clean it up, and only then is it turned into
//! entities.

pub mod builder;
pub mod geometry;
pub mod ground;
pub mod mesh;
pub mod node;
pub mod part;
pub mod prune;
pub mod spawn;

pub use builder::build;
pub use geometry::Geometry;
pub use ground::adjust_ground;
pub use node::{MaterialSpec, MeshSpec, NodeKind, RenderNode};
pub use part::PartTag;
pub use prune::remove_floating_parts;
pub use spawn::{ModelMesh, ModelPart, spawn_render_node};

use protocol::SceneNode;

/// Result of the full compile pipeline for one character.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledModel {
    pub root: RenderNode,
    pub pruned: usize,
}

impl CompiledModel {
    /// Resting height of the root after ground adjustment.
    pub fn base_y(&self) -> f32 {
        self.root.transform.translation.y
    }
}

/// Build, prune floating decorations, then settle on the ground.
pub fn compile(scene: &SceneNode) -> CompiledModel {
    let mut root = build(scene);
    let pruned = remove_floating_parts(&mut root);
    adjust_ground(&mut root);
    CompiledModel { root, pruned }
}
