//! Removes small decorative meshes the generator tends to leave floating
//! around the feet of legged creatures.

use bevy::prelude::*;

use super::node::RenderNode;

/// Clearance below the lowest leg joint where the creature's feet end.
pub const LEG_CLEARANCE: f32 = 0.5;
/// Height above the feet within which loose decorations are considered.
pub const FLOOR_BAND: f32 = 0.3;
const SMALL_PART_EXTENT: f32 = 0.4;
const SLAB_MAX_HEIGHT: f32 = 0.15;
const SLAB_MIN_SPAN: f32 = 0.3;

/// Prunes untagged meshes near the floor line of a legged hierarchy and
/// returns how many subtrees were removed. The root itself is never removed.
pub fn remove_floating_parts(root: &mut RenderNode) -> usize {
    let Some(floor_line) = floor_line(root) else {
        return 0;
    };
    let world = GlobalTransform::IDENTITY.mul_transform(root.transform);
    prune_children(root, world, floor_line)
}

fn floor_line(root: &RenderNode) -> Option<f32> {
    let mut lowest: Option<f32> = None;
    root.walk(GlobalTransform::IDENTITY, None, &mut |node, world, _| {
        if node.part.is_some_and(|part| part.is_leg()) {
            let y = world.translation().y - LEG_CLEARANCE;
            lowest = Some(lowest.map_or(y, |current| current.min(y)));
        }
    });
    lowest
}

fn prune_children(node: &mut RenderNode, world: GlobalTransform, floor_line: f32) -> usize {
    let parent_tagged = node.part.is_some();
    let before = node.children.len();
    node.children.retain(|child| {
        let child_world = world.mul_transform(child.transform);
        parent_tagged || !is_floating_decoration(child, &child_world, floor_line)
    });
    let mut removed = before - node.children.len();

    for child in &mut node.children {
        let child_world = world.mul_transform(child.transform);
        removed += prune_children(child, child_world, floor_line);
    }
    removed
}

fn is_floating_decoration(node: &RenderNode, world: &GlobalTransform, floor_line: f32) -> bool {
    let Some(mesh) = node.mesh() else {
        return false;
    };
    if node.part.is_some() || world.translation().y >= floor_line + FLOOR_BAND {
        return false;
    }
    let size = mesh.geometry.size();
    let small = size.max_element() < SMALL_PART_EXTENT;
    let slab = size.y < SLAB_MAX_HEIGHT && (size.x > SLAB_MIN_SPAN || size.z > SLAB_MIN_SPAN);
    small || slab
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::builder::build;
    use protocol::{SceneNode, ShapeKind};

    fn part(shape: ShapeKind, tag: Option<&str>, position: [f32; 3], scale: [f32; 3]) -> SceneNode {
        SceneNode {
            shape,
            part_tag: tag.map(str::to_string),
            position: Some(position),
            scale: Some(scale),
            ..Default::default()
        }
    }

    fn group(children: Vec<SceneNode>) -> SceneNode {
        SceneNode {
            shape: ShapeKind::Group,
            children,
            ..Default::default()
        }
    }

    #[test]
    fn hierarchy_without_legs_is_untouched() {
        let mut root = build(&group(vec![
            part(ShapeKind::Sphere, None, [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
            part(ShapeKind::Sphere, None, [0.0, -5.0, 0.0], [0.1, 0.1, 0.1]),
            part(ShapeKind::Box, None, [0.0, -5.0, 0.0], [1.0, 0.05, 1.0]),
        ]));
        let before = root.clone();

        assert_eq!(remove_floating_parts(&mut root), 0);
        assert_eq!(root, before);
    }

    #[test]
    fn pebbles_and_slabs_near_the_feet_are_removed() {
        // Leg pivot at y = -0.5, so the floor line is -1.0 and the band ends at -0.7.
        let mut root = build(&group(vec![
            part(ShapeKind::Sphere, None, [0.0, 0.0, 0.0], [1.2, 1.2, 1.2]),
            part(ShapeKind::Cylinder, Some("leg_fl"), [0.3, -1.0, 0.3], [0.2, 1.0, 0.2]),
            part(ShapeKind::Sphere, None, [0.5, -0.9, 0.5], [0.2, 0.2, 0.2]),
            part(ShapeKind::Box, None, [0.0, -1.1, 0.0], [1.5, 0.05, 1.5]),
            part(ShapeKind::Box, None, [0.0, -0.9, 0.0], [1.0, 1.0, 1.0]),
            part(ShapeKind::Sphere, None, [0.0, -0.6, 0.0], [0.2, 0.2, 0.2]),
        ]));

        assert_eq!(remove_floating_parts(&mut root), 2);
        assert_eq!(root.children.len(), 4);
        assert!(root.children[1].is_pivot());
    }

    #[test]
    fn children_of_tagged_parts_are_kept() {
        let mut claws = part(ShapeKind::Group, Some("leg_fr"), [0.0, -1.0, 0.0], [1.0, 1.0, 1.0]);
        claws.children = vec![part(ShapeKind::Cone, None, [0.0, -0.5, 0.2], [0.05, 0.1, 0.05])];
        let mut root = build(&group(vec![claws]));

        assert_eq!(remove_floating_parts(&mut root), 0);
        assert_eq!(root.mesh_count(), 1);
    }
}
