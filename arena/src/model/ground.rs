use super::node::RenderNode;

/// How far below y = 0 a hierarchy may reach before it is lifted.
pub const GROUND_TOLERANCE: f32 = 0.05;

/// Lifts `root` so its lowest mesh point sits at y = 0 when it sinks more
/// than [`GROUND_TOLERANCE`] below the ground. Returns the lift applied.
pub fn adjust_ground(root: &mut RenderNode) -> f32 {
    let Some((min, _)) = root.world_bounds() else {
        return 0.0;
    };
    if min.y >= -GROUND_TOLERANCE {
        return 0.0;
    }
    root.transform.translation.y -= min.y;
    -min.y
}
