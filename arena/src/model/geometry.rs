use bevy::prelude::*;
use protocol::{SceneNode, ShapeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatonicSolid {
    Tetrahedron,
    Octahedron,
    Icosahedron,
    Dodecahedron,
}

impl PlatonicSolid {
    /// Largest per-axis coordinate of a vertex, relative to the circumradius.
    pub fn axis_extent(self) -> f32 {
        match self {
            Self::Tetrahedron => 0.577_350_3,
            Self::Octahedron => 1.0,
            Self::Icosahedron => 0.850_650_8,
            Self::Dodecahedron => 0.934_172_4,
        }
    }
}

/// Resolved primitive parameters of a mesh node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Box { size: Vec3 },
    Sphere { radius: f32 },
    Cylinder { radius_top: f32, radius_bottom: f32, height: f32 },
    Cone { radius: f32, height: f32 },
    /// Lies in the XY plane.
    Torus { radius: f32, tube: f32 },
    /// (2, 3) knot in the XY plane.
    TorusKnot { radius: f32, tube: f32 },
    Platonic { solid: PlatonicSolid, radius: f32 },
    /// Lies in the XY plane.
    Ring { inner: f32, outer: f32 },
    /// Lies in the XY plane.
    Plane { width: f32, height: f32 },
}

impl Geometry {
    pub const UNIT_BOX: Self = Self::Box { size: Vec3::ONE };

    /// Maps a leaf node to its geometry. Groups and unknown shapes become a
    /// unit box; callers handle groups before reaching this point.
    pub fn for_node(node: &SceneNode) -> Self {
        let [x, y, z] = node.scale.unwrap_or([1.0, 1.0, 1.0]);
        match node.shape {
            ShapeKind::Box => Self::Box {
                size: Vec3::new(x, y, z),
            },
            ShapeKind::Sphere => Self::Sphere {
                radius: if node.raw_scale { x } else { x * 0.5 },
            },
            ShapeKind::Cylinder => Self::Cylinder {
                radius_top: x * 0.5,
                radius_bottom: if z != 0.0 { z * 0.5 } else { x * 0.5 },
                height: y,
            },
            ShapeKind::Cone => Self::Cone {
                radius: x,
                height: y,
            },
            ShapeKind::Torus => Self::Torus {
                radius: x * 0.5,
                tube: y * 0.15,
            },
            ShapeKind::TorusKnot => Self::TorusKnot {
                radius: x * 0.4,
                tube: y * 0.1,
            },
            ShapeKind::Dodecahedron => Self::platonic(PlatonicSolid::Dodecahedron, x),
            ShapeKind::Icosahedron => Self::platonic(PlatonicSolid::Icosahedron, x),
            ShapeKind::Octahedron => Self::platonic(PlatonicSolid::Octahedron, x),
            ShapeKind::Tetrahedron => Self::platonic(PlatonicSolid::Tetrahedron, x),
            ShapeKind::Ring => Self::Ring {
                inner: x * 0.3,
                outer: x * 0.5,
            },
            ShapeKind::Plane => Self::Plane {
                width: x,
                height: y,
            },
            ShapeKind::Group | ShapeKind::Unknown => Self::UNIT_BOX,
        }
    }

    fn platonic(solid: PlatonicSolid, scale_x: f32) -> Self {
        Self::Platonic {
            solid,
            radius: scale_x * 0.5,
        }
    }

    /// Half extents of the local axis-aligned bounding box, centred on the origin.
    pub fn half_extents(&self) -> Vec3 {
        let extents = match *self {
            Self::Box { size } => size * 0.5,
            Self::Sphere { radius } => Vec3::splat(radius),
            Self::Cylinder {
                radius_top,
                radius_bottom,
                height,
            } => {
                let radius = radius_top.abs().max(radius_bottom.abs());
                Vec3::new(radius, height * 0.5, radius)
            }
            Self::Cone { radius, height } => Vec3::new(radius, height * 0.5, radius),
            Self::Torus { radius, tube } => {
                Vec3::new(radius.abs() + tube.abs(), radius.abs() + tube.abs(), tube)
            }
            Self::TorusKnot { radius, tube } => {
                let planar = radius.abs() * 1.5 + tube.abs();
                Vec3::new(planar, planar, radius.abs() * 0.5 + tube.abs())
            }
            Self::Platonic { solid, radius } => Vec3::splat(radius * solid.axis_extent()),
            Self::Ring { outer, .. } => Vec3::new(outer, outer, 0.0),
            Self::Plane { width, height } => Vec3::new(width * 0.5, height * 0.5, 0.0),
        };
        extents.abs()
    }

    /// Size of the local bounding box.
    pub fn size(&self) -> Vec3 {
        self.half_extents() * 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(shape: ShapeKind, scale: [f32; 3]) -> SceneNode {
        SceneNode {
            shape,
            scale: Some(scale),
            ..Default::default()
        }
    }

    #[test]
    fn sphere_radius_follows_raw_scale_flag() {
        let mut sphere = node(ShapeKind::Sphere, [2.0, 2.0, 2.0]);
        assert_eq!(Geometry::for_node(&sphere), Geometry::Sphere { radius: 1.0 });
        sphere.raw_scale = true;
        assert_eq!(Geometry::for_node(&sphere), Geometry::Sphere { radius: 2.0 });
    }

    #[test]
    fn cylinder_bottom_radius_falls_back_to_x() {
        assert_eq!(
            Geometry::for_node(&node(ShapeKind::Cylinder, [0.4, 1.0, 0.0])),
            Geometry::Cylinder {
                radius_top: 0.2,
                radius_bottom: 0.2,
                height: 1.0
            }
        );
        assert_eq!(
            Geometry::for_node(&node(ShapeKind::Cylinder, [0.4, 1.0, 0.8])),
            Geometry::Cylinder {
                radius_top: 0.2,
                radius_bottom: 0.4,
                height: 1.0
            }
        );
    }

    #[test]
    fn cone_keeps_full_scale() {
        assert_eq!(
            Geometry::for_node(&node(ShapeKind::Cone, [0.3, 0.6, 0.3])),
            Geometry::Cone {
                radius: 0.3,
                height: 0.6
            }
        );
    }

    #[test]
    fn torus_ring_and_knot_scale_factors() {
        assert_eq!(
            Geometry::for_node(&node(ShapeKind::Torus, [2.0, 1.0, 1.0])),
            Geometry::Torus {
                radius: 1.0,
                tube: 0.15
            }
        );
        assert_eq!(
            Geometry::for_node(&node(ShapeKind::Ring, [1.0, 1.0, 1.0])),
            Geometry::Ring {
                inner: 0.3,
                outer: 0.5
            }
        );
        let Geometry::TorusKnot { radius, tube } =
            Geometry::for_node(&node(ShapeKind::TorusKnot, [1.0, 1.0, 1.0]))
        else {
            panic!("expected torus knot");
        };
        assert!((radius - 0.4).abs() < 1e-6);
        assert!((tube - 0.1).abs() < 1e-6);
    }

    #[test]
    fn plane_sized_by_two_entry_scale() {
        let plane: SceneNode =
            serde_json::from_str(r#"{"type":"plane","scale":[2.0,0.5]}"#).unwrap();
        assert_eq!(
            Geometry::for_node(&plane),
            Geometry::Plane {
                width: 2.0,
                height: 0.5
            }
        );
    }

    #[test]
    fn unknown_shape_and_missing_scale_build_a_unit_box() {
        let unknown = SceneNode::default();
        assert_eq!(Geometry::for_node(&unknown), Geometry::UNIT_BOX);
        assert_eq!(Geometry::UNIT_BOX.size(), Vec3::ONE);
    }
}
