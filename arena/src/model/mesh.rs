//! Tessellation of resolved [`Geometry`] into Bevy meshes.
//!
//! Torus, ring and plane lie in the XY plane and cylinders/cones stand on Y,
//! matching the conventions the generator authors its models against.

use std::f32::consts::{FRAC_PI_2, TAU};

use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;

use super::geometry::{Geometry, PlatonicSolid};

const ROUND_SEGMENTS: u32 = 32;
const TORUS_TUBE_SEGMENTS: usize = 16;
const TORUS_RING_SEGMENTS: usize = 100;
const KNOT_TUBULAR_SEGMENTS: usize = 100;
const KNOT_RADIAL_SEGMENTS: usize = 16;
const KNOT_P: f32 = 2.0;
const KNOT_Q: f32 = 3.0;

pub fn mesh_for(geometry: &Geometry) -> Mesh {
    match *geometry {
        Geometry::Box { size } => Cuboid::new(size.x, size.y, size.z).into(),
        Geometry::Sphere { radius } => Sphere::new(radius)
            .mesh()
            .uv(ROUND_SEGMENTS, ROUND_SEGMENTS),
        Geometry::Cylinder {
            radius_top,
            radius_bottom,
            height,
        } => ConicalFrustum {
            radius_top,
            radius_bottom,
            height,
        }
        .mesh()
        .resolution(ROUND_SEGMENTS)
        .build(),
        Geometry::Cone { radius, height } => Cone { radius, height }
            .mesh()
            .resolution(ROUND_SEGMENTS)
            .build(),
        Geometry::Torus { radius, tube } => Torus {
            minor_radius: tube,
            major_radius: radius,
        }
        .mesh()
        .minor_resolution(TORUS_TUBE_SEGMENTS)
        .major_resolution(TORUS_RING_SEGMENTS)
        .build()
        .rotated_by(Quat::from_rotation_x(FRAC_PI_2)),
        Geometry::TorusKnot { radius, tube } => torus_knot(radius, tube),
        Geometry::Platonic { solid, radius } => platonic(solid, radius),
        Geometry::Ring { inner, outer } => Annulus::new(inner, outer)
            .mesh()
            .resolution(ROUND_SEGMENTS)
            .build(),
        Geometry::Plane { width, height } => Rectangle::new(width, height).into(),
    }
}

fn platonic(solid: PlatonicSolid, radius: f32) -> Mesh {
    let (vertices, faces) = match solid {
        PlatonicSolid::Tetrahedron => (
            vec![
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(-1.0, -1.0, 1.0),
                Vec3::new(-1.0, 1.0, -1.0),
                Vec3::new(1.0, -1.0, -1.0),
            ],
            vec![[2, 1, 0], [0, 3, 2], [1, 3, 0], [2, 3, 1]],
        ),
        PlatonicSolid::Octahedron => (
            vec![
                Vec3::X,
                Vec3::NEG_X,
                Vec3::Y,
                Vec3::NEG_Y,
                Vec3::Z,
                Vec3::NEG_Z,
            ],
            vec![
                [0, 2, 4],
                [0, 4, 3],
                [0, 3, 5],
                [0, 5, 2],
                [1, 2, 5],
                [1, 5, 3],
                [1, 3, 4],
                [1, 4, 2],
            ],
        ),
        PlatonicSolid::Icosahedron => icosahedron(),
        PlatonicSolid::Dodecahedron => dodecahedron(),
    };
    flat_shaded(&vertices, &faces, radius)
}

fn icosahedron() -> (Vec<Vec3>, Vec<[usize; 3]>) {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let vertices = vec![
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ];
    let faces = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];
    (vertices, faces)
}

/// Dual of the icosahedron: one pentagon around every icosahedron vertex,
/// with corners at the centroids of the surrounding faces.
fn dodecahedron() -> (Vec<Vec3>, Vec<[usize; 3]>) {
    let (ico_vertices, ico_faces) = icosahedron();
    let corners: Vec<Vec3> = ico_faces
        .iter()
        .map(|[a, b, c]| ((ico_vertices[*a] + ico_vertices[*b] + ico_vertices[*c]) / 3.0).normalize())
        .collect();

    let mut faces = Vec::new();
    for (index, apex) in ico_vertices.iter().enumerate() {
        let axis = apex.normalize();
        let reference = if axis.y.abs() < 0.9 { Vec3::Y } else { Vec3::X };
        let tangent = axis.cross(reference).normalize();
        let bitangent = axis.cross(tangent);

        let mut ring: Vec<(f32, usize)> = ico_faces
            .iter()
            .enumerate()
            .filter(|(_, face)| face.contains(&index))
            .map(|(corner, _)| {
                let offset = corners[corner] - axis;
                (offset.dot(bitangent).atan2(offset.dot(tangent)), corner)
            })
            .collect();
        ring.sort_by(|a, b| a.0.total_cmp(&b.0));

        for pair in 1..ring.len().saturating_sub(1) {
            faces.push([ring[0].1, ring[pair].1, ring[pair + 1].1]);
        }
    }
    (corners, faces)
}

/// One normal per face; every vertex is projected onto the sphere of
/// `radius` and each face is wound outward.
fn flat_shaded(vertices: &[Vec3], faces: &[[usize; 3]], radius: f32) -> Mesh {
    let mut positions = Vec::with_capacity(faces.len() * 3);
    let mut normals = Vec::with_capacity(faces.len() * 3);
    let mut uvs = Vec::with_capacity(faces.len() * 3);

    for face in faces {
        let [mut a, mut b, c] =
            [face[0], face[1], face[2]].map(|index| vertices[index].normalize_or_zero() * radius);
        let mut normal = (b - a).cross(c - a).normalize_or_zero();
        if normal.dot(a + b + c) < 0.0 {
            std::mem::swap(&mut a, &mut b);
            normal = -normal;
        }
        for point in [a, b, c] {
            positions.push(point.to_array());
            normals.push(normal.to_array());
            uvs.push(spherical_uv(point));
        }
    }

    let indices = (0..positions.len() as u32).collect();
    Mesh::new(PrimitiveTopology::TriangleList, default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices))
}

fn spherical_uv(point: Vec3) -> [f32; 2] {
    let direction = point.normalize_or_zero();
    [
        0.5 + direction.z.atan2(direction.x) / TAU,
        0.5 - direction.y.clamp(-1.0, 1.0).asin() / std::f32::consts::PI,
    ]
}

fn knot_curve(u: f32, radius: f32) -> Vec3 {
    let winding = KNOT_Q / KNOT_P * u;
    let spread = radius * (2.0 + winding.cos()) * 0.5;
    Vec3::new(spread * u.cos(), spread * u.sin(), radius * winding.sin() * 0.5)
}

fn torus_knot(radius: f32, tube: f32) -> Mesh {
    let ring = KNOT_RADIAL_SEGMENTS + 1;
    let mut positions = Vec::with_capacity((KNOT_TUBULAR_SEGMENTS + 1) * ring);
    let mut normals = Vec::with_capacity(positions.capacity());
    let mut uvs = Vec::with_capacity(positions.capacity());

    for i in 0..=KNOT_TUBULAR_SEGMENTS {
        let u = i as f32 / KNOT_TUBULAR_SEGMENTS as f32 * KNOT_P * TAU;
        let center = knot_curve(u, radius);
        let ahead = knot_curve(u + 0.01, radius);
        let tangent = ahead - center;
        let bitangent = tangent.cross(ahead + center).normalize_or_zero();
        let normal = bitangent.cross(tangent).normalize_or_zero();

        for j in 0..=KNOT_RADIAL_SEGMENTS {
            let v = j as f32 / KNOT_RADIAL_SEGMENTS as f32 * TAU;
            let point = center + normal * (-tube * v.cos()) + bitangent * (tube * v.sin());
            positions.push(point.to_array());
            normals.push((point - center).normalize_or_zero().to_array());
            uvs.push([
                i as f32 / KNOT_TUBULAR_SEGMENTS as f32,
                j as f32 / KNOT_RADIAL_SEGMENTS as f32,
            ]);
        }
    }

    let mut indices = Vec::with_capacity(KNOT_TUBULAR_SEGMENTS * KNOT_RADIAL_SEGMENTS * 6);
    for j in 1..=KNOT_TUBULAR_SEGMENTS {
        for i in 1..=KNOT_RADIAL_SEGMENTS {
            let a = (ring * (j - 1) + (i - 1)) as u32;
            let b = (ring * j + (i - 1)) as u32;
            let c = (ring * j + i) as u32;
            let d = (ring * (j - 1) + i) as u32;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Mesh::new(PrimitiveTopology::TriangleList, default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(mesh: &Mesh) -> Vec<Vec3> {
        mesh.attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|values| values.as_float3())
            .map(|values| values.iter().copied().map(Vec3::from_array).collect())
            .unwrap_or_default()
    }

    #[test]
    fn platonic_vertices_lie_on_circumsphere() {
        for solid in [
            PlatonicSolid::Tetrahedron,
            PlatonicSolid::Octahedron,
            PlatonicSolid::Icosahedron,
            PlatonicSolid::Dodecahedron,
        ] {
            let mesh = platonic(solid, 0.5);
            let points = positions(&mesh);
            assert!(!points.is_empty());
            for point in &points {
                assert!((point.length() - 0.5).abs() < 1e-4, "{solid:?} {point:?}");
            }
            let extent = points
                .iter()
                .map(|point| point.abs().max_element())
                .fold(0.0_f32, f32::max);
            assert!((extent - 0.5 * solid.axis_extent()).abs() < 1e-3, "{solid:?} {extent}");
        }
    }

    #[test]
    fn dodecahedron_has_twelve_pentagons() {
        let (corners, faces) = dodecahedron();
        assert_eq!(corners.len(), 20);
        assert_eq!(faces.len(), 36);
    }

    #[test]
    fn torus_lies_in_xy_plane() {
        let mesh = mesh_for(&Geometry::Torus {
            radius: 1.0,
            tube: 0.1,
        });
        let max_z = positions(&mesh)
            .iter()
            .map(|point| point.z.abs())
            .fold(0.0_f32, f32::max);
        assert!(max_z <= 0.1 + 1e-4);
    }

    #[test]
    fn torus_knot_stays_inside_its_bounds() {
        let geometry = Geometry::TorusKnot {
            radius: 0.4,
            tube: 0.1,
        };
        let half = geometry.half_extents() + Vec3::splat(1e-4);
        for point in positions(&mesh_for(&geometry)) {
            assert!(point.abs().cmple(half).all(), "{point:?} outside {half:?}");
        }
    }
}
