use std::f32::consts::{PI, TAU};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::scene::Shape;

const SPHERE_RINGS: u32 = 12;
const SPHERE_SECTORS: u32 = 16;

/// Interleaved triangle mesh ready for upload.
///
/// Vertices are laid out as `position.xyz` followed by `normal.xyz`; every
/// primitive is centred on the origin.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn for_shape(shape: Shape) -> Self {
        match shape {
            Shape::Box => Self::cuboid(),
            Shape::Plane => Self::plane(),
            Shape::Cone { segments } => Self::cone(segments),
            Shape::Sphere => Self::sphere(SPHERE_RINGS, SPHERE_SECTORS),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 6
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices
            .chunks_exact(6)
            .map(|chunk| Vec3::from_slice(&chunk[..3]))
    }

    pub fn normals(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices
            .chunks_exact(6)
            .map(|chunk| Vec3::from_slice(&chunk[3..]))
    }

    /// Unit cube with one flat-shaded quad per side.
    pub fn cuboid() -> Self {
        let mut mesh = Self::default();
        for normal in [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z] {
            let (u, v) = normal.any_orthonormal_pair();
            let centre = normal * 0.5;
            mesh.push_quad(
                [
                    centre - u * 0.5 - v * 0.5,
                    centre + u * 0.5 - v * 0.5,
                    centre + u * 0.5 + v * 0.5,
                    centre - u * 0.5 + v * 0.5,
                ],
                normal,
            );
        }
        mesh
    }

    /// Unit quad in the XY plane facing +Z.
    pub fn plane() -> Self {
        let mut mesh = Self::default();
        mesh.push_quad(
            [
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
                Vec3::new(0.5, 0.5, 0.0),
                Vec3::new(-0.5, 0.5, 0.0),
            ],
            Vec3::Z,
        );
        mesh
    }

    /// Faceted cone of radius 1 and height 1, apex up, centred on the origin.
    pub fn cone(segments: u32) -> Self {
        let segments = segments.max(3);
        let apex = Vec3::new(0.0, 0.5, 0.0);
        let base_centre = Vec3::new(0.0, -0.5, 0.0);
        let rim = |i: u32| {
            let angle = i as f32 / segments as f32 * TAU;
            Vec3::new(angle.sin(), -0.5, angle.cos())
        };

        let mut mesh = Self::default();
        for i in 0..segments {
            let (a, b) = (rim(i), rim(i + 1));
            mesh.push_flat_triangle([a, b, apex]);
            mesh.push_flat_triangle([b, a, base_centre]);
        }
        mesh
    }

    /// Smooth UV sphere of radius 1.
    pub fn sphere(rings: u32, sectors: u32) -> Self {
        let rings = rings.max(2);
        let sectors = sectors.max(3);
        let mut mesh = Self::default();
        for ring in 0..=rings {
            let phi = ring as f32 / rings as f32 * PI;
            for sector in 0..=sectors {
                let theta = sector as f32 / sectors as f32 * TAU;
                let normal = Vec3::new(phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos());
                mesh.push_vertex(normal, normal);
            }
        }
        let stride = sectors + 1;
        for ring in 0..rings {
            for sector in 0..sectors {
                let a = ring * stride + sector;
                let b = a + stride;
                mesh.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }
        mesh
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&position.to_array());
        self.vertices.extend_from_slice(&normal.to_array());
        index
    }

    fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3) {
        let first = self.push_vertex(corners[0], normal);
        for corner in &corners[1..] {
            self.push_vertex(*corner, normal);
        }
        self.indices
            .extend_from_slice(&[first, first + 1, first + 2, first, first + 2, first + 3]);
    }

    fn push_flat_triangle(&mut self, corners: [Vec3; 3]) {
        let normal = (corners[1] - corners[0])
            .cross(corners[2] - corners[0])
            .normalize_or_zero();
        for corner in corners {
            let index = self.push_vertex(corner, normal);
            self.indices.push(index);
        }
    }
}
