use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::{PI, TAU};
use walkway_kernel::{MAX_SPHERE_SEGMENTS, Shape};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
}

/// Unit-sized geometry; nodes scale it to their shape's extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum MeshKey {
    Cube,
    Plane,
    Sphere { width: u32, height: u32 },
}

impl MeshKey {
    pub fn of(shape: &Shape) -> Self {
        match *shape {
            Shape::Plane { .. } => MeshKey::Plane,
            Shape::Sphere {
                width_segments,
                height_segments,
                ..
            } => MeshKey::Sphere {
                width: width_segments,
                height: height_segments,
            },
            Shape::Cuboid { .. } => MeshKey::Cube,
        }
    }

    pub fn build(self) -> MeshData {
        match self {
            MeshKey::Cube => cube_mesh(),
            MeshKey::Plane => plane_mesh(),
            MeshKey::Sphere { width, height } => sphere_mesh(width, height),
        }
    }
}

/// Scale that stretches the unit mesh for `shape` to its real extent.
pub(crate) fn shape_scale(shape: &Shape) -> Vec3 {
    match *shape {
        Shape::Plane { width, height } => Vec3::new(width, height, 1.0),
        Shape::Sphere { radius, .. } => Vec3::splat(radius),
        Shape::Cuboid { size } => size,
    }
}

/// Triangle list, counter-clockwise seen from outside.
#[derive(Debug, Clone)]
pub(crate) struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

fn v(x: f32, y: f32, z: f32) -> Vertex {
    Vertex {
        position: [x, y, z],
    }
}

/// Unit cube centered on the origin.
fn cube_mesh() -> MeshData {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z
        v(-p, -p,  p), v( p, -p,  p), v( p,  p,  p), v(-p,  p,  p),
        // -Z
        v( p, -p, -p), v(-p, -p, -p), v(-p,  p, -p), v( p,  p, -p),
        // +X
        v( p, -p,  p), v( p, -p, -p), v( p,  p, -p), v( p,  p,  p),
        // -X
        v(-p, -p, -p), v(-p, -p,  p), v(-p,  p,  p), v(-p,  p, -p),
        // +Y
        v(-p,  p,  p), v( p,  p,  p), v( p,  p, -p), v(-p,  p, -p),
        // -Y
        v(-p, -p, -p), v( p, -p, -p), v( p, -p,  p), v(-p, -p,  p),
    ];
    let indices = (0..6u16)
        .flat_map(|face| {
            let b = face * 4;
            [b, b + 1, b + 2, b + 2, b + 3, b]
        })
        .collect();
    MeshData { vertices, indices }
}

/// Unit square in the XY plane, facing +Z.
fn plane_mesh() -> MeshData {
    let p = 0.5_f32;
    MeshData {
        vertices: vec![v(-p, -p, 0.0), v(p, -p, 0.0), v(p, p, 0.0), v(-p, p, 0.0)],
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

/// Unit UV sphere. Rows run pole to pole; the pole rows emit one triangle
/// per segment instead of a degenerate quad.
fn sphere_mesh(width: u32, height: u32) -> MeshData {
    let width = width.clamp(3, MAX_SPHERE_SEGMENTS);
    let height = height.clamp(2, MAX_SPHERE_SEGMENTS);
    let mut vertices = Vec::with_capacity(((width + 1) * (height + 1)) as usize);
    for iy in 0..=height {
        let theta = iy as f32 / height as f32 * PI;
        for ix in 0..=width {
            let phi = ix as f32 / width as f32 * TAU;
            vertices.push(v(
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            ));
        }
    }

    let row = width + 1;
    let at = |ix: u32, iy: u32| (iy * row + ix) as u16;
    let mut indices = Vec::new();
    for iy in 0..height {
        for ix in 0..width {
            let a = at(ix + 1, iy);
            let b = at(ix, iy);
            let c = at(ix, iy + 1);
            let d = at(ix + 1, iy + 1);
            if iy != 0 {
                indices.extend([a, b, d]);
            }
            if iy != height - 1 {
                indices.extend([b, c, d]);
            }
        }
    }
    MeshData { vertices, indices }
}
