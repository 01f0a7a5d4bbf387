use crate::scene::{Mesh, SceneNode, Shape};
use glam::{Mat4, Vec3};
use walkway_common::ObjectId;

const PARALLEL_EPSILON: f32 = 1e-8;

/// A half-line. `direction` need not be unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A ray plus the distance window hits must fall into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Raycaster {
    pub ray: Ray,
    pub near: f32,
    pub far: f32,
}

impl Raycaster {
    pub fn new(origin: Vec3, direction: Vec3, near: f32, far: f32) -> Self {
        Self {
            ray: Ray::new(origin, direction),
            near,
            far,
        }
    }
}

/// A surface crossing found by a ray query.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub object: ObjectId,
    pub name: String,
    /// World-space distance from the ray origin.
    pub distance: f32,
    pub point: Vec3,
}

/// Test one mesh node, whose local-to-world matrix is `world`, and append
/// any hits inside the caster's window.
pub(crate) fn intersect_mesh(
    caster: &Raycaster,
    node: &SceneNode,
    mesh: &Mesh,
    world: Mat4,
    hits: &mut Vec<Hit>,
) {
    if caster.ray.direction.length_squared() <= PARALLEL_EPSILON {
        return;
    }
    let inverse = world.inverse();
    let local = Ray::new(
        inverse.transform_point3(caster.ray.origin),
        inverse.transform_vector3(caster.ray.direction),
    );

    for (t, normal) in crossings(&mesh.shape, &local).into_iter().flatten() {
        if t < 0.0 || !mesh.material.side.accepts(normal, local.direction) {
            continue;
        }
        let point = world.transform_point3(local.at(t));
        let distance = caster.ray.origin.distance(point);
        if distance < caster.near || distance > caster.far {
            continue;
        }
        tracing::trace!(object = %node.id.short(), distance, "ray hit");
        hits.push(Hit {
            object: node.id,
            name: node.name.clone(),
            distance,
            point,
        });
    }
}

/// Parametric crossings of a local-space ray with a shape, paired with the
/// outward surface normal at each crossing.
fn crossings(shape: &Shape, ray: &Ray) -> [Option<(f32, Vec3)>; 2] {
    match *shape {
        Shape::Plane { width, height } => [plane(width, height, ray), None],
        Shape::Sphere { radius, .. } => sphere(radius, ray),
        Shape::Cuboid { size } => cuboid(size * 0.5, ray),
    }
}

fn plane(width: f32, height: f32, ray: &Ray) -> Option<(f32, Vec3)> {
    if ray.direction.z.abs() <= PARALLEL_EPSILON {
        return None;
    }
    let t = -ray.origin.z / ray.direction.z;
    let p = ray.at(t);
    (p.x.abs() <= width * 0.5 && p.y.abs() <= height * 0.5).then_some((t, Vec3::Z))
}

fn sphere(radius: f32, ray: &Ray) -> [Option<(f32, Vec3)>; 2] {
    let a = ray.direction.length_squared();
    let b = 2.0 * ray.origin.dot(ray.direction);
    let c = ray.origin.length_squared() - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return [None, None];
    }
    let root = disc.sqrt();
    let crossing = |t: f32| Some((t, ray.at(t) / radius));
    [
        crossing((-b - root) / (2.0 * a)),
        crossing((-b + root) / (2.0 * a)),
    ]
}

/// Slab test against the box `[-half, half]`: entry and exit crossings.
fn cuboid(half: Vec3, ray: &Ray) -> [Option<(f32, Vec3)>; 2] {
    let mut enter = (f32::NEG_INFINITY, Vec3::ZERO);
    let mut exit = (f32::INFINITY, Vec3::ZERO);

    for axis in 0..3 {
        let o = ray.origin[axis];
        let d = ray.direction[axis];
        if d.abs() <= PARALLEL_EPSILON {
            if o < -half[axis] || o > half[axis] {
                return [None, None];
            }
            continue;
        }
        let mut unit = Vec3::ZERO;
        unit[axis] = d.signum();
        let t0 = (-half[axis] * d.signum() - o) / d;
        let t1 = (half[axis] * d.signum() - o) / d;
        if t0 > enter.0 {
            enter = (t0, -unit);
        }
        if t1 < exit.0 {
            exit = (t1, unit);
        }
    }

    if enter.0 > exit.0 {
        return [None, None];
    }
    [Some(enter), Some(exit)]
}
