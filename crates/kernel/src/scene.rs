use crate::raycast::{self, Hit, Raycaster};
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use walkway_common::{ObjectId, Transform};

/// Most segments per sphere axis; keeps every tessellated vertex addressable
/// by a 16-bit index.
pub const MAX_SPHERE_SEGMENTS: u32 = 255;

/// Errors from scene construction.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("node '{name}' has an invalid shape: {reason}")]
    InvalidShape { name: String, reason: String },
}

/// Analytic geometry attached to a node, expressed in the node's local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Rectangle in the local XY plane, centered on the origin, facing +Z.
    Plane { width: f32, height: f32 },
    /// Sphere centered on the origin. Segment counts only affect tessellation;
    /// ray casts see the analytic surface, which lies slightly outside the
    /// drawn facets.
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    /// Axis-aligned box centered on the origin.
    Cuboid { size: Vec3 },
}

impl Shape {
    fn validate(&self) -> Result<(), String> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        match *self {
            Shape::Plane { width, height } => {
                if !positive(width) || !positive(height) {
                    return Err(format!("plane extent {width} x {height} must be positive"));
                }
            }
            Shape::Sphere {
                radius,
                width_segments,
                height_segments,
            } => {
                if !positive(radius) {
                    return Err(format!("sphere radius {radius} must be positive"));
                }
                if width_segments < 3 || height_segments < 2 {
                    return Err(format!(
                        "sphere needs at least 3x2 segments, got {width_segments}x{height_segments}"
                    ));
                }
                if width_segments > MAX_SPHERE_SEGMENTS || height_segments > MAX_SPHERE_SEGMENTS {
                    return Err(format!(
                        "sphere allows at most {MAX_SPHERE_SEGMENTS} segments per axis, \
                         got {width_segments}x{height_segments}"
                    ));
                }
            }
            Shape::Cuboid { size } => {
                if !positive(size.x) || !positive(size.y) || !positive(size.z) {
                    return Err(format!("box size {size} must be positive on every axis"));
                }
            }
        }
        Ok(())
    }
}

/// Which faces of a surface are visible (and therefore hittable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Side {
    /// Faces whose outward normal points toward the viewer.
    #[default]
    Front,
    /// Faces whose outward normal points away, e.g. the inside of a dome.
    Back,
    Double,
}

impl Side {
    /// Whether a surface with outward normal `normal` is visible along `direction`.
    pub fn accepts(self, normal: Vec3, direction: Vec3) -> bool {
        let facing = normal.dot(direction);
        match self {
            Side::Front => facing < 0.0,
            Side::Back => facing > 0.0,
            Side::Double => facing != 0.0,
        }
    }
}

/// Lambert surface: diffuse color lit by ambient light, plus self-emission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Vec3,
    pub emissive: Vec3,
    pub opacity: f32,
    pub transparent: bool,
    pub side: Side,
}

impl Default for Material {
    fn default() -> Self {
        Self::lambert(Vec3::ONE)
    }
}

impl Material {
    pub fn lambert(color: Vec3) -> Self {
        Self {
            color,
            emissive: Vec3::ZERO,
            opacity: 1.0,
            transparent: false,
            side: Side::Front,
        }
    }

    pub fn with_emissive(mut self, emissive: Vec3) -> Self {
        self.emissive = emissive;
        self
    }

    /// Sets the opacity and marks the material for the blended pass.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self.transparent = true;
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }
}

/// Geometry plus the material it is drawn and hit-tested with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub shape: Shape,
    pub material: Material,
}

/// A node in the scene graph. Nodes without a mesh are pure groups.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: ObjectId,
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<Mesh>,
    /// Radians of Y rotation per elapsed second, driven by `Scene::advance`.
    pub spin_rate: Option<f32>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            transform: Transform::default(),
            mesh: None,
            spin_rate: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, shape: Shape, material: Material) -> Self {
        Self {
            mesh: Some(Mesh { shape, material }),
            ..Self::group(name)
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    pub fn with_spin(mut self, rate: f32) -> Self {
        self.spin_rate = Some(rate);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    fn validate(&self) -> Result<(), SceneError> {
        if let Some(mesh) = &self.mesh {
            mesh.shape
                .validate()
                .map_err(|reason| SceneError::InvalidShape {
                    name: self.name.clone(),
                    reason,
                })?;
        }
        self.children.iter().try_for_each(SceneNode::validate)
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::count).sum::<usize>()
    }

    fn animate(&mut self, elapsed: f32) {
        if let Some(rate) = self.spin_rate {
            self.transform.rotation = Quat::from_rotation_y(elapsed * rate);
        }
        for child in &mut self.children {
            child.animate(elapsed);
        }
    }

    fn visit<'a>(&'a self, parent: Mat4, f: &mut impl FnMut(&'a SceneNode, Mat4)) {
        let world = parent * self.transform.matrix();
        f(self, world);
        for child in &self.children {
            child.visit(world, f);
        }
    }
}

/// Distance fog between `near` and `far`, eased with smoothstep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub color: Vec3,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    /// Blend weight toward the fog color at view depth `depth`.
    pub fn factor(&self, depth: f32) -> f32 {
        if self.far <= self.near {
            return if depth >= self.far { 1.0 } else { 0.0 };
        }
        let t = ((depth - self.near) / (self.far - self.near)).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl AmbientLight {
    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }
}

/// The scene graph: root nodes plus global fog and lighting.
#[derive(Debug, Clone)]
pub struct Scene {
    roots: Vec<SceneNode>,
    pub fog: Fog,
    pub ambient: AmbientLight,
    elapsed: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            fog: Fog {
                color: Vec3::ZERO,
                near: 5.0,
                far: 25.0,
            },
            ambient: AmbientLight {
                color: Vec3::ONE,
                intensity: 0.5,
            },
            elapsed: 0.0,
        }
    }
}

impl Scene {
    /// An empty scene with black fog and half-intensity white ambient light.
    pub fn new() -> Self {
        Self::default()
    }

    /// The fog-shrouded walkway: floor, enclosing dome, spinning cube and a
    /// tall prism at the far end.
    pub fn walkway() -> Result<Self, SceneError> {
        let mut scene = Self::new();

        let floor = Material::lambert(Vec3::ZERO)
            .with_emissive(Vec3::new(1.0, 0.0, 0.0))
            .with_opacity(0.5)
            .with_side(Side::Double);
        scene.add(
            SceneNode::mesh(
                "floor",
                Shape::Plane {
                    width: 10.0,
                    height: 50.0,
                },
                floor,
            )
            .with_rotation(Quat::from_rotation_x(FRAC_PI_2))
            .with_position(Vec3::new(0.0, -2.0, 0.0)),
        )?;

        let dome = Material::lambert(Vec3::new(0.0, 0.0, 1.0))
            .with_opacity(0.5)
            .with_side(Side::Back);
        scene.add(SceneNode::mesh(
            "dome",
            Shape::Sphere {
                radius: 20.0,
                width_segments: 20,
                height_segments: 20,
            },
            dome,
        ))?;

        let solid = Material::lambert(Vec3::ONE);
        scene.add(
            SceneNode::mesh(
                "cube",
                Shape::Cuboid {
                    size: Vec3::ONE,
                },
                solid,
            )
            .with_position(Vec3::new(0.0, 0.0, 3.0))
            .with_spin(1.0),
        )?;
        scene.add(
            SceneNode::mesh(
                "prism",
                Shape::Cuboid {
                    size: Vec3::new(1.0, 3.0, 1.0),
                },
                solid,
            )
            .with_position(Vec3::new(0.0, 0.0, -10.0)),
        )?;

        tracing::debug!(objects = scene.object_count(), "walkway scene built");
        Ok(scene)
    }

    /// Add a root node (and its subtree). Rejects degenerate shapes.
    pub fn add(&mut self, node: SceneNode) -> Result<ObjectId, SceneError> {
        node.validate()?;
        let id = node.id;
        self.roots.push(node);
        Ok(id)
    }

    /// Total node count, including nested children.
    pub fn object_count(&self) -> usize {
        self.roots.iter().map(SceneNode::count).sum()
    }

    /// Seconds of session time last applied by `advance`.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Apply clock-driven animation for the given session time.
    pub fn advance(&mut self, elapsed: f32) {
        self.elapsed = elapsed;
        for node in &mut self.roots {
            node.animate(elapsed);
        }
    }

    /// Depth-first walk over every node with its composed world matrix.
    pub fn visit<'a>(&'a self, mut f: impl FnMut(&'a SceneNode, Mat4)) {
        for node in &self.roots {
            node.visit(Mat4::IDENTITY, &mut f);
        }
    }

    pub fn find(&self, id: ObjectId) -> Option<&SceneNode> {
        let mut found = None;
        self.visit(|node, _| {
            if found.is_none() && node.id == id {
                found = Some(node);
            }
        });
        found
    }

    pub fn find_by_name(&self, name: &str) -> Option<&SceneNode> {
        let mut found = None;
        self.visit(|node, _| {
            if found.is_none() && node.name == name {
                found = Some(node);
            }
        });
        found
    }

    /// Every hit along the caster's ray within `[near, far]`, nearest first.
    pub fn intersect(&self, caster: &Raycaster) -> Vec<Hit> {
        let mut hits = Vec::new();
        self.visit(|node, world| {
            if let Some(mesh) = &node.mesh {
                raycast::intersect_mesh(caster, node, mesh, world, &mut hits);
            }
        });
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// The closest hit, if any.
    pub fn nearest(&self, caster: &Raycaster) -> Option<Hit> {
        self.intersect(caster).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walkway_has_four_objects() {
        let scene = Scene::walkway().unwrap();
        assert_eq!(scene.object_count(), 4);
        for name in ["floor", "dome", "cube", "prism"] {
            assert!(scene.find_by_name(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn walkway_materials() {
        let scene = Scene::walkway().unwrap();
        let floor = scene.find_by_name("floor").unwrap().mesh.unwrap();
        assert_eq!(floor.material.side, Side::Double);
        assert!(floor.material.transparent);
        assert_eq!(floor.material.emissive, Vec3::new(1.0, 0.0, 0.0));

        let dome = scene.find_by_name("dome").unwrap().mesh.unwrap();
        assert_eq!(dome.material.side, Side::Back);

        let cube = scene.find_by_name("cube").unwrap().mesh.unwrap();
        assert!(!cube.material.transparent);
    }

    #[test]
    fn floor_is_horizontal_below_the_player() {
        let scene = Scene::walkway().unwrap();
        let floor = scene.find_by_name("floor").unwrap();
        let normal = floor.transform.rotation * Vec3::Z;
        assert!(normal.y.abs() > 0.999);
        assert_eq!(floor.transform.position.y, -2.0);
    }

    #[test]
    fn advance_spins_only_animated_nodes() {
        let mut scene = Scene::walkway().unwrap();
        scene.advance(1.5);
        assert_eq!(scene.elapsed(), 1.5);

        let cube = scene.find_by_name("cube").unwrap();
        let (axis, angle) = cube.transform.rotation.to_axis_angle();
        assert!((angle - 1.5).abs() < 1e-5);
        assert!((axis - Vec3::Y).length() < 1e-5);

        let prism = scene.find_by_name("prism").unwrap();
        assert_eq!(prism.transform.rotation, Quat::IDENTITY);
    }

    #[test]
    fn add_rejects_degenerate_shapes() {
        let mut scene = Scene::new();
        let bad = SceneNode::mesh(
            "flat",
            Shape::Cuboid {
                size: Vec3::new(1.0, 0.0, 1.0),
            },
            Material::default(),
        );
        let err = scene.add(bad).unwrap_err();
        assert!(err.to_string().contains("flat"));
        assert_eq!(scene.object_count(), 0);
    }

    #[test]
    fn add_bounds_sphere_tessellation() {
        let mut scene = Scene::new();
        let sphere = |segments| {
            SceneNode::mesh(
                "ball",
                Shape::Sphere {
                    radius: 1.0,
                    width_segments: segments,
                    height_segments: segments,
                },
                Material::default(),
            )
        };
        assert!(scene.add(sphere(MAX_SPHERE_SEGMENTS)).is_ok());
        let err = scene.add(sphere(MAX_SPHERE_SEGMENTS + 1)).unwrap_err();
        assert!(err.to_string().contains("at most 255"));
        assert_eq!(scene.object_count(), 1);
    }

    #[test]
    fn add_validates_children() {
        let mut scene = Scene::new();
        let parent = SceneNode::group("parent").with_child(SceneNode::mesh(
            "ball",
            Shape::Sphere {
                radius: 1.0,
                width_segments: 2,
                height_segments: 2,
            },
            Material::default(),
        ));
        assert!(matches!(
            scene.add(parent),
            Err(SceneError::InvalidShape { .. })
        ));
    }

    #[test]
    fn visit_composes_parent_transforms() {
        let mut scene = Scene::new();
        let child = SceneNode::group("child").with_position(Vec3::new(0.0, 1.0, 0.0));
        let child_id = child.id;
        scene
            .add(
                SceneNode::group("parent")
                    .with_position(Vec3::new(2.0, 0.0, 0.0))
                    .with_child(child),
            )
            .unwrap();

        let mut child_origin = None;
        scene.visit(|node, world| {
            if node.id == child_id {
                child_origin = Some(world.transform_point3(Vec3::ZERO));
            }
        });
        let origin = child_origin.unwrap();
        assert!((origin - Vec3::new(2.0, 1.0, 0.0)).length() < 1e-6);
        assert!(scene.find(child_id).is_some());
        assert_eq!(scene.object_count(), 2);
    }

    #[test]
    fn fog_factor_ramps_between_near_and_far() {
        let fog = Scene::new().fog;
        assert_eq!(fog.factor(0.0), 0.0);
        assert_eq!(fog.factor(5.0), 0.0);
        assert!((fog.factor(15.0) - 0.5).abs() < 1e-6);
        assert!(fog.factor(10.0) < 0.25);
        assert_eq!(fog.factor(40.0), 1.0);
    }

    #[test]
    fn side_acceptance() {
        let toward = Vec3::NEG_Z;
        let normal = Vec3::Z;
        assert!(Side::Front.accepts(normal, toward));
        assert!(!Side::Back.accepts(normal, toward));
        assert!(Side::Double.accepts(normal, toward));
        assert!(Side::Back.accepts(normal, -toward));
    }
}
