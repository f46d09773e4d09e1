use bevy::prelude::*;
use bevy::render::mesh::VertexAttributeValues;
use constants::coordinate_system::SceneFrame;

/// Axis-aligned bounds accumulated point by point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for SceneBounds {
    fn default() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }
}

impl SceneBounds {
    pub fn include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Frame that recentres and rescales these bounds. Empty bounds map to identity.
    pub fn frame(&self) -> SceneFrame {
        if self.is_empty() {
            SceneFrame::IDENTITY
        } else {
            SceneFrame::from_bounds(self.min, self.max)
        }
    }

    /// Add every vertex of `mesh` transformed by `to_root`.
    pub fn include_mesh(&mut self, mesh: &Mesh, to_root: &Mat4) {
        if let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        {
            for position in positions {
                self.include(to_root.transform_point3(Vec3::from_array(*position)));
            }
        }
    }
}

/// Transform of `entity` relative to `root`, composed from local transforms up the hierarchy.
/// `None` if `root` is not an ancestor.
pub fn root_relative_matrix(
    entity: Entity,
    root: Entity,
    hierarchy: &Query<(&Transform, Option<&ChildOf>)>,
) -> Option<Mat4> {
    let mut matrix = Mat4::IDENTITY;
    let mut current = entity;
    while current != root {
        let (transform, parent) = hierarchy.get(current).ok()?;
        matrix = transform.compute_matrix() * matrix;
        current = parent?.parent();
    }
    Some(matrix)
}

/// Root transform that applies `frame` to a scene whose raw geometry is in root space.
pub fn normalising_transform(frame: &SceneFrame) -> Transform {
    Transform::from_translation(-frame.center * frame.scale).with_scale(Vec3::splat(frame.scale))
}
