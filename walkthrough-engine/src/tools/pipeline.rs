use std::sync::Arc;

use bevy::math::Ray3d;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology, VertexAttributeValues};

use super::ray::{ray_aabb_entry_t, ray_aabb_hit_t, ray_sphere_entry_t, ray_triangle_hit_t};
use crate::engine::camera::pose::{CameraPose, Perspective, screen_to_ndc};

/// Name reported for meshes that carry no name of their own.
pub const UNNAMED_MESH: &str = "Unnamed Mesh";

/// Invisible axis-aligned hotspot box in render space.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotVolume {
    pub name: String,
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl HotspotVolume {
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    pub fn size(&self) -> Vec3 {
        self.half_extents * 2.0
    }
}

/// Clickable sphere drawn at a navigation node.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationMarker {
    pub node: String,
    pub center: Vec3,
    pub radius: f32,
}

/// Triangle soup extracted from a mesh asset, in mesh-local space.
#[derive(Debug, Clone)]
pub struct MeshGeometry {
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    local_min: Vec3,
    local_max: Vec3,
}

impl MeshGeometry {
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Option<Self> {
        let (local_min, local_max) = positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );
        let in_range = triangles
            .iter()
            .all(|tri| tri.iter().all(|i| (*i as usize) < positions.len()));
        if positions.is_empty() || triangles.is_empty() || !in_range {
            return None;
        }
        Some(Self {
            positions,
            triangles,
            local_min,
            local_max,
        })
    }

    /// Triangle-list meshes with `Float32x3` positions; anything else is not pickable.
    pub fn from_mesh(mesh: &Mesh) -> Option<Self> {
        if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
            return None;
        }
        let positions: Vec<Vec3> = match mesh.attribute(Mesh::ATTRIBUTE_POSITION)? {
            VertexAttributeValues::Float32x3(values) => {
                values.iter().map(|p| Vec3::from_array(*p)).collect()
            }
            _ => return None,
        };
        let indices: Vec<u32> = match mesh.indices() {
            Some(Indices::U16(values)) => values.iter().map(|i| *i as u32).collect(),
            Some(Indices::U32(values)) => values.clone(),
            None => (0..positions.len() as u32).collect(),
        };
        let triangles = indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
            .collect();
        Self::new(positions, triangles)
    }

    /// World-space box of the local bounds' eight corners.
    pub fn world_bounds(&self, world: &Mat4) -> (Vec3, Vec3) {
        let (lo, hi) = (self.local_min, self.local_max);
        let corners = [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ];
        corners.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), corner| {
                let p = world.transform_point3(*corner);
                (min.min(p), max.max(p))
            },
        )
    }

    /// Nearest triangle hit along a world ray, as a world-ray parameter.
    fn nearest_hit(&self, origin: Vec3, direction: Vec3, world: &Mat4) -> Option<f32> {
        let inverse = world.inverse();
        let local_origin = inverse.transform_point3(origin);
        let local_direction = inverse.transform_vector3(direction);
        self.triangles
            .iter()
            .filter_map(|[a, b, c]| {
                ray_triangle_hit_t(
                    local_origin,
                    local_direction,
                    self.positions[*a as usize],
                    self.positions[*b as usize],
                    self.positions[*c as usize],
                )
            })
            .min_by(f32::total_cmp)
    }
}

/// Scene mesh eligible for selection. Attached once when the scene is ready.
#[derive(Component, Debug, Clone)]
pub struct SelectableMesh {
    pub name: String,
    pub geometry: Arc<MeshGeometry>,
}

/// A selectable mesh paired with its world transform for one pick.
#[derive(Debug, Clone, Copy)]
pub struct MeshCandidate<'a> {
    pub mesh: &'a SelectableMesh,
    pub world: Mat4,
}

/// Semantic result forwarded to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    FixedHit {
        name: String,
        center: Vec3,
        half_extents: Vec3,
    },
    /// `extents` is the full world-space box size.
    MeshHit {
        mesh_name: String,
        center: Vec3,
        extents: Vec3,
    },
    Log {
        message: String,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    Navigate(String),
    Interaction(InteractionEvent),
    Nothing,
}

/// The one translucent box around the last selected mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionHighlight {
    pub center: Vec3,
    pub size: Vec3,
}

enum HotspotHit<'a> {
    Volume(&'a HotspotVolume),
    Marker(&'a NavigationMarker),
}

/// Two-tier pick: hotspots and markers first, then scene meshes.
#[derive(Debug, Default)]
pub struct InteractionPipeline {
    hotspots: Vec<HotspotVolume>,
    markers: Vec<NavigationMarker>,
    mesh_selection: bool,
    highlight: Option<SelectionHighlight>,
}

impl InteractionPipeline {
    pub fn new(mesh_selection: bool) -> Self {
        Self {
            mesh_selection,
            ..Default::default()
        }
    }

    pub fn populate(&mut self, hotspots: Vec<HotspotVolume>, markers: Vec<NavigationMarker>) {
        self.hotspots = hotspots;
        self.markers = markers;
        self.highlight = None;
    }

    pub fn hotspots(&self) -> &[HotspotVolume] {
        &self.hotspots
    }

    pub fn markers(&self) -> &[NavigationMarker] {
        &self.markers
    }

    pub fn highlight(&self) -> Option<&SelectionHighlight> {
        self.highlight.as_ref()
    }

    /// Resolve a press at window pixel `screen` for a viewport of `viewport` pixels.
    pub fn handle_pointer_event(
        &mut self,
        screen: Vec2,
        viewport: Vec2,
        camera: &CameraPose,
        projection: &Perspective,
        meshes: &[MeshCandidate<'_>],
    ) -> PointerOutcome {
        let Some(ndc) = screen_to_ndc(screen, viewport) else {
            return PointerOutcome::Nothing;
        };
        match camera.ray_through_ndc(ndc, projection, viewport.x / viewport.y) {
            Some(ray) => self.pick(ray, meshes),
            None => PointerOutcome::Nothing,
        }
    }

    pub fn pick(&mut self, ray: Ray3d, meshes: &[MeshCandidate<'_>]) -> PointerOutcome {
        let origin = ray.origin;
        let direction = ray.direction.as_vec3();

        if let Some(hit) = self.nearest_hotspot(origin, direction) {
            return match hit {
                HotspotHit::Marker(marker) => PointerOutcome::Navigate(marker.node.clone()),
                HotspotHit::Volume(volume) => PointerOutcome::Interaction(InteractionEvent::FixedHit {
                    name: volume.name.clone(),
                    center: volume.center,
                    half_extents: volume.half_extents,
                }),
            };
        }

        if !self.mesh_selection {
            return PointerOutcome::Nothing;
        }

        let mut nearest: Option<(f32, &SelectableMesh, (Vec3, Vec3))> = None;
        for candidate in meshes {
            let (min, max) = candidate.mesh.geometry.world_bounds(&candidate.world);
            let Some(box_t) = ray_aabb_hit_t(origin, direction, min, max) else {
                continue;
            };
            if nearest.as_ref().is_some_and(|(best, ..)| box_t > *best) {
                continue;
            }
            let hit = candidate
                .mesh
                .geometry
                .nearest_hit(origin, direction, &candidate.world);
            if let Some(t) = hit {
                if nearest.as_ref().is_none_or(|(best, ..)| t < *best) {
                    nearest = Some((t, candidate.mesh, (min, max)));
                }
            }
        }

        match nearest {
            Some((_, mesh, (min, max))) => {
                let highlight = SelectionHighlight {
                    center: (min + max) * 0.5,
                    size: max - min,
                };
                self.highlight = Some(highlight);
                PointerOutcome::Interaction(InteractionEvent::MeshHit {
                    mesh_name: mesh.name.clone(),
                    center: highlight.center,
                    extents: highlight.size,
                })
            }
            None => PointerOutcome::Nothing,
        }
    }

    fn nearest_hotspot(&self, origin: Vec3, direction: Vec3) -> Option<HotspotHit<'_>> {
        let volumes = self.hotspots.iter().filter_map(|volume| {
            ray_aabb_entry_t(origin, direction, volume.min(), volume.max())
                .map(|t| (t, HotspotHit::Volume(volume)))
        });
        let markers = self.markers.iter().filter_map(|marker| {
            ray_sphere_entry_t(origin, direction, marker.center, marker.radius)
                .map(|t| (t, HotspotHit::Marker(marker)))
        });

        let mut best: Option<(f32, HotspotHit<'_>)> = None;
        for (t, hit) in volumes.chain(markers) {
            if best.as_ref().is_none_or(|(best_t, _)| t < *best_t) {
                best = Some((t, hit));
            }
        }
        best.map(|(_, hit)| hit)
    }
}
