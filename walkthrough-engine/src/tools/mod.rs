//! Pointer interaction with the scene.
//!
//! A press is turned into a world-space ray from the viewer camera and
//! resolved in two tiers:
//!
//! ```text
//! press ──> ray ──> hotspot tier (markers, fixed volumes) ── hit ──> navigate / fixed_click
//!                         │
//!                        miss
//!                         └──> mesh tier (AABB early-out, triangles) ── hit ──> selection
//! ```
//!
//! A hotspot hit always wins over a mesh, even a nearer one. Mesh hits
//! move the single selection highlight; misses leave it where it was.

/// Hotspot volumes, selectable geometry and the two-tier pick.
pub mod pipeline;

/// Bevy system reading mouse and touch presses.
pub mod pointer;

/// Ray intersection primitives.
pub mod ray;
