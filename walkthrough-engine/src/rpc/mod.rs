//! Host bridge: JSON messages between the viewer and the embedding application.
//!
//! The viewer runs inside a sandboxed webview or iframe. Every message is a
//! JSON object discriminated by a `type` field.
//!
//! ```text
//! Host (parent window / webview)  <──postMessage──>  Viewer (wasm)
//!        │                                              │
//!        ├─ init / set_view_mode ─────────────────────> │
//!        │                                              ├─ HostCommandEvent
//!        │ <─── fixed_click / selection / log / error ──┤
//!        │ <──────── scene_ready / view_mode_changed ───┤
//! ```
//!
//! Native builds have no host page. `HostRouter` stands in for it and its
//! replies are looped back into the inbound queue, so desktop runs exercise
//! the same round trip (a click on an entry hotspot enters the interior).
//!
//! ## Outbound
//!
//! - `fixed_click {name, center, size}`: a hotspot volume was hit. `size` is
//!   the full box size.
//! - `selection {meshName, center, size}`: a scene mesh was picked.
//! - `log {message}` / `error {message}`: diagnostics.
//! - `scene_ready {mode}` / `view_mode_changed {mode}`: lifecycle.
//!
//! ## Inbound
//!
//! - `init {modelUrl, interiorUrl, propertyName}`
//! - `set_view_mode {mode}` with `mode` one of `exterior`, `interior`.
//!
//! Payloads that fail to parse are logged and dropped.

/// Native stand-in for the host application.
pub mod host_router;

/// Wire types and codec.
pub mod protocol;

/// Bevy plugin: inbound queue, outbound flush and platform transport.
pub mod web_rpc;
