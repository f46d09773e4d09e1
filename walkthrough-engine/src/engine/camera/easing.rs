/// Symmetric quadratic ease-in-out over normalised time.
///
/// Zero velocity at both ends; input outside [0, 1] is clamped.
pub fn ease_in_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}
