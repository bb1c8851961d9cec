//! Reveal animation for a freshly presented chart.
//!
//! Progress runs from 0 to 1 on wall-clock time and the series radii are
//! scaled by an ease-out curve, so a new chart grows out of the centre.

const REVEAL_SECONDS: f64 = 0.8;
const MAX_FRAME_DELTA: f64 = 0.25;

pub fn advance_reveal(progress: f64, last_tick: Option<f64>, now_seconds: f64) -> (f64, Option<f64>) {
    let delta = last_tick
        .map(|last| (now_seconds - last).max(0.0).min(MAX_FRAME_DELTA))
        .unwrap_or(0.0);

    let next = (progress + delta / REVEAL_SECONDS).clamp(0.0, 1.0);
    (next, Some(now_seconds))
}

/// Quartic ease-out of `progress`.
pub fn reveal_scale(progress: f64) -> f64 {
    let t = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(4)
}
