//! Radar chart model comparing the input song with its top match.
//!
//! The model is renderer-agnostic: it carries labels, series values, styles
//! and the radial scale, and computes polygon vertices in a unit square
//! (`[-1, 1]` on both axes, y pointing up). Renderers only scale and draw.

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::Serialize;

use crate::error::ViewError;
use crate::model::RecommendationResponse;

pub const SELECTED_SONG_LABEL: &str = "Selected Song";
pub const TOP_MATCH_LABEL: &str = "Top Match";

/// Grid line colour (`#444`).
pub const GRID_COLOR: Rgba = Rgba::rgb(0x44, 0x44, 0x44);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 1.0 }
    }

    pub const fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }

    pub fn to_css(self) -> String {
        if (self.alpha - 1.0).abs() < f64::EPSILON {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.alpha)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStyle {
    pub fill: Rgba,
    pub border: Rgba,
}

impl SeriesStyle {
    pub const SELECTED_SONG: Self = Self {
        fill: Rgba::rgb(29, 185, 84).with_alpha(0.2),
        border: Rgba::rgb(0x1D, 0xB9, 0x54),
    };

    pub const TOP_MATCH: Self = Self {
        fill: Rgba::rgb(255, 255, 255).with_alpha(0.2),
        border: Rgba::rgb(0xFF, 0xFF, 0xFF),
    };
}

/// Scale shared by every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadialScale {
    pub min: f64,
    pub max: f64,
    pub show_ticks: bool,
}

impl RadialScale {
    /// Normalized audio features live in `[0, 1]`.
    pub const UNIT: Self = Self {
        min: 0.0,
        max: 1.0,
        show_ticks: false,
    };

    /// Maps a value to a radius in `[0, 1]`, clamping out-of-range values.
    pub fn normalize(self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarDataset {
    pub label: String,
    /// One value per chart label; `None` where the record lacks that feature.
    pub data: Vec<Option<f64>>,
    pub style: SeriesStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarChart {
    labels: Vec<String>,
    datasets: Vec<RadarDataset>,
    scale: RadialScale,
}

impl RadarChart {
    /// Builds the two-series chart: the input song, then the first
    /// recommendation projected onto the input song's feature names.
    pub fn from_response(response: &RecommendationResponse) -> Result<Self, ViewError> {
        let top_match = response.top_match().ok_or(ViewError::NoRecommendations)?;

        let labels = response
            .input_song
            .names()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let selected = RadarDataset {
            label: SELECTED_SONG_LABEL.to_string(),
            data: response.input_song.values().map(Some).collect(),
            style: SeriesStyle::SELECTED_SONG,
        };

        let projected = labels
            .iter()
            .map(|label| {
                let value = top_match.feature(label);
                if value.is_none() {
                    log::warn!("top match has no numeric value for feature {label:?}");
                }
                value
            })
            .collect();

        let top = RadarDataset {
            label: TOP_MATCH_LABEL.to_string(),
            data: projected,
            style: SeriesStyle::TOP_MATCH,
        };

        Ok(Self {
            labels,
            datasets: vec![selected, top],
            scale: RadialScale::UNIT,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn datasets(&self) -> &[RadarDataset] {
        &self.datasets
    }

    pub const fn scale(&self) -> RadialScale {
        self.scale
    }

    /// Angle of axis `index`: the first axis points up, the rest follow clockwise.
    pub fn axis_angle(&self, index: usize) -> f64 {
        axis_angle(index, self.labels.len())
    }

    /// Outer end of each axis in unit space.
    pub fn spokes(&self) -> Vec<(f64, f64)> {
        (0..self.labels.len())
            .map(|index| polar(self.axis_angle(index), 1.0))
            .collect()
    }

    /// Polygon of one dataset in unit space. Missing values sit at the centre.
    pub fn vertices(&self, dataset: &RadarDataset) -> Vec<(f64, f64)> {
        dataset
            .data
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let radius = value.map_or(0.0, |value| self.scale.normalize(value));
                polar(self.axis_angle(index), radius)
            })
            .collect()
    }

    /// Grid polygons at `rings` evenly spaced radii, innermost first.
    pub fn grid(&self, rings: usize) -> Vec<Vec<(f64, f64)>> {
        (1..=rings)
            .map(|ring| {
                #[allow(clippy::cast_precision_loss)]
                let radius = ring as f64 / rings as f64;
                (0..self.labels.len())
                    .map(|index| polar(self.axis_angle(index), radius))
                    .collect()
            })
            .collect()
    }
}

pub fn axis_angle(index: usize, axes: usize) -> f64 {
    if axes == 0 {
        return FRAC_PI_2;
    }
    #[allow(clippy::cast_precision_loss)]
    let step = TAU / axes as f64;
    #[allow(clippy::cast_precision_loss)]
    let angle = FRAC_PI_2 - step * index as f64;
    angle
}

fn polar(angle: f64, radius: f64) -> (f64, f64) {
    (angle.cos() * radius, angle.sin() * radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"{
        "input_song": {"tempo": 0.8, "energy": 0.6},
        "recommendations": [{"tempo": 0.75, "energy": 0.65}]
    }"#;

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(diff < 1e-9, "expected {expected}, got {actual}, diff {diff}");
    }

    fn chart(json: &str) -> Result<RadarChart, ViewError> {
        let response = RecommendationResponse::from_json(json.as_bytes())?;
        RadarChart::from_response(&response)
    }

    #[test]
    fn example_response_builds_two_series() -> Result<(), ViewError> {
        let chart = chart(EXAMPLE)?;

        assert_eq!(chart.labels(), ["tempo", "energy"]);
        assert_eq!(chart.datasets().len(), 2);
        assert_eq!(chart.datasets()[0].label, SELECTED_SONG_LABEL);
        assert_eq!(chart.datasets()[0].data, [Some(0.8), Some(0.6)]);
        assert_eq!(chart.datasets()[1].label, TOP_MATCH_LABEL);
        assert_eq!(chart.datasets()[1].data, [Some(0.75), Some(0.65)]);
        assert_eq!(chart.scale(), RadialScale::UNIT);
        Ok(())
    }

    #[test]
    fn top_match_is_projected_onto_input_labels() -> Result<(), ViewError> {
        let chart = chart(
            r#"{
                "input_song": {"valence": 0.3, "danceability": 0.9, "energy": 0.4},
                "recommendations": [
                    {"track_name": "A", "energy": 0.5, "valence": 0.2, "loudness": 0.7},
                    {"track_name": "B", "energy": 0.1, "valence": 0.1, "danceability": 0.1}
                ]
            }"#,
        )?;

        assert_eq!(chart.labels(), ["valence", "danceability", "energy"]);
        assert_eq!(chart.datasets()[1].data, [Some(0.2), None, Some(0.5)]);
        Ok(())
    }

    #[test]
    fn empty_recommendations_is_an_error() {
        let result = chart(r#"{"input_song":{"tempo":0.8},"recommendations":[]}"#);
        assert!(matches!(result, Err(ViewError::NoRecommendations)));
    }

    #[test]
    fn first_axis_points_up_and_axes_run_clockwise() -> Result<(), ViewError> {
        let chart = chart(
            r#"{"input_song":{"a":1.0,"b":1.0,"c":1.0,"d":1.0},
                "recommendations":[{"a":0.5,"b":0.5,"c":0.5,"d":0.5}]}"#,
        )?;

        let spokes = chart.spokes();
        assert_close(spokes[0].0, 0.0);
        assert_close(spokes[0].1, 1.0);
        assert_close(spokes[1].0, 1.0);
        assert_close(spokes[1].1, 0.0);
        assert_close(spokes[2].1, -1.0);
        assert_close(spokes[3].0, -1.0);

        let top = chart.vertices(&chart.datasets()[1]);
        assert_close(top[1].0, 0.5);
        Ok(())
    }

    #[test]
    fn out_of_range_and_missing_values_are_clamped() {
        let scale = RadialScale::UNIT;
        assert_close(scale.normalize(1.4), 1.0);
        assert_close(scale.normalize(-0.2), 0.0);
        assert_close(scale.normalize(f64::NAN), 0.0);

        let dataset = RadarDataset {
            label: TOP_MATCH_LABEL.to_string(),
            data: vec![None, Some(2.0)],
            style: SeriesStyle::TOP_MATCH,
        };
        let chart = RadarChart {
            labels: vec!["a".to_string(), "b".to_string()],
            datasets: vec![dataset.clone()],
            scale,
        };
        let vertices = chart.vertices(&dataset);
        assert_close(vertices[0].0, 0.0);
        assert_close(vertices[0].1, 0.0);
        assert_close(vertices[1].1, -1.0);
    }

    #[test]
    fn grid_has_requested_ring_count() -> Result<(), ViewError> {
        let chart = chart(EXAMPLE)?;
        let grid = chart.grid(5);
        assert_eq!(grid.len(), 5);
        assert_close(grid[0][0].1, 0.2);
        assert_close(grid[4][0].1, 1.0);
        Ok(())
    }

    #[test]
    fn styles_render_as_css() {
        assert_eq!(SeriesStyle::SELECTED_SONG.border.to_css(), "#1db954");
        assert_eq!(
            SeriesStyle::SELECTED_SONG.fill.to_css(),
            "rgba(29, 185, 84, 0.2)"
        );
        assert_eq!(GRID_COLOR.to_css(), "#444444");
    }
}
