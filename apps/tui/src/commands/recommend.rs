use std::fmt::Write as _;

use color_eyre::Result;
use serde::Serialize;
use sound_dna_core::{RadarChart, Recommendation, RecommendRequest, RecommendationResponse};

use crate::app::actions::AppActions;

#[derive(Serialize)]
struct JsonReport<'a> {
    song_name: &'a str,
    chart: &'a RadarChart,
    recommendations: &'a [Recommendation],
}

/// Fetches recommendations for one song and prints the comparison.
pub async fn recommend(actions: &AppActions, request: &RecommendRequest, json: bool) -> Result<()> {
    let response = actions.recommend(request).await?;
    let chart = RadarChart::from_response(&response)?;

    if json {
        let report = JsonReport {
            song_name: &request.song_name,
            chart: &chart,
            recommendations: &response.recommendations,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&request.song_name, &response, &chart));
    }
    Ok(())
}

/// Plain-text rendering of a chart and its recommendation list.
pub fn format_report(song: &str, response: &RecommendationResponse, chart: &RadarChart) -> String {
    let mut out = String::new();
    let name_width = chart
        .labels()
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max("feature".len());

    let _ = writeln!(out, "Sound DNA for {song:?}");
    let _ = writeln!(out);

    let _ = write!(out, "{:<name_width$}", "feature");
    for dataset in chart.datasets() {
        let _ = write!(out, "  {:>13}", dataset.label);
    }
    let _ = writeln!(out);

    for (index, label) in chart.labels().iter().enumerate() {
        let _ = write!(out, "{label:<name_width$}");
        for dataset in chart.datasets() {
            match dataset.data.get(index).copied().flatten() {
                Some(value) => {
                    let _ = write!(out, "  {value:>13.3}");
                }
                None => {
                    let _ = write!(out, "  {:>13}", "-");
                }
            }
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Recommendations:");
    for (index, recommendation) in response.recommendations.iter().enumerate() {
        let _ = write!(
            out,
            "{:>3}. {}",
            index + 1,
            recommendation.track_name().unwrap_or("Unknown")
        );
        if let Some(artists) = recommendation.artists() {
            let _ = write!(out, " - {artists}");
        }
        if let Some(year) = recommendation.year() {
            let _ = write!(out, " ({year})");
        }
        if let Some(score) = recommendation.match_score() {
            let _ = write!(out, " [{score:.0}% match]");
        }
        let _ = writeln!(out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_both_series_and_matches() -> Result<(), Box<dyn std::error::Error>> {
        let response = RecommendationResponse::from_json(
            br#"{"input_song":{"tempo":0.8,"energy":0.6},
                "recommendations":[
                    {"track_name":"Fix You","artists":["Coldplay"],"year":2005,"match_score":93,"tempo":0.75},
                    {"name":"Clocks","tempo":0.7,"energy":0.7}
                ]}"#,
        )?;
        let chart = RadarChart::from_response(&response)?;

        let report = format_report("Yellow", &response, &chart);

        assert!(report.contains("Selected Song"));
        assert!(report.contains("Top Match"));
        assert!(report.contains("tempo            0.800          0.750"));
        assert!(report.contains("energy           0.600              -"));
        assert!(report.contains("  1. Fix You - Coldplay (2005) [93% match]"));
        assert!(report.contains("  2. Clocks\n"));
        Ok(())
    }
}
