use sound_dna_core::{RadarView, RecommendationResponse};

/// What became of a finished request.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Presented,
    /// A newer request was submitted meanwhile; the response was dropped.
    Stale,
    Failed(String),
}

/// Page state shared between the key handler, the fetch task and the renderer.
#[derive(Debug, Default)]
pub struct Dashboard {
    pub input: String,
    pub status: String,
    pub view: RadarView,
    pub response: Option<RecommendationResponse>,
    pub song: Option<String>,
    pub selected: usize,
    pub reveal: f64,
    pub last_tick: Option<f64>,
    generation: u64,
    pending_song: Option<String>,
}

impl Dashboard {
    /// Starts a new request for the typed song and returns its generation.
    ///
    /// Empty input is sent as-is; the backend answers it with an error.
    pub fn submit(&mut self) -> (u64, String) {
        self.generation += 1;
        let song = self.input.trim().to_string();
        self.pending_song = Some(song.clone());
        self.status = format!("Finding matches for {song:?}...");
        (self.generation, song)
    }

    pub fn finish(
        &mut self,
        generation: u64,
        result: Result<RecommendationResponse, String>,
    ) -> Outcome {
        if generation != self.generation {
            return Outcome::Stale;
        }

        let response = match result {
            Ok(response) => response,
            Err(message) => {
                self.status = format!("Error: {message}");
                return Outcome::Failed(message);
            }
        };

        match self.view.present(&response) {
            Ok(instance) => {
                self.status = format!(
                    "Loaded {} matches across {} features",
                    response.recommendations.len(),
                    instance.chart.labels().len()
                );
                self.song = self.pending_song.take();
                self.response = Some(response);
                self.selected = 0;
                self.reveal = 0.0;
                self.last_tick = None;
                Outcome::Presented
            }
            Err(e) => {
                let message = e.to_string();
                self.status = format!("Error: {message}");
                Outcome::Failed(message)
            }
        }
    }

    pub fn recommendation_count(&self) -> usize {
        self.response
            .as_ref()
            .map_or(0, |response| response.recommendations.len())
    }

    pub fn select_next(&mut self) {
        let count = self.recommendation_count();
        if count > 0 {
            self.selected = (self.selected + 1) % count;
        }
    }

    pub fn select_previous(&mut self) {
        let count = self.recommendation_count();
        if count > 0 {
            self.selected = if self.selected == 0 {
                count - 1
            } else {
                self.selected - 1
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> Result<RecommendationResponse, String> {
        RecommendationResponse::from_json(json.as_bytes()).map_err(|e| e.to_string())
    }

    const FIRST: &str = r#"{"input_song":{"tempo":0.8},"recommendations":[{"tempo":0.7}]}"#;
    const SECOND: &str =
        r#"{"input_song":{"energy":0.2},"recommendations":[{"energy":0.3},{"energy":0.1}]}"#;

    #[test]
    fn only_the_latest_request_is_presented() {
        let mut dashboard = Dashboard::default();
        dashboard.input = "first".to_string();
        let (first, _) = dashboard.submit();
        dashboard.input = "second".to_string();
        let (second, song) = dashboard.submit();
        assert_eq!(song, "second");

        assert_eq!(dashboard.finish(second, response(SECOND)), Outcome::Presented);
        assert_eq!(dashboard.finish(first, response(FIRST)), Outcome::Stale);

        assert_eq!(dashboard.view.live_instances(), 1);
        assert_eq!(dashboard.song.as_deref(), Some("second"));
        assert_eq!(dashboard.recommendation_count(), 2);
    }

    #[test]
    fn failure_keeps_the_previous_chart() {
        let mut dashboard = Dashboard::default();
        let (generation, _) = dashboard.submit();
        dashboard.finish(generation, response(FIRST));

        let (generation, _) = dashboard.submit();
        let outcome = dashboard.finish(generation, Err("Song not found".to_string()));

        assert_eq!(outcome, Outcome::Failed("Song not found".to_string()));
        assert_eq!(dashboard.status, "Error: Song not found");
        assert_eq!(dashboard.view.live_instances(), 1);
    }

    #[test]
    fn presenting_restarts_the_reveal() {
        let mut dashboard = Dashboard {
            reveal: 1.0,
            last_tick: Some(3.0),
            ..Dashboard::default()
        };
        let (generation, _) = dashboard.submit();
        dashboard.finish(generation, response(FIRST));

        assert!(dashboard.reveal.abs() < f64::EPSILON);
        assert_eq!(dashboard.last_tick, None);
    }

    #[test]
    fn selection_wraps() {
        let mut dashboard = Dashboard::default();
        dashboard.select_next();
        assert_eq!(dashboard.selected, 0);

        let (generation, _) = dashboard.submit();
        dashboard.finish(generation, response(SECOND));
        dashboard.select_previous();
        assert_eq!(dashboard.selected, 1);
        dashboard.select_next();
        assert_eq!(dashboard.selected, 0);
    }
}
