use crate::app::actions::AppActions;
use color_eyre::Result;
use sound_dna_core::{RadarView, RecommendRequest, RecommendationResponse};
use std::time::Instant;

/// Optional filters sent with every recommendation request.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct RequestOptions {
    pub limit: Option<u32>,
    pub year_range: Option<(i32, i32)>,
}

impl RequestOptions {
    pub fn apply(self, request: RecommendRequest) -> RecommendRequest {
        let request = match self.limit {
            Some(limit) => request.with_limit(limit),
            None => request,
        };
        match self.year_range {
            Some((start, end)) => request.with_year_range(start, end),
            None => request,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InputState {
    /// Typing a song name.
    Editing,
    /// A request is queued or in flight; input is locked.
    Requesting,
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub input_state: InputState,
    pub current_input: String,
    /// Song name captured when the request was submitted.
    pub pending_song: Option<String>,
    pub status_message: String,
    pub view: RadarView,
    pub response: Option<RecommendationResponse>,
    /// Song the current chart belongs to.
    pub shown_song: Option<String>,
    pub selected_index: usize,
    pub show_help: bool,
    pub animation_counter: f64,
    pub last_frame: Instant,
    pub options: RequestOptions,
    pub actions: AppActions,
}

impl App {
    pub fn new() -> Self {
        Self {
            running: true,
            input_state: InputState::Editing,
            current_input: String::new(),
            pending_song: None,
            status_message: String::new(),
            view: RadarView::new(),
            response: None,
            shown_song: None,
            selected_index: 0,
            show_help: false,
            animation_counter: 0.0,
            last_frame: Instant::now(),
            options: RequestOptions::default(),
            actions: AppActions::new(),
        }
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.actions.initialize()
    }

    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;

        // Update animation counter (cycles between 0 and 2*PI)
        self.animation_counter += delta.as_secs_f64() * 2.0;
        if self.animation_counter > 2.0 * std::f64::consts::PI {
            self.animation_counter -= 2.0 * std::f64::consts::PI;
        }
    }

    /// Captures the typed song name and queues a request for the event loop.
    ///
    /// An empty name is sent as-is; the backend answers it with an error.
    pub fn submit(&mut self) {
        if self.input_state == InputState::Requesting {
            return;
        }
        self.pending_song = Some(self.current_input.trim().to_string());
        self.input_state = InputState::Requesting;
    }

    pub fn pending_request(&self) -> Option<RecommendRequest> {
        let song = self.pending_song.as_ref()?;
        Some(self.options.apply(RecommendRequest::new(song.clone())))
    }

    /// Presents a response; the previous chart is destroyed first.
    pub fn show_response(&mut self, response: RecommendationResponse) {
        match self.view.present(&response) {
            Ok(instance) => {
                self.status_message = format!(
                    "Loaded {} matches across {} features",
                    response.recommendations.len(),
                    instance.chart.labels().len()
                );
                self.shown_song = self.pending_song.clone();
                self.response = Some(response);
                self.selected_index = 0;
            }
            Err(e) => {
                self.status_message = format!("Error: {e}");
            }
        }
    }

    pub fn finish_request(&mut self) {
        self.pending_song = None;
        self.input_state = InputState::Editing;
    }

    pub fn recommendation_count(&self) -> usize {
        self.response
            .as_ref()
            .map_or(0, |response| response.recommendations.len())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sound_dna_core::ViewError;

    fn response(json: &str) -> Result<RecommendationResponse, ViewError> {
        RecommendationResponse::from_json(json.as_bytes())
    }

    #[test]
    fn empty_input_is_still_submitted() {
        let mut app = App::new();
        app.submit();

        assert_eq!(app.input_state, InputState::Requesting);
        let request = app.pending_request();
        assert_eq!(request.map(|r| r.song_name), Some(String::new()));
    }

    #[test]
    fn pending_request_carries_filters() {
        let mut app = App::new();
        app.options = RequestOptions {
            limit: Some(4),
            year_range: Some((1995, 2005)),
        };
        app.current_input = "  Clocks ".to_string();
        app.submit();

        let request = app.pending_request();
        assert_eq!(
            request,
            Some(
                RecommendRequest::new("Clocks")
                    .with_limit(4)
                    .with_year_range(1995, 2005)
            )
        );
    }

    #[test]
    fn second_response_replaces_first_chart() -> Result<(), ViewError> {
        let mut app = App::new();
        app.show_response(response(
            r#"{"input_song":{"tempo":0.8},"recommendations":[{"tempo":0.7}]}"#,
        )?);
        app.show_response(response(
            r#"{"input_song":{"energy":0.3,"tempo":0.1},"recommendations":[{"energy":0.2}]}"#,
        )?);

        assert_eq!(app.view.live_instances(), 1);
        let labels = app
            .view
            .current()
            .map(|instance| instance.chart.labels().to_vec());
        assert_eq!(labels, Some(vec!["energy".to_string(), "tempo".to_string()]));
        Ok(())
    }

    #[test]
    fn response_without_matches_reports_error_and_keeps_chart() -> Result<(), ViewError> {
        let mut app = App::new();
        app.show_response(response(
            r#"{"input_song":{"tempo":0.8},"recommendations":[{"tempo":0.7}]}"#,
        )?);
        app.show_response(response(r#"{"input_song":{"tempo":0.8},"recommendations":[]}"#)?);

        assert!(app.status_message.starts_with("Error"));
        assert_eq!(app.view.live_instances(), 1);
        assert_eq!(app.recommendation_count(), 1);
        Ok(())
    }
}
