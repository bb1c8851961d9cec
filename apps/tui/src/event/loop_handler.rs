use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::fmt;
use std::io::Stdout;

use crate::app::{handle_input, App, InputState};
use crate::ui;

// States of one recommendation request
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum RequestState {
    Idle,
    Requesting,
    Success,
    Error,
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Requesting => write!(f, "Requesting"),
            Self::Success => write!(f, "Success"),
            Self::Error => write!(f, "Error"),
        }
    }
}

#[derive(Clone, Debug)]
enum RequestEvent {
    Start(String),
    Success(Box<sound_dna_core::RecommendationResponse>),
    Error(String),
    Reset,
}

impl fmt::Display for RequestEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start(song) => write!(f, "Start({song})"),
            Self::Success(response) => {
                write!(f, "Success({} matches)", response.recommendations.len())
            }
            Self::Error(msg) => write!(f, "Error({msg})"),
            Self::Reset => write!(f, "Reset"),
        }
    }
}

#[derive(Debug)]
struct StateTransitionError {
    from: RequestState,
    event: String,
}

impl fmt::Display for StateTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid transition from {} with event {}",
            self.from, self.event
        )
    }
}

impl std::error::Error for StateTransitionError {}

// Drives one request from submission to the next idle state
struct RequestMachine {
    state: RequestState,
}

impl RequestMachine {
    const fn new(initial_state: RequestState) -> Self {
        Self {
            state: initial_state,
        }
    }

    const fn state(&self) -> RequestState {
        self.state
    }

    fn process_event(
        &mut self,
        event: RequestEvent,
        app: &mut App,
    ) -> std::result::Result<(), StateTransitionError> {
        let next_state = NextState::try_from((self.state, event, app))?;
        self.state = next_state.0;
        Ok(())
    }
}

struct NextState(RequestState);

impl TryFrom<(RequestState, RequestEvent, &mut App)> for NextState {
    type Error = StateTransitionError;

    fn try_from(
        value: (RequestState, RequestEvent, &mut App),
    ) -> std::result::Result<Self, Self::Error> {
        let (current_state, event, app) = value;

        match (current_state, event) {
            (RequestState::Idle, RequestEvent::Start(song)) => {
                app.status_message = format!("Finding matches for {song:?}...");
                Ok(Self(RequestState::Requesting))
            }
            (RequestState::Requesting, RequestEvent::Success(response)) => {
                app.show_response(*response);
                Ok(Self(RequestState::Success))
            }
            (RequestState::Requesting, RequestEvent::Error(error)) => {
                app.status_message = format!("Error: {error}");
                Ok(Self(RequestState::Error))
            }
            (RequestState::Success | RequestState::Error, RequestEvent::Reset) => {
                app.finish_request();
                Ok(Self(RequestState::Idle))
            }
            (from, event) => Err(StateTransitionError {
                from,
                event: event.to_string(),
            }),
        }
    }
}

/// Run the main application event loop
pub async fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    let mut machine = RequestMachine::new(RequestState::Idle);

    loop {
        app.update();

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        if matches!(
            event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_input(app, key.code);
                    if !app.running {
                        break;
                    }
                }
                Ok(Event::Resize(_, _)) => {
                    // Force a redraw after resize
                    if terminal.draw(|f| ui::ui(app, f)).is_err() {
                        // Non-fatal redraw error
                    }
                }
                Ok(_) | Err(_) => {}
            }
        }

        if app.input_state == InputState::Requesting && machine.state() == RequestState::Idle {
            request_once(terminal, app, &mut machine).await;
        }
    }
    Ok(())
}

// Requests are awaited inline, so at most one is ever in flight.
async fn request_once(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    machine: &mut RequestMachine,
) {
    let Some(request) = app.pending_request() else {
        app.finish_request();
        return;
    };

    if let Err(e) = machine.process_event(RequestEvent::Start(request.song_name.clone()), app) {
        log::warn!("{e}");
        return;
    }

    // Show the pending status before blocking on the network
    if terminal.draw(|f| ui::ui(app, f)).is_err() {
        // Non-fatal redraw error
    }

    let event = match app.actions.recommend(&request).await {
        Ok(response) => RequestEvent::Success(Box::new(response)),
        Err(e) => {
            log::warn!("recommendation request failed: {e:#}");
            RequestEvent::Error(e.to_string())
        }
    };

    if let Err(e) = machine.process_event(event, app) {
        log::warn!("{e}");
    }

    if let Err(e) = machine.process_event(RequestEvent::Reset, app) {
        log::warn!("{e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sound_dna_core::RecommendationResponse;

    fn sample() -> Result<RecommendationResponse, sound_dna_core::ViewError> {
        RecommendationResponse::from_json(
            br#"{"input_song":{"tempo":0.8,"energy":0.6},
                "recommendations":[{"tempo":0.75,"energy":0.65}]}"#,
        )
    }

    #[test]
    fn successful_request_cycles_back_to_idle() -> Result<(), Box<dyn std::error::Error>> {
        let mut app = App::new();
        app.current_input = "Yellow".to_string();
        app.submit();
        let mut machine = RequestMachine::new(RequestState::Idle);

        machine.process_event(RequestEvent::Start("Yellow".to_string()), &mut app)?;
        assert_eq!(machine.state(), RequestState::Requesting);

        machine.process_event(RequestEvent::Success(Box::new(sample()?)), &mut app)?;
        assert_eq!(machine.state(), RequestState::Success);
        assert_eq!(app.view.live_instances(), 1);
        assert_eq!(app.shown_song.as_deref(), Some("Yellow"));

        machine.process_event(RequestEvent::Reset, &mut app)?;
        assert_eq!(machine.state(), RequestState::Idle);
        assert_eq!(app.input_state, InputState::Editing);
        Ok(())
    }

    #[test]
    fn failed_request_reports_error() -> Result<(), Box<dyn std::error::Error>> {
        let mut app = App::new();
        let mut machine = RequestMachine::new(RequestState::Idle);

        machine.process_event(RequestEvent::Start(String::new()), &mut app)?;
        machine.process_event(
            RequestEvent::Error("Please enter a song name (HTTP 400)".to_string()),
            &mut app,
        )?;

        assert_eq!(machine.state(), RequestState::Error);
        assert_eq!(
            app.status_message,
            "Error: Please enter a song name (HTTP 400)"
        );
        assert_eq!(app.view.live_instances(), 0);
        Ok(())
    }

    #[test]
    fn success_without_start_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let mut app = App::new();
        let mut machine = RequestMachine::new(RequestState::Idle);

        let result = machine.process_event(RequestEvent::Success(Box::new(sample()?)), &mut app);

        assert!(result.is_err());
        assert_eq!(machine.state(), RequestState::Idle);
        Ok(())
    }
}
