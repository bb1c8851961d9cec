// App module for sound-dna
// Handles application state and the recommendation flow

pub mod actions;
pub mod input;
pub mod state;

pub use input::handle_input;
pub use state::{App, InputState, RequestOptions};
