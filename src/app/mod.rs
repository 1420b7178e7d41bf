mod controller;
mod engine_load;
mod event_handler;
mod state;

pub use controller::{DebugInfo, ResultPanel, SelectorControl, View};
pub use engine_load::start_engine_load;
pub use event_handler::handle_backend_event;
pub use state::{refresh_view, AppState, BackendEvent};
