use std::cell::RefCell;
use std::rc::Rc;

use super::controller::SelectionOutcome;
use super::state::{refresh_view, AppState, BackendEvent};

/// Handle a backend event. Every state change goes through here.
pub fn handle_backend_event(state: &Rc<RefCell<AppState>>, event: BackendEvent) {
    match event {
        BackendEvent::EngineLoadProgress(downloaded, total) => {
            state
                .borrow_mut()
                .visualizer
                .on_load_progress(downloaded, total);
        }
        BackendEvent::EngineLoaded(result) => {
            state.borrow_mut().visualizer.on_engine_loaded(result);
        }
        BackendEvent::SignSelected(id) => {
            let outcome = state.borrow_mut().visualizer.select(id);
            match outcome {
                SelectionOutcome::Matched(letter) => log::info!("Sign {id} -> {letter}"),
                SelectionOutcome::NoMatch => log::info!("Sign {id} has no letter"),
                SelectionOutcome::Invalid => log::info!("Sign {id} rejected"),
                SelectionOutcome::Ignored => return,
            }
        }
        BackendEvent::SpeakRequested => {
            state.borrow().visualizer.speak_current();
            return;
        }
    }
    refresh_view(state);
}
