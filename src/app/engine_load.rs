use std::cell::RefCell;
use std::rc::Rc;

use super::state::{AppState, BackendEvent};

/// Start the session's one engine initialization on the tokio runtime.
///
/// Progress and the final result come back as [`BackendEvent`]s.
pub fn start_engine_load(state: &Rc<RefCell<AppState>>) {
    let mut s = state.borrow_mut();
    if !s.visualizer.request_initialization() {
        return;
    }

    log::info!("Loading sign engine from {:?}", s.config.engine);
    let source = s.config.engine.clone();
    let sender = s.backend_sender.clone();
    let progress_sender = sender.clone();

    s.tokio_rt.spawn(async move {
        let result = crate::engine::initialize(&source, move |downloaded, total| {
            let _ = progress_sender.try_send(BackendEvent::EngineLoadProgress(downloaded, total));
        })
        .await;

        if sender.send(BackendEvent::EngineLoaded(result)).await.is_err() {
            log::warn!("UI gone before sign engine finished loading");
        }
    });
}
