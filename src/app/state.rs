use crate::config::Config;
use crate::engine::{EngineError, EngineHandle, SelectionId};
use crate::speech;
use crate::ui::visualizer::VisualizerWidgets;

use super::controller::Visualizer;

/// Events delivered to the GTK main thread.
#[derive(Debug)]
pub enum BackendEvent {
    EngineLoadProgress(u64, u64),
    EngineLoaded(Result<EngineHandle, EngineError>),
    SignSelected(SelectionId),
    SpeakRequested,
}

/// Central application state. Lives on the GTK main thread inside Rc<RefCell<>>.
pub struct AppState {
    pub config: Config,
    pub visualizer: Visualizer,
    pub tokio_rt: tokio::runtime::Runtime,
    pub backend_sender: async_channel::Sender<BackendEvent>,

    // UI handles
    pub window: Option<VisualizerWidgets>,
}

impl AppState {
    pub fn new(
        config: Config,
        sender: async_channel::Sender<BackendEvent>,
    ) -> Result<Self, std::io::Error> {
        let tokio_rt = tokio::runtime::Runtime::new()?;
        let speaker = speech::build_speaker(&config.speech, tokio_rt.handle().clone());
        let visualizer = Visualizer::new(speaker, config.speech.clone());

        Ok(Self {
            config,
            visualizer,
            tokio_rt,
            backend_sender: sender,
            window: None,
        })
    }
}

/// Redraw the window from the controller's current view.
pub fn refresh_view(state: &std::rc::Rc<std::cell::RefCell<AppState>>) {
    let s = state.borrow();
    if let Some(ref window) = s.window {
        crate::ui::visualizer::render(window, &s.visualizer.view(), s.config.show_debug);
    }
}
