use crate::engine::{Classification, EngineError, EngineHandle, SelectionId};
use crate::speech::{Speaker, SpeechConfig, SpeechRequest};

/// Inline message for ids the engine rejects.
pub const INVALID_ID_MESSAGE: &str = "Invalid image ID";

/// What the result panel holds after a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationResult {
    Letter(char),
    /// Valid id without a mapping. Not an error.
    NoResult,
}

/// State of a session with a loaded engine.
#[derive(Debug)]
pub struct ReadyState {
    engine: EngineHandle,
    /// Button captions for ids `1..=labels.len()`.
    labels: Vec<String>,
    selection: Option<SelectionId>,
    result: Option<ClassificationResult>,
    error: Option<String>,
}

#[derive(Debug)]
pub enum VisualizerState {
    Loading {
        /// Remote download progress, `(downloaded, total)` bytes.
        progress: Option<(u64, u64)>,
    },
    Ready(ReadyState),
    /// Terminal; a new session is needed to retry.
    EngineFailed { message: String },
}

/// Outcome of a selection event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Engine not ready; nothing was queried.
    Ignored,
    Matched(char),
    NoMatch,
    Invalid,
}

/// One selector button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorControl {
    pub id: SelectionId,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultPanel {
    Letter(char),
    /// "Select a hand sign" affordance.
    Prompt,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugInfo {
    pub id: SelectionId,
    pub valid: bool,
    pub total: u32,
}

/// Everything the window needs to draw the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Loading {
        message: String,
    },
    Failed {
        message: String,
    },
    Ready {
        controls: Vec<SelectorControl>,
        result: ResultPanel,
        debug: Option<DebugInfo>,
    },
}

/// Owns the visualizer state and drives the engine and speech collaborators.
pub struct Visualizer {
    state: VisualizerState,
    speaker: Box<dyn Speaker>,
    speech: SpeechConfig,
    init_requested: bool,
}

impl Visualizer {
    pub fn new(speaker: Box<dyn Speaker>, speech: SpeechConfig) -> Self {
        Self {
            state: VisualizerState::Loading { progress: None },
            speaker,
            speech,
            init_requested: false,
        }
    }

    /// Claim the session's single engine initialization.
    ///
    /// Returns `true` only on the first call.
    pub fn request_initialization(&mut self) -> bool {
        if self.init_requested {
            log::warn!("Engine initialization already requested");
            return false;
        }
        self.init_requested = true;
        true
    }

    pub fn on_load_progress(&mut self, downloaded: u64, total: u64) {
        if let VisualizerState::Loading { progress } = &mut self.state {
            *progress = Some((downloaded, total));
        }
    }

    /// Apply the result of engine initialization. Ignored unless loading.
    pub fn on_engine_loaded(&mut self, result: Result<EngineHandle, EngineError>) {
        if !matches!(self.state, VisualizerState::Loading { .. }) {
            log::warn!("Ignoring engine load completion outside of Loading");
            return;
        }

        self.state = match result {
            Ok(engine) => {
                log::info!("Sign engine ready ({} signs)", engine.total_entries());
                let labels = selector_labels(&engine);
                VisualizerState::Ready(ReadyState {
                    engine,
                    labels,
                    selection: None,
                    result: None,
                    error: None,
                })
            }
            Err(e) => {
                log::error!("Sign engine failed: {e}");
                let message = match e {
                    EngineError::LoadFailure(reason) => {
                        format!("Failed to load sign engine: {reason}")
                    }
                    other => other.to_string(),
                };
                VisualizerState::EngineFailed { message }
            }
        };
    }

    /// Handle a user selection. Always re-queries, even for the current id.
    pub fn select(&mut self, id: SelectionId) -> SelectionOutcome {
        let VisualizerState::Ready(ready) = &mut self.state else {
            log::debug!("Ignoring selection {id}: engine not ready");
            return SelectionOutcome::Ignored;
        };

        ready.selection = Some(id);
        match ready.engine.classify(id) {
            Ok(Classification::Matched(letter)) => {
                ready.result = Some(ClassificationResult::Letter(letter));
                ready.error = None;
                self.speaker
                    .speak(SpeechRequest::for_letter(letter, &self.speech));
                SelectionOutcome::Matched(letter)
            }
            Ok(Classification::NoMatch) => {
                ready.result = Some(ClassificationResult::NoResult);
                ready.error = None;
                SelectionOutcome::NoMatch
            }
            Err(e) => {
                log::warn!("Selection rejected: {e}");
                ready.result = None;
                ready.error = Some(INVALID_ID_MESSAGE.to_string());
                SelectionOutcome::Invalid
            }
        }
    }

    /// Speak the displayed letter again. Returns whether anything was spoken.
    pub fn speak_current(&self) -> bool {
        match &self.state {
            VisualizerState::Ready(ReadyState {
                result: Some(ClassificationResult::Letter(letter)),
                ..
            }) => {
                self.speaker
                    .speak(SpeechRequest::for_letter(*letter, &self.speech));
                true
            }
            _ => false,
        }
    }

    pub fn view(&self) -> View {
        match &self.state {
            VisualizerState::Loading { progress } => View::Loading {
                message: loading_message(*progress),
            },
            VisualizerState::EngineFailed { message } => View::Failed {
                message: message.clone(),
            },
            VisualizerState::Ready(ready) => {
                let total = ready.engine.total_entries();
                let controls = (1..)
                    .map(SelectionId)
                    .zip(&ready.labels)
                    .map(|(id, label)| SelectorControl {
                        id,
                        label: label.clone(),
                        selected: ready.selection == Some(id),
                    })
                    .collect();

                let result = match (&ready.error, ready.result) {
                    (Some(error), _) => ResultPanel::Error(error.clone()),
                    (None, Some(ClassificationResult::Letter(letter))) => {
                        ResultPanel::Letter(letter)
                    }
                    (None, _) => ResultPanel::Prompt,
                };

                let debug = ready.selection.map(|id| DebugInfo {
                    id,
                    valid: ready.engine.is_valid_id(id),
                    total,
                });

                View::Ready {
                    controls,
                    result,
                    debug,
                }
            }
        }
    }
}

/// Button captions: the letter each id maps to, or the id itself when unmapped.
fn selector_labels(engine: &EngineHandle) -> Vec<String> {
    let max = i32::try_from(engine.total_entries()).unwrap_or(i32::MAX);
    (1..=max)
        .map(SelectionId)
        .map(|id| match engine.classify(id) {
            Ok(Classification::Matched(letter)) => letter.to_string(),
            _ => id.to_string(),
        })
        .collect()
}

fn loading_message(progress: Option<(u64, u64)>) -> String {
    match progress {
        Some((downloaded, total)) if total > 0 => format!(
            "Downloading sign table: {:.1} / {:.1} KB",
            downloaded as f64 / 1024.0,
            total as f64 / 1024.0
        ),
        Some((downloaded, _)) => format!(
            "Downloading sign table: {:.1} KB",
            downloaded as f64 / 1024.0
        ),
        None => "Loading sign engine...".to_string(),
    }
}
