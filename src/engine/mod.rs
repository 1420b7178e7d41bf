mod alphabet;
mod loader;
mod table;

use std::fmt;

use thiserror::Error;

pub use alphabet::AlphabetEngine;
pub use loader::{initialize, EngineSource};
pub use table::SignTable;

/// Integer key of a hand sign, as chosen by the user.
///
/// Values outside an engine's domain are representable on purpose: the
/// engine is the one that decides validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionId(pub i32);

impl fmt::Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a successful engine query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Matched(char),
    /// The id is inside the domain but the engine has no letter for it.
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine could not be fetched, parsed or instantiated.
    #[error("failed to load sign engine: {0}")]
    LoadFailure(String),

    /// The id is outside the engine's accepted domain.
    #[error("invalid image ID: {0}")]
    InvalidId(SelectionId),
}

/// Capability set every classification engine exposes once instantiated.
pub trait SignEngine: Send {
    /// Letter mapped to `id`, or `None` when there is no mapping or the id is invalid.
    fn sign_letter(&self, id: SelectionId) -> Option<char>;

    fn is_valid_id(&self, id: SelectionId) -> bool;

    /// Size of the id domain; valid ids are `1..=total_signs()`.
    fn total_signs(&self) -> u32;
}

/// The loaded engine. Owned by the controller and never shared.
pub struct EngineHandle {
    engine: Box<dyn SignEngine>,
}

impl EngineHandle {
    pub fn new(engine: impl SignEngine + 'static) -> Self {
        Self {
            engine: Box::new(engine),
        }
    }

    /// Resolve `id`, telling "no mapping" apart from "invalid id".
    pub fn classify(&self, id: SelectionId) -> Result<Classification, EngineError> {
        match self.engine.sign_letter(id) {
            Some(letter) => Ok(Classification::Matched(letter)),
            None if self.engine.is_valid_id(id) => Ok(Classification::NoMatch),
            None => Err(EngineError::InvalidId(id)),
        }
    }

    pub fn is_valid_id(&self, id: SelectionId) -> bool {
        self.engine.is_valid_id(id)
    }

    pub fn total_entries(&self) -> u32 {
        self.engine.total_signs()
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("total_entries", &self.total_entries())
            .finish()
    }
}
