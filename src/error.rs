//! Capability failure type
//!
//! Presentation and audio are external; their failures are caught where the
//! session calls them, logged, and never stop the simulation.

/// A presentation or audio call that did not go through
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CapabilityError {
    #[error("presentation failed: {0}")]
    Presentation(String),
    #[error("audio failed: {0}")]
    Audio(String),
}

impl CapabilityError {
    pub fn presentation(msg: impl Into<String>) -> Self {
        Self::Presentation(msg.into())
    }

    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }
}

/// Log and drop a capability failure
pub(crate) fn soft<T>(what: &str, result: Result<T, CapabilityError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("{what}: {e}");
            None
        }
    }
}
