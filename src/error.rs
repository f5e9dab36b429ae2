use thiserror::Error;

/// Recoverable failures of the catalog, session, and calculator.
///
/// A session is left untouched whenever one of these is returned, so the
/// host can simply re-prompt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RallyError {
    #[error("unknown hero '{0}'")]
    UnknownHero(String),
    #[error("unknown skill '{skill}' for hero '{hero}'")]
    UnknownSkill { hero: String, skill: String },
    #[error("invalid selection '{choice}' while {state}")]
    InvalidSelection { state: String, choice: String },
    #[error("incomplete roster: {0}")]
    IncompleteRoster(String),
    #[error("nothing to undo")]
    NothingToUndo,
}

impl RallyError {
    pub(crate) fn invalid(state: impl ToString, choice: impl Into<String>) -> Self {
        Self::InvalidSelection {
            state: state.to_string(),
            choice: choice.into(),
        }
    }
}
