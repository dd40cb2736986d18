use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::project::StageStatus;

/// Missing or malformed user input. Always recoverable: the user corrects the
/// form and resubmits. `Display` renders the stable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationError {
    #[error("missing-field")]
    MissingField,

    #[error("invalid-stage")]
    InvalidStage,

    #[error("invalid-amount")]
    InvalidAmount,

    #[error("missing-project")]
    MissingProject,

    #[error("missing-content")]
    MissingContent,

    #[error("missing-media")]
    MissingMedia,

    #[error("missing-payment-method")]
    MissingPaymentMethod,
}

/// An action that is well-formed but not allowed in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateConflict {
    // ── Stage lifecycle ──────────────────────────────────────────────────────
    #[error("stage {0} is completed and can no longer change")]
    StageLocked(String),

    #[error("cannot remove the only remaining stage")]
    LastStage,

    #[error("stage {stage} is {status}; expected pending")]
    StageNotPending { stage: String, status: StageStatus },

    #[error("stage {0} cannot advance before every earlier stage is completed")]
    StageOutOfOrder(String),

    #[error("stage {0} is already in progress")]
    StageAlreadyInProgress(String),

    #[error("no completion was requested for stage {0}")]
    NoPendingConfirmation(String),

    #[error("stage {0} status may only change through its lifecycle operations")]
    StatusChangeNotAllowed(String),

    #[error("stage id {0} appears more than once")]
    DuplicateStage(String),

    #[error("stage {0} was moved out of sequence")]
    StageReordered(String),

    #[error("stage {0} is not open for funding")]
    StageNotFundable(String),

    #[error("project {0} belongs to another user")]
    NotProjectOwner(String),

    // ── Companions ───────────────────────────────────────────────────────────
    #[error("companion {0} has not been unlocked")]
    CompanionLocked(String),

    #[error("companion {0} is fully evolved")]
    CompanionFullyEvolved(String),

    #[error("companion {id} needs {need} evolution progress, has {have}")]
    EvolutionNotReady { id: String, need: u32, have: u32 },
}

#[derive(Debug, Error)]
pub enum FundflowError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("state conflict: {0}")]
    StateConflict(#[from] StateConflict),

    // ── Resources ────────────────────────────────────────────────────────────
    #[error("insufficient gacha tokens: need {need}, have {have}")]
    InsufficientTokens { need: u32, have: u32 },

    #[error("a gacha pull is already in progress")]
    PullInProgress,

    // ── Lookups ──────────────────────────────────────────────────────────────
    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("unknown project: {0}")]
    UnknownProject(String),

    #[error("unknown stage: {0}")]
    UnknownStage(String),

    #[error("unknown post: {0}")]
    UnknownPost(String),

    #[error("unknown companion: {0}")]
    UnknownCompanion(String),

    // ── General ──────────────────────────────────────────────────────────────
    #[error("state store unavailable: {0}")]
    Storage(String),
}

/// Coarse error classes surfaced to callers as a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Validation,
    StateConflict,
    InsufficientResource,
    PullInProgress,
    NotFound,
    Internal,
}

impl FundflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FundflowError::Validation(_) => ErrorKind::Validation,
            FundflowError::StateConflict(_) => ErrorKind::StateConflict,
            FundflowError::InsufficientTokens { .. } => ErrorKind::InsufficientResource,
            FundflowError::PullInProgress => ErrorKind::PullInProgress,
            FundflowError::UnknownUser(_)
            | FundflowError::UnknownProject(_)
            | FundflowError::UnknownStage(_)
            | FundflowError::UnknownPost(_)
            | FundflowError::UnknownCompanion(_) => ErrorKind::NotFound,
            FundflowError::Storage(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_codes_render_verbatim() {
        assert_eq!(ValidationError::MissingField.to_string(), "missing-field");
        assert_eq!(ValidationError::InvalidStage.to_string(), "invalid-stage");
        assert_eq!(ValidationError::InvalidAmount.to_string(), "invalid-amount");
        assert_eq!(
            serde_json::to_string(&ValidationError::MissingPaymentMethod).unwrap(),
            "\"missing-payment-method\""
        );
    }

    #[test]
    fn every_variant_maps_to_a_kind() {
        let cases = [
            (FundflowError::from(ValidationError::MissingField), ErrorKind::Validation),
            (FundflowError::from(StateConflict::LastStage), ErrorKind::StateConflict),
            (FundflowError::InsufficientTokens { need: 1, have: 0 }, ErrorKind::InsufficientResource),
            (FundflowError::PullInProgress, ErrorKind::PullInProgress),
            (FundflowError::UnknownStage("s9".into()), ErrorKind::NotFound),
            (FundflowError::Storage("poisoned".into()), ErrorKind::Internal),
        ];
        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "{err}");
        }
    }
}
