use serde::{Deserialize, Serialize};

use crate::collection::{BadgeCategory, Companion, CompanionTheme};
use crate::feed::{FundingPost, PostStatus, StatusPost};
use crate::project::{Project, StageField};
use crate::types::{
    Amount, BadgeId, CompanionId, MediaRef, PaymentMethodRef, PostId, ProjectId, StageId,
};

// ── Drafts ────────────────────────────────────────────────────────────────────

/// One stage of a new proposal, before ids and status are assigned.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StageDraft {
    pub name: String,
    pub description: String,
    pub funding_amount: Amount,
}

/// The "propose a project" form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub title: String,
    pub overview: String,
    pub stages: Vec<StageDraft>,
}

// ── Action ────────────────────────────────────────────────────────────────────

/// Every synchronous state change a user can trigger.
///
/// Gacha pulls are not listed here: they span a presentation delay and go
/// through `LifecycleEngine::pull_gacha`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    // ── Stage editing ────────────────────────────────────────────────────────

    /// Append a blank pending stage.
    AddStage { project: ProjectId },

    /// Remove a non-completed stage; the last stage can never go.
    RemoveStage { project: ProjectId, stage: StageId },

    /// Overwrite one field of a non-completed stage.
    UpdateStage {
        project: ProjectId,
        stage: StageId,
        field: StageField,
    },

    // ── Stage lifecycle ──────────────────────────────────────────────────────

    /// `pending → in-progress`.
    StartStage { project: ProjectId, stage: StageId },

    /// First half of the two-step completion.
    RequestStageCompletion { project: ProjectId, stage: StageId },

    /// Second half: the stage becomes completed, irreversibly.
    ConfirmStageCompletion { project: ProjectId, stage: StageId },

    /// Drop the pending completion request.
    CancelStageCompletion,

    // ── Projects & posts ─────────────────────────────────────────────────────

    /// Replace a stored project with an edited, validated copy.
    SaveProject { project: Project },

    SubmitProposal { draft: ProposalDraft },

    /// Plain-text progress note shown as the project's latest update.
    UpdateProjectNote { project: ProjectId, text: String },

    SubmitStatusPost {
        project: ProjectId,
        content: String,
        media: Vec<MediaRef>,
        status: PostStatus,
    },

    // ── Feed ─────────────────────────────────────────────────────────────────

    Contribute {
        post: PostId,
        amount: Amount,
        payment_method: PaymentMethodRef,
    },

    ToggleLike { post: PostId },

    // ── Collection ───────────────────────────────────────────────────────────

    /// A qualifying action reported from outside the engine.
    RecordActivity {
        category: BadgeCategory,
        #[serde(default)]
        theme: Option<CompanionTheme>,
    },

    EvolveCompanion { companion: CompanionId },
}

impl Action {
    /// Short name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddStage { .. } => "add_stage",
            Action::RemoveStage { .. } => "remove_stage",
            Action::UpdateStage { .. } => "update_stage",
            Action::StartStage { .. } => "start_stage",
            Action::RequestStageCompletion { .. } => "request_stage_completion",
            Action::ConfirmStageCompletion { .. } => "confirm_stage_completion",
            Action::CancelStageCompletion => "cancel_stage_completion",
            Action::SaveProject { .. } => "save_project",
            Action::SubmitProposal { .. } => "submit_proposal",
            Action::UpdateProjectNote { .. } => "update_project_note",
            Action::SubmitStatusPost { .. } => "submit_status_post",
            Action::Contribute { .. } => "contribute",
            Action::ToggleLike { .. } => "toggle_like",
            Action::RecordActivity { .. } => "record_activity",
            Action::EvolveCompanion { .. } => "evolve_companion",
        }
    }
}

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// What a successfully applied `Action` produced.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    /// The project after the change.
    Project { project: Project },

    /// A completion is awaiting confirmation.
    CompletionRequested { project: ProjectId, stage: StageId },

    CompletionCancelled { stage: Option<StageId> },

    /// The status post, plus the funding post it published for `need-fund`.
    StatusPosted {
        post: StatusPost,
        funding_post: Option<FundingPost>,
    },

    /// The post after a contribution or like toggle.
    Post { post: FundingPost },

    Contribution {
        post: FundingPost,
        amount: Amount,
        funding_percentage: f64,
    },

    Activity { newly_earned: Vec<BadgeId> },

    Evolved { companion: Companion },
}

/// Result of a completed gacha pull.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PullOutcome {
    Unlocked {
        companion: Companion,
        tokens_left: u32,
    },
    /// Nothing left to unlock; these companions received bonus progress.
    Bonus {
        boosted: Vec<CompanionId>,
        tokens_left: u32,
    },
}
