use jsonrpsee::core::RpcResult;
use jsonrpsee::proc_macros::rpc;

use fundflow_core::action::{ProposalDraft, PullOutcome};
use fundflow_core::collection::{BadgeCategory, Companion, CompanionTheme};
use fundflow_core::feed::PostStatus;
use fundflow_core::project::{Project, StageField};

use crate::types::{
    RpcCollection, RpcContribution, RpcFeedPost, RpcPendingCompletion, RpcProfile, RpcProject,
    RpcStatusPost,
};

/// FundFlow JSON-RPC 2.0 API definition.
///
/// All method names are prefixed with "fundflow_" via `namespace = "fundflow"`.
#[rpc(server, namespace = "fundflow")]
pub trait FundflowApi {
    // ── Community feed ───────────────────────────────────────────────────────

    /// All funding posts, newest first.
    #[method(name = "listFeed")]
    async fn list_feed(&self) -> RpcResult<Vec<RpcFeedPost>>;

    #[method(name = "getPost")]
    async fn get_post(&self, post_id: String) -> RpcResult<RpcFeedPost>;

    /// Contribute to a post. `amount` is the dollar string as typed, at most
    /// two decimals (e.g. "25" or "12.50").
    #[method(name = "fundPost")]
    async fn fund_post(&self, post_id: String, amount: String, payment_method: String) -> RpcResult<RpcContribution>;

    #[method(name = "toggleLike")]
    async fn toggle_like(&self, post_id: String) -> RpcResult<RpcFeedPost>;

    // ── Projects ─────────────────────────────────────────────────────────────

    /// Projects owned by the session user.
    #[method(name = "listProjects")]
    async fn list_projects(&self) -> RpcResult<Vec<RpcProject>>;

    #[method(name = "getProject")]
    async fn get_project(&self, project_id: String) -> RpcResult<RpcProject>;

    /// Replace a project with an edited copy. Returns it unchanged on success.
    #[method(name = "saveProject")]
    async fn save_project(&self, project: Project) -> RpcResult<RpcProject>;

    #[method(name = "addStage")]
    async fn add_stage(&self, project_id: String) -> RpcResult<RpcProject>;

    #[method(name = "removeStage")]
    async fn remove_stage(&self, project_id: String, stage_id: String) -> RpcResult<RpcProject>;

    /// `field` is `{"field": "name" | "description" | "funding_amount", "value": ...}`.
    #[method(name = "updateStage")]
    async fn update_stage(&self, project_id: String, stage_id: String, field: StageField) -> RpcResult<RpcProject>;

    #[method(name = "startStage")]
    async fn start_stage(&self, project_id: String, stage_id: String) -> RpcResult<RpcProject>;

    // ── Two-step completion ──────────────────────────────────────────────────

    #[method(name = "requestStageCompletion")]
    async fn request_stage_completion(&self, project_id: String, stage_id: String) -> RpcResult<RpcPendingCompletion>;

    #[method(name = "confirmStageCompletion")]
    async fn confirm_stage_completion(&self, project_id: String, stage_id: String) -> RpcResult<RpcProject>;

    /// Returns the stage id whose request was dropped, if any.
    #[method(name = "cancelStageCompletion")]
    async fn cancel_stage_completion(&self) -> RpcResult<Option<String>>;

    // ── Proposals & updates ──────────────────────────────────────────────────

    #[method(name = "submitProposal")]
    async fn submit_proposal(&self, draft: ProposalDraft) -> RpcResult<RpcProject>;

    /// Set the project's latest update as plain text, without media.
    #[method(name = "updateProjectNote")]
    async fn update_project_note(&self, project_id: String, text: String) -> RpcResult<RpcProject>;

    #[method(name = "submitStatusPost")]
    async fn submit_status_post(
        &self,
        project_id: String,
        content: String,
        media: Vec<String>,
        status: PostStatus,
    ) -> RpcResult<RpcStatusPost>;

    // ── Collection ───────────────────────────────────────────────────────────

    #[method(name = "getCollection")]
    async fn get_collection(&self) -> RpcResult<RpcCollection>;

    #[method(name = "evolveCompanion")]
    async fn evolve_companion(&self, companion_id: String) -> RpcResult<Companion>;

    /// Spend one token. Resolves after the presentation delay.
    #[method(name = "pullGacha")]
    async fn pull_gacha(&self) -> RpcResult<PullOutcome>;

    /// Report a qualifying action. Returns the ids of newly earned badges.
    #[method(name = "recordActivity")]
    async fn record_activity(&self, category: BadgeCategory, theme: Option<CompanionTheme>) -> RpcResult<Vec<String>>;

    // ── Profile ──────────────────────────────────────────────────────────────

    #[method(name = "getProfile")]
    async fn get_profile(&self) -> RpcResult<RpcProfile>;
}
