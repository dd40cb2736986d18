use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use jsonrpsee::core::{async_trait, RpcResult};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObject;
use tracing::{info, warn};

use fundflow_core::action::{Action, Outcome, ProposalDraft, PullOutcome};
use fundflow_core::collection::{BadgeCategory, Companion, CompanionTheme};
use fundflow_core::error::{ErrorKind, FundflowError};
use fundflow_core::feed::{FundingPost, PostStatus};
use fundflow_core::project::{Project, StageField};
use fundflow_core::types::{
    format_amount, parse_amount, CompanionId, MediaRef, PaymentMethodRef, PostId, ProjectId,
    StageId, Timestamp, UserId,
};
use fundflow_state::LifecycleEngine;

use crate::api::FundflowApiServer;
use crate::types::{
    RpcCollection, RpcContribution, RpcFeedPost, RpcPendingCompletion, RpcProfile, RpcProject,
    RpcStatusPost,
};

// ── Error codes ──────────────────────────────────────────────────────────────

pub const ERR_VALIDATION: i32 = -32010;
pub const ERR_STATE_CONFLICT: i32 = -32011;
pub const ERR_INSUFFICIENT: i32 = -32012;
pub const ERR_PULL_IN_PROGRESS: i32 = -32013;
pub const ERR_NOT_FOUND: i32 = -32014;
pub const ERR_INTERNAL: i32 = -32603;

fn rpc_err(code: i32, msg: impl Into<String>) -> ErrorObject<'static> {
    ErrorObject::owned(code, msg.into(), None::<()>)
}

/// Map a domain error onto its JSON-RPC error object.
pub fn domain_err(e: FundflowError) -> ErrorObject<'static> {
    let code = match e.kind() {
        ErrorKind::Validation => ERR_VALIDATION,
        ErrorKind::StateConflict => ERR_STATE_CONFLICT,
        ErrorKind::InsufficientResource => ERR_INSUFFICIENT,
        ErrorKind::PullInProgress => ERR_PULL_IN_PROGRESS,
        ErrorKind::NotFound => ERR_NOT_FOUND,
        ErrorKind::Internal => ERR_INTERNAL,
    };
    rpc_err(code, e.to_string())
}

fn unexpected(outcome: &Outcome) -> ErrorObject<'static> {
    warn!(?outcome, "RPC: engine returned an unexpected outcome");
    rpc_err(ERR_INTERNAL, "unexpected engine outcome")
}

fn now() -> Timestamp {
    Utc::now().timestamp()
}

// ── Server ───────────────────────────────────────────────────────────────────

/// Shared state passed to the RPC server.
pub struct RpcServerState {
    pub engine: Arc<LifecycleEngine>,
    /// Every call acts as this user.
    pub user: UserId,
}

/// The RPC server implementation.
pub struct RpcServer {
    state: Arc<RpcServerState>,
}

impl RpcServer {
    pub fn new(state: Arc<RpcServerState>) -> Self {
        Self { state }
    }

    /// Start the JSON-RPC server on `addr`. Returns the bound address and a
    /// handle to stop it.
    pub async fn start(self, addr: SocketAddr) -> anyhow::Result<(SocketAddr, ServerHandle)> {
        let server = Server::builder().build(addr).await?;
        let bound = server.local_addr()?;
        let module = self.into_rpc();
        let handle = server.start(module);
        info!(addr = %bound, "RPC server started");
        Ok((bound, handle))
    }

    fn user(&self) -> &UserId {
        &self.state.user
    }

    fn apply(&self, action: Action) -> RpcResult<Outcome> {
        self.state
            .engine
            .apply(self.user(), action, now())
            .map_err(domain_err)
    }

    fn apply_project(&self, action: Action) -> RpcResult<RpcProject> {
        match self.apply(action)? {
            Outcome::Project { project } => Ok(project.into()),
            other => Err(unexpected(&other)),
        }
    }

    fn card(&self, post: &FundingPost) -> RpcFeedPost {
        RpcFeedPost::from_post(post, self.user(), now())
    }
}

#[async_trait]
impl FundflowApiServer for RpcServer {
    // ── Community feed ───────────────────────────────────────────────────────

    async fn list_feed(&self) -> RpcResult<Vec<RpcFeedPost>> {
        let feed = self.state.engine.list_feed().map_err(domain_err)?;
        Ok(feed.iter().map(|p| self.card(p)).collect())
    }

    async fn get_post(&self, post_id: String) -> RpcResult<RpcFeedPost> {
        let post = self
            .state
            .engine
            .get_post(&PostId::new(post_id))
            .map_err(domain_err)?;
        Ok(self.card(&post))
    }

    async fn fund_post(&self, post_id: String, amount: String, payment_method: String) -> RpcResult<RpcContribution> {
        let amount = parse_amount(&amount).map_err(|e| domain_err(e.into()))?;
        let outcome = self.apply(Action::Contribute {
            post: PostId::new(post_id),
            amount,
            payment_method: PaymentMethodRef::new(payment_method),
        })?;
        match outcome {
            Outcome::Contribution { post, amount, funding_percentage } => Ok(RpcContribution {
                post: self.card(&post),
                amount,
                amount_display: format_amount(amount),
                funding_percentage,
            }),
            other => Err(unexpected(&other)),
        }
    }

    async fn toggle_like(&self, post_id: String) -> RpcResult<RpcFeedPost> {
        match self.apply(Action::ToggleLike { post: PostId::new(post_id) })? {
            Outcome::Post { post } => Ok(self.card(&post)),
            other => Err(unexpected(&other)),
        }
    }

    // ── Projects ─────────────────────────────────────────────────────────────

    async fn list_projects(&self) -> RpcResult<Vec<RpcProject>> {
        let projects = self
            .state
            .engine
            .list_user_projects(self.user())
            .map_err(domain_err)?;
        Ok(projects.into_iter().map(RpcProject::from).collect())
    }

    async fn get_project(&self, project_id: String) -> RpcResult<RpcProject> {
        self.state
            .engine
            .get_project(&ProjectId::new(project_id))
            .map(RpcProject::from)
            .map_err(domain_err)
    }

    async fn save_project(&self, project: Project) -> RpcResult<RpcProject> {
        self.apply_project(Action::SaveProject { project })
    }

    async fn add_stage(&self, project_id: String) -> RpcResult<RpcProject> {
        self.apply_project(Action::AddStage { project: ProjectId::new(project_id) })
    }

    async fn remove_stage(&self, project_id: String, stage_id: String) -> RpcResult<RpcProject> {
        self.apply_project(Action::RemoveStage {
            project: ProjectId::new(project_id),
            stage: StageId::new(stage_id),
        })
    }

    async fn update_stage(&self, project_id: String, stage_id: String, field: StageField) -> RpcResult<RpcProject> {
        self.apply_project(Action::UpdateStage {
            project: ProjectId::new(project_id),
            stage: StageId::new(stage_id),
            field,
        })
    }

    async fn start_stage(&self, project_id: String, stage_id: String) -> RpcResult<RpcProject> {
        self.apply_project(Action::StartStage {
            project: ProjectId::new(project_id),
            stage: StageId::new(stage_id),
        })
    }

    // ── Two-step completion ──────────────────────────────────────────────────

    async fn request_stage_completion(&self, project_id: String, stage_id: String) -> RpcResult<RpcPendingCompletion> {
        let outcome = self.apply(Action::RequestStageCompletion {
            project: ProjectId::new(project_id),
            stage: StageId::new(stage_id),
        })?;
        let (project, stage) = match outcome {
            Outcome::CompletionRequested { project, stage } => (project, stage),
            other => return Err(unexpected(&other)),
        };
        let stage_name = self
            .state
            .engine
            .get_project(&project)
            .map_err(domain_err)?
            .stage(&stage)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        Ok(RpcPendingCompletion {
            project_id: project.to_string(),
            stage_id: stage.to_string(),
            stage_name,
        })
    }

    async fn confirm_stage_completion(&self, project_id: String, stage_id: String) -> RpcResult<RpcProject> {
        self.apply_project(Action::ConfirmStageCompletion {
            project: ProjectId::new(project_id),
            stage: StageId::new(stage_id),
        })
    }

    async fn cancel_stage_completion(&self) -> RpcResult<Option<String>> {
        match self.apply(Action::CancelStageCompletion)? {
            Outcome::CompletionCancelled { stage } => Ok(stage.map(|s| s.to_string())),
            other => Err(unexpected(&other)),
        }
    }

    // ── Proposals & updates ──────────────────────────────────────────────────

    async fn submit_proposal(&self, draft: ProposalDraft) -> RpcResult<RpcProject> {
        self.apply_project(Action::SubmitProposal { draft })
    }

    async fn update_project_note(&self, project_id: String, text: String) -> RpcResult<RpcProject> {
        self.apply_project(Action::UpdateProjectNote { project: ProjectId::new(project_id), text })
    }

    async fn submit_status_post(
        &self,
        project_id: String,
        content: String,
        media: Vec<String>,
        status: PostStatus,
    ) -> RpcResult<RpcStatusPost> {
        let outcome = self.apply(Action::SubmitStatusPost {
            project: ProjectId::new(project_id),
            content,
            media: media.into_iter().map(MediaRef::new).collect(),
            status,
        })?;
        match outcome {
            Outcome::StatusPosted { post, funding_post } => Ok(RpcStatusPost {
                post,
                funding_post: funding_post.as_ref().map(|p| self.card(p)),
            }),
            other => Err(unexpected(&other)),
        }
    }

    // ── Collection ───────────────────────────────────────────────────────────

    async fn get_collection(&self) -> RpcResult<RpcCollection> {
        self.state
            .engine
            .collection(self.user())
            .map(RpcCollection::from)
            .map_err(domain_err)
    }

    async fn evolve_companion(&self, companion_id: String) -> RpcResult<Companion> {
        match self.apply(Action::EvolveCompanion { companion: CompanionId::new(companion_id) })? {
            Outcome::Evolved { companion } => Ok(companion),
            other => Err(unexpected(&other)),
        }
    }

    async fn pull_gacha(&self) -> RpcResult<PullOutcome> {
        self.state
            .engine
            .pull_gacha(self.user(), now())
            .await
            .map_err(domain_err)
    }

    async fn record_activity(&self, category: BadgeCategory, theme: Option<CompanionTheme>) -> RpcResult<Vec<String>> {
        match self.apply(Action::RecordActivity { category, theme })? {
            Outcome::Activity { newly_earned } => Ok(newly_earned.iter().map(ToString::to_string).collect()),
            other => Err(unexpected(&other)),
        }
    }

    // ── Profile ──────────────────────────────────────────────────────────────

    async fn get_profile(&self) -> RpcResult<RpcProfile> {
        let engine = &self.state.engine;
        let profile = engine.profile(self.user()).map_err(domain_err)?;
        let projects = engine.list_user_projects(self.user()).map_err(domain_err)?;
        let collection = engine.collection(self.user()).map_err(domain_err)?;
        Ok(RpcProfile {
            profile,
            projects: projects.len(),
            earned_badges: collection.earned_count(),
            companions_collected: collection.companions.iter().filter(|c| c.unlocked).count(),
            gacha_tokens: collection.gacha_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundflow_core::error::{StateConflict, ValidationError};

    #[test]
    fn error_codes_follow_kind() {
        let cases = [
            (FundflowError::from(ValidationError::InvalidAmount), ERR_VALIDATION),
            (StateConflict::LastStage.into(), ERR_STATE_CONFLICT),
            (FundflowError::InsufficientTokens { need: 1, have: 0 }, ERR_INSUFFICIENT),
            (FundflowError::PullInProgress, ERR_PULL_IN_PROGRESS),
            (FundflowError::UnknownPost("9".into()), ERR_NOT_FOUND),
            (FundflowError::Storage("x".into()), ERR_INTERNAL),
        ];
        for (err, code) in cases {
            let msg = err.to_string();
            let obj = domain_err(err);
            assert_eq!(obj.code(), code);
            assert_eq!(obj.message(), msg);
        }
    }
}
