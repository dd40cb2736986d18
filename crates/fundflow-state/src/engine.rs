use std::collections::HashSet;
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use fundflow_core::action::{Action, Outcome};
use fundflow_core::collection::{BadgeCategory, Collection, CompanionTheme};
use fundflow_core::error::{FundflowError, StateConflict, ValidationError};
use fundflow_core::feed::{FundingPost, PostStatus, StatusPost};
use fundflow_core::project::{Project, Stage, StageStatus};
use fundflow_core::types::{
    Amount, BadgeId, PostId, ProjectId, StageId, Timestamp, UserId, UserProfile,
};

use crate::config::EngineConfig;
use crate::progression::{CollectionEvent, CollectionLedger};
use crate::store::StateStore;
use crate::validation::{
    validate_contribution, validate_project, validate_project_note, validate_proposal,
    validate_status_post,
};

// ── Staged mutations ──────────────────────────────────────────────────────────

enum CompletionChange {
    Set(ProjectId, StageId),
    Clear,
}

/// All state changes staged by an action before atomic commit.
#[derive(Default)]
struct StagedMutations {
    posts: Vec<FundingPost>,
    projects: Vec<Project>,
    published: Vec<FundingPost>,
    status_posts: Vec<StatusPost>,
    ledger: Option<CollectionLedger>,
    completion: Option<CompletionChange>,
}

impl StagedMutations {
    fn commit(self, store: &mut StateStore, user: &UserId) -> Result<(), FundflowError> {
        // Replacements first: the only fallible write, so a failure commits nothing.
        for post in &self.posts {
            store.get_post(&post.id)?;
        }
        for post in self.posts {
            store.put_post(post)?;
        }
        for p in self.projects {
            store.put_project(p);
        }
        for post in self.published {
            store.publish_post(post);
        }
        for sp in self.status_posts {
            store.put_status_post(sp);
        }
        if let Some(ledger) = self.ledger {
            store.put_ledger(user.clone(), ledger);
        }
        match self.completion {
            Some(CompletionChange::Set(project, stage)) => {
                store.set_pending_completion(user.clone(), project, stage)
            }
            Some(CompletionChange::Clear) => {
                store.take_pending_completion(user);
            }
            None => {}
        }
        Ok(())
    }
}

// ── LifecycleEngine ───────────────────────────────────────────────────────────

/// The project lifecycle engine.
///
/// Owns the session state and applies user actions to it. Each `apply` call
/// is atomic: the action is staged against copies and committed only if
/// every step succeeds.
pub struct LifecycleEngine {
    store: RwLock<StateStore>,
    pub(crate) config: EngineConfig,
    pub(crate) rng: Mutex<StdRng>,
    pub(crate) pulls_in_flight: Mutex<HashSet<UserId>>,
}

impl LifecycleEngine {
    pub fn new(store: StateStore, config: EngineConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(store, config, rng)
    }

    /// Build an engine around an explicit gacha randomness source.
    pub fn with_rng(store: StateStore, config: EngineConfig, rng: StdRng) -> Self {
        Self {
            store: RwLock::new(store),
            config,
            rng: Mutex::new(rng),
            pulls_in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, StateStore>, FundflowError> {
        self.store
            .read()
            .map_err(|_| FundflowError::Storage("state lock poisoned".into()))
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, StateStore>, FundflowError> {
        self.store
            .write()
            .map_err(|_| FundflowError::Storage("state lock poisoned".into()))
    }

    /// Validate and apply one user action.
    pub fn apply(&self, user: &UserId, action: Action, now: Timestamp) -> Result<Outcome, FundflowError> {
        let name = action.name();
        let mut store = self.write()?;

        let result = Self::apply_staged(&mut store, user, action, now);

        match &result {
            Ok(_) => info!(%user, action = name, "applied action"),
            Err(e) => warn!(%user, action = name, error = %e, "action rejected"),
        }
        result
    }

    fn apply_staged(
        store: &mut StateStore,
        user: &UserId,
        action: Action,
        now: Timestamp,
    ) -> Result<Outcome, FundflowError> {
        store.get_user(user)?;
        let mut staged = StagedMutations::default();
        let outcome = Self::stage_action(store, user, action, now, &mut staged)?;
        staged.commit(store, user)?;
        Ok(outcome)
    }

    // ── Action dispatch ───────────────────────────────────────────────────────

    fn stage_action(
        store: &mut StateStore,
        user: &UserId,
        action: Action,
        now: Timestamp,
        staged: &mut StagedMutations,
    ) -> Result<Outcome, FundflowError> {
        match action {
            // ── Stage editing ────────────────────────────────────────────────
            Action::AddStage { project } => {
                let mut p = store.get_owned_project(user, &project)?.clone();
                let id = StageId::new(store.next_id("stage"));
                p.add_stage(id);
                staged.projects.push(p.clone());
                Ok(Outcome::Project { project: p })
            }

            Action::RemoveStage { project, stage } => {
                let mut p = store.get_owned_project(user, &project)?.clone();
                p.remove_stage(&stage)?;
                if store.pending_completion(user) == Some(&(project, stage)) {
                    staged.completion = Some(CompletionChange::Clear);
                }
                staged.projects.push(p.clone());
                Ok(Outcome::Project { project: p })
            }

            Action::UpdateStage { project, stage, field } => {
                let mut p = store.get_owned_project(user, &project)?.clone();
                p.update_stage_field(&stage, field)?;
                staged.projects.push(p.clone());
                Ok(Outcome::Project { project: p })
            }

            // ── Stage lifecycle ──────────────────────────────────────────────
            Action::StartStage { project, stage } => {
                let mut p = store.get_owned_project(user, &project)?.clone();
                p.start_stage(&stage)?;
                staged.projects.push(p.clone());
                Ok(Outcome::Project { project: p })
            }

            Action::RequestStageCompletion { project, stage } => {
                store.get_owned_project(user, &project)?.ensure_completable(&stage)?;
                staged.completion = Some(CompletionChange::Set(project.clone(), stage.clone()));
                Ok(Outcome::CompletionRequested { project, stage })
            }

            Action::ConfirmStageCompletion { project, stage } => {
                let requested = matches!(
                    store.pending_completion(user),
                    Some((p, s)) if *p == project && *s == stage
                );
                if !requested {
                    return Err(StateConflict::NoPendingConfirmation(stage.to_string()).into());
                }
                let mut p = store.get_owned_project(user, &project)?.clone();
                p.complete_stage(&stage)?;
                staged.completion = Some(CompletionChange::Clear);
                Self::stage_activity(store, user, staged, BadgeCategory::Project, None, now)?;
                info!(project = %project, stage = %stage, "stage completed");
                staged.projects.push(p.clone());
                Ok(Outcome::Project { project: p })
            }

            Action::CancelStageCompletion => {
                let stage = store.pending_completion(user).map(|(_, s)| s.clone());
                staged.completion = Some(CompletionChange::Clear);
                Ok(Outcome::CompletionCancelled { stage })
            }

            // ── Projects & posts ─────────────────────────────────────────────
            Action::SaveProject { project } => {
                let mut project = validate_project(project)?;
                let stored = store.get_owned_project(user, &project.id)?;
                if project.owner != stored.owner {
                    return Err(StateConflict::NotProjectOwner(project.id.to_string()).into());
                }
                stored.ensure_edit_preserves_lifecycle(&project)?;

                // Contributions are never editable.
                for s in &mut project.stages {
                    s.raised = stored.stage(&s.id).map_or(0, |old| old.raised);
                }
                if let Some((p, s)) = store.pending_completion(user) {
                    if *p == project.id && project.stage(s).is_none() {
                        staged.completion = Some(CompletionChange::Clear);
                    }
                }
                staged.projects.push(project.clone());
                Ok(Outcome::Project { project })
            }

            Action::SubmitProposal { draft } => {
                validate_proposal(&draft)?;
                let id = ProjectId::new(store.next_id("project"));
                let stages = draft
                    .stages
                    .into_iter()
                    .map(|d| Stage {
                        id: StageId::new(store.next_id("stage")),
                        name: d.name,
                        description: d.description,
                        funding_amount: d.funding_amount,
                        status: StageStatus::Pending,
                        raised: 0,
                    })
                    .collect();
                let project = Project {
                    id,
                    owner: user.clone(),
                    title: draft.title,
                    overview: draft.overview,
                    stages,
                    latest_update: None,
                };
                info!(project = %project.id, stages = project.stages.len(), "proposal submitted");
                staged.projects.push(project.clone());
                Ok(Outcome::Project { project })
            }

            Action::UpdateProjectNote { project, text } => {
                validate_project_note(&text)?;
                let mut p = store.get_owned_project(user, &project)?.clone();
                p.latest_update = Some(text);
                staged.projects.push(p.clone());
                Ok(Outcome::Project { project: p })
            }

            Action::SubmitStatusPost { project, content, media, status } => {
                validate_status_post(&project, &content, &media)?;
                let mut p = match store.get_owned_project(user, &project) {
                    Ok(p) => p.clone(),
                    Err(FundflowError::UnknownProject(_)) => {
                        return Err(ValidationError::MissingProject.into())
                    }
                    Err(e) => return Err(e),
                };
                let author = store.get_user(user)?.clone();

                let post = StatusPost {
                    id: PostId::new(store.next_id("post")),
                    project_id: project.clone(),
                    author: user.clone(),
                    content: content.clone(),
                    media,
                    status,
                    created_at: now,
                };
                p.latest_update = Some(content.clone());

                let funding_post = match (status, p.current_stage()) {
                    (PostStatus::NeedFund, Some(stage)) => Some(FundingPost {
                        id: PostId::new(store.next_id("post")),
                        author: author.display_name.clone(),
                        avatar: author.initials.clone(),
                        project_title: p.title.clone(),
                        stage_label: p.current_stage_label(),
                        description: content,
                        funding_goal: stage.funding_amount,
                        current_funding: stage.raised,
                        likes: 0,
                        comments: 0,
                        timestamp: now,
                        project_id: Some(p.id.clone()),
                        stage_id: Some(stage.id.clone()),
                        liked_by: Vec::new(),
                    }),
                    _ => None,
                };

                Self::stage_activity(store, user, staged, BadgeCategory::Community, None, now)?;
                staged.projects.push(p);
                staged.status_posts.push(post.clone());
                if let Some(fp) = &funding_post {
                    staged.published.push(fp.clone());
                }
                Ok(Outcome::StatusPosted { post, funding_post })
            }

            // ── Feed ─────────────────────────────────────────────────────────
            Action::Contribute { post, amount, payment_method } => {
                validate_contribution(amount, &payment_method)?;
                let mut fp = store.get_post(&post)?.clone();

                if let (Some(pid), Some(sid)) = (&fp.project_id, &fp.stage_id) {
                    let mut p = store.get_project(pid)?.clone();
                    p.ensure_fundable(sid)?;
                    p.record_raised(sid, amount)?;
                    staged.projects.push(p);
                }
                fp.current_funding = fp.current_funding.saturating_add(amount);

                Self::stage_activity(store, user, staged, BadgeCategory::Funding, None, now)?;
                info!(post = %fp.id, amount, current = fp.current_funding, "contribution recorded");
                staged.posts.push(fp.clone());
                Ok(Outcome::Contribution {
                    funding_percentage: fp.funding_percentage(),
                    post: fp,
                    amount,
                })
            }

            Action::ToggleLike { post } => {
                let mut fp = store.get_post(&post)?.clone();
                fp.toggle_like(user);
                staged.posts.push(fp.clone());
                Ok(Outcome::Post { post: fp })
            }

            // ── Collection ───────────────────────────────────────────────────
            Action::RecordActivity { category, theme } => {
                let mut ledger = store.get_ledger(user)?.clone();
                let newly_earned = ledger.record(CollectionEvent::Activity { category, theme, at: now })?;
                staged.ledger = Some(ledger);
                Ok(Outcome::Activity { newly_earned })
            }

            Action::EvolveCompanion { companion } => {
                let mut ledger = store.get_ledger(user)?.clone();
                ledger.record(CollectionEvent::Evolved { companion: companion.clone() })?;
                let evolved = ledger
                    .state()
                    .companion(&companion)
                    .cloned()
                    .ok_or_else(|| FundflowError::UnknownCompanion(companion.to_string()))?;
                info!(companion = %companion, stage = %evolved.stage, "companion evolved");
                staged.ledger = Some(ledger);
                Ok(Outcome::Evolved { companion: evolved })
            }
        }
    }

    /// Feed a qualifying action to the user's progression ledger, if the user
    /// keeps a collection.
    fn stage_activity(
        store: &StateStore,
        user: &UserId,
        staged: &mut StagedMutations,
        category: BadgeCategory,
        theme: Option<CompanionTheme>,
        at: Timestamp,
    ) -> Result<Vec<BadgeId>, FundflowError> {
        let mut ledger = match staged.ledger.take() {
            Some(l) => l,
            None => match store.get_ledger(user) {
                Ok(l) => l.clone(),
                Err(_) => return Ok(Vec::new()),
            },
        };
        let earned = ledger.record(CollectionEvent::Activity { category, theme, at })?;
        staged.ledger = Some(ledger);
        Ok(earned)
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn list_feed(&self) -> Result<Vec<FundingPost>, FundflowError> {
        Ok(self.read()?.feed().to_vec())
    }

    pub fn get_post(&self, id: &PostId) -> Result<FundingPost, FundflowError> {
        self.read()?.get_post(id).cloned()
    }

    pub fn list_user_projects(&self, user: &UserId) -> Result<Vec<Project>, FundflowError> {
        let store = self.read()?;
        store.get_user(user)?;
        Ok(store.projects_for_owner(user))
    }

    pub fn get_project(&self, id: &ProjectId) -> Result<Project, FundflowError> {
        self.read()?.get_project(id).cloned()
    }

    pub fn total_funding_required(&self, id: &ProjectId) -> Result<Amount, FundflowError> {
        Ok(self.read()?.get_project(id)?.total_funding_required())
    }

    pub fn list_status_posts(&self, project: &ProjectId) -> Result<Vec<StatusPost>, FundflowError> {
        let store = self.read()?;
        store.get_project(project)?;
        Ok(store.status_posts_for(project))
    }

    pub fn profile(&self, user: &UserId) -> Result<UserProfile, FundflowError> {
        self.read()?.get_user(user).cloned()
    }

    pub fn collection(&self, user: &UserId) -> Result<Collection, FundflowError> {
        Ok(self.read()?.get_ledger(user)?.state().clone())
    }

    pub fn collection_log(&self, user: &UserId) -> Result<Vec<CollectionEvent>, FundflowError> {
        Ok(self.read()?.get_ledger(user)?.log().to_vec())
    }

    /// Rebuild the user's collection from seed and event log.
    pub fn replay_collection(&self, user: &UserId) -> Result<Collection, FundflowError> {
        self.read()?.get_ledger(user)?.replay()
    }

    pub fn pending_completion(&self, user: &UserId) -> Result<Option<(ProjectId, StageId)>, FundflowError> {
        Ok(self.read()?.pending_completion(user).cloned())
    }
}
