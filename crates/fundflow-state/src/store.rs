use std::collections::{BTreeMap, HashMap};

use fundflow_core::collection::Collection;
use fundflow_core::error::{FundflowError, StateConflict};
use fundflow_core::feed::{FundingPost, StatusPost};
use fundflow_core::project::Project;
use fundflow_core::types::{PostId, ProjectId, StageId, UserId, UserProfile};

use crate::progression::CollectionLedger;

/// In-memory session state. Nothing here outlives the process: a restart
/// resets everything to the seed.
///
/// Collections (analogous to tables):
///   users        — UserId    → UserProfile
///   projects     — insertion-ordered Vec<Project>
///   feed         — newest-first Vec<FundingPost>
///   status_posts — insertion-ordered Vec<StatusPost>
///   ledgers      — UserId    → CollectionLedger
///   completions  — UserId    → the one stage awaiting completion confirmation
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    users: BTreeMap<UserId, UserProfile>,
    projects: Vec<Project>,
    feed: Vec<FundingPost>,
    status_posts: Vec<StatusPost>,
    ledgers: HashMap<UserId, CollectionLedger>,
    completions: HashMap<UserId, (ProjectId, StageId)>,
    next_seq: u64,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh identifier, unique within this store: `"{prefix}-{n}"`.
    pub fn next_id(&mut self, prefix: &str) -> String {
        self.next_seq += 1;
        format!("{prefix}-{}", self.next_seq)
    }

    // ── Users ────────────────────────────────────────────────────────────────

    pub fn put_user(&mut self, profile: UserProfile) {
        self.users.insert(profile.id.clone(), profile);
    }

    pub fn get_user(&self, id: &UserId) -> Result<&UserProfile, FundflowError> {
        self.users
            .get(id)
            .ok_or_else(|| FundflowError::UnknownUser(id.to_string()))
    }

    // ── Projects ─────────────────────────────────────────────────────────────

    /// Insert or replace by id, keeping the original position on replace.
    pub fn put_project(&mut self, project: Project) {
        match self.projects.iter_mut().find(|p| p.id == project.id) {
            Some(slot) => *slot = project,
            None => self.projects.push(project),
        }
    }

    pub fn get_project(&self, id: &ProjectId) -> Result<&Project, FundflowError> {
        self.projects
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| FundflowError::UnknownProject(id.to_string()))
    }

    /// Like `get_project`, but only for projects `user` owns.
    pub fn get_owned_project(&self, user: &UserId, id: &ProjectId) -> Result<&Project, FundflowError> {
        let project = self.get_project(id)?;
        if &project.owner != user {
            return Err(StateConflict::NotProjectOwner(id.to_string()).into());
        }
        Ok(project)
    }

    pub fn projects_for_owner(&self, owner: &UserId) -> Vec<Project> {
        self.projects
            .iter()
            .filter(|p| &p.owner == owner)
            .cloned()
            .collect()
    }

    // ── Feed ─────────────────────────────────────────────────────────────────

    /// Put a new post at the top of the feed.
    pub fn publish_post(&mut self, post: FundingPost) {
        self.feed.insert(0, post);
    }

    /// Append in display order (seeding).
    pub fn append_post(&mut self, post: FundingPost) {
        self.feed.push(post);
    }

    /// Replace an existing post in place.
    pub fn put_post(&mut self, post: FundingPost) -> Result<(), FundflowError> {
        let slot = self
            .feed
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or_else(|| FundflowError::UnknownPost(post.id.to_string()))?;
        *slot = post;
        Ok(())
    }

    pub fn get_post(&self, id: &PostId) -> Result<&FundingPost, FundflowError> {
        self.feed
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| FundflowError::UnknownPost(id.to_string()))
    }

    pub fn feed(&self) -> &[FundingPost] {
        &self.feed
    }

    // ── Status posts ─────────────────────────────────────────────────────────

    pub fn put_status_post(&mut self, post: StatusPost) {
        self.status_posts.push(post);
    }

    pub fn status_posts_for(&self, project: &ProjectId) -> Vec<StatusPost> {
        self.status_posts
            .iter()
            .filter(|p| &p.project_id == project)
            .cloned()
            .collect()
    }

    // ── Collections ──────────────────────────────────────────────────────────

    pub fn put_collection(&mut self, user: UserId, baseline: Collection) {
        self.ledgers.insert(user, CollectionLedger::new(baseline));
    }

    pub fn get_ledger(&self, user: &UserId) -> Result<&CollectionLedger, FundflowError> {
        self.ledgers
            .get(user)
            .ok_or_else(|| FundflowError::UnknownUser(user.to_string()))
    }

    pub fn put_ledger(&mut self, user: UserId, ledger: CollectionLedger) {
        self.ledgers.insert(user, ledger);
    }

    // ── Pending completions ──────────────────────────────────────────────────

    pub fn pending_completion(&self, user: &UserId) -> Option<&(ProjectId, StageId)> {
        self.completions.get(user)
    }

    pub fn set_pending_completion(&mut self, user: UserId, project: ProjectId, stage: StageId) {
        self.completions.insert(user, (project, stage));
    }

    pub fn take_pending_completion(&mut self, user: &UserId) -> Option<(ProjectId, StageId)> {
        self.completions.remove(user)
    }
}
