//! Projects and their ordered funding stages.
//!
//! A project moves through its stages strictly in order: stage N+1 may only
//! start, complete or receive funding once every earlier stage is completed.
//! Completed stages are locked: no edit, no removal, no status change.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{FundflowError, StateConflict};
use crate::types::{Amount, ProjectId, StageId, UserId};

// ── StageStatus ──────────────────────────────────────────────────────────────

/// Linear stage lifecycle: `Pending → InProgress → Completed`.
/// `Pending → Completed` is also allowed; nothing ever moves backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageStatus {
    Pending,
    InProgress,
    Completed,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StageStatus::Pending => "pending",
            StageStatus::InProgress => "in-progress",
            StageStatus::Completed => "completed",
        })
    }
}

// ── Stage ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    pub description: String,
    /// Funding requested for this stage. Must be > 0 to pass validation.
    pub funding_amount: Amount,
    pub status: StageStatus,
    /// Contributions received through feed posts linked to this stage.
    #[serde(default)]
    pub raised: Amount,
}

impl Stage {
    /// A blank pending stage, as appended by "add stage".
    pub fn new(id: StageId) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            funding_amount: 0,
            status: StageStatus::Pending,
            raised: 0,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == StageStatus::Completed
    }

    /// Same user-editable content, ignoring `raised`.
    fn same_content(&self, other: &Stage) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.description == other.description
            && self.funding_amount == other.funding_amount
            && self.status == other.status
    }
}

/// A single user-editable stage field together with its new value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum StageField {
    Name(String),
    Description(String),
    FundingAmount(Amount),
}

// ── Derived project views ────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectPhase {
    Proposal,
    InProgress,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FundingStatus {
    Funded,
    Waiting,
}

// ── Project ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub owner: UserId,
    pub title: String,
    pub overview: String,
    /// Ordered; never empty once the project exists.
    pub stages: Vec<Stage>,
    /// Most recent status update posted by the owner.
    #[serde(default)]
    pub latest_update: Option<String>,
}

impl Project {
    /// Sum of `funding_amount` across all stages. Recomputed on every call.
    pub fn total_funding_required(&self) -> Amount {
        self.stages.iter().map(|s| s.funding_amount).sum()
    }

    pub fn stage(&self, id: &StageId) -> Option<&Stage> {
        self.stages.iter().find(|s| &s.id == id)
    }

    fn stage_index(&self, id: &StageId) -> Result<usize, FundflowError> {
        self.stages
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| FundflowError::UnknownStage(id.to_string()))
    }

    /// The first stage that is not completed, if any.
    pub fn current_stage(&self) -> Option<&Stage> {
        self.stages.iter().find(|s| !s.is_completed())
    }

    pub fn in_progress_stage(&self) -> Option<&Stage> {
        self.stages
            .iter()
            .find(|s| s.status == StageStatus::InProgress)
    }

    pub fn phase(&self) -> ProjectPhase {
        if !self.stages.is_empty() && self.stages.iter().all(Stage::is_completed) {
            ProjectPhase::Done
        } else if self
            .stages
            .iter()
            .any(|s| s.status != StageStatus::Pending)
        {
            ProjectPhase::InProgress
        } else {
            ProjectPhase::Proposal
        }
    }

    pub fn funding_status(&self) -> FundingStatus {
        match self.current_stage() {
            Some(s) if s.funding_amount > 0 && s.raised >= s.funding_amount => FundingStatus::Funded,
            Some(_) => FundingStatus::Waiting,
            None => FundingStatus::Funded,
        }
    }

    /// Human label for the current stage, e.g. "Stage 2: Planting Phase".
    pub fn current_stage_label(&self) -> String {
        match self.stages.iter().position(|s| !s.is_completed()) {
            Some(i) => format!("Stage {}: {}", i + 1, self.stages[i].name),
            None => "Completed".to_string(),
        }
    }

    // ── Stage mutations ──────────────────────────────────────────────────────

    /// Append a blank pending stage. There is no upper bound on stage count.
    pub fn add_stage(&mut self, id: StageId) -> &Stage {
        self.stages.push(Stage::new(id));
        &self.stages[self.stages.len() - 1]
    }

    pub fn remove_stage(&mut self, id: &StageId) -> Result<Stage, FundflowError> {
        let idx = self.stage_index(id)?;
        if self.stages[idx].is_completed() {
            return Err(StateConflict::StageLocked(id.to_string()).into());
        }
        if self.stages.len() == 1 {
            return Err(StateConflict::LastStage.into());
        }
        Ok(self.stages.remove(idx))
    }

    pub fn update_stage_field(&mut self, id: &StageId, field: StageField) -> Result<(), FundflowError> {
        let idx = self.stage_index(id)?;
        let stage = &mut self.stages[idx];
        if stage.is_completed() {
            return Err(StateConflict::StageLocked(id.to_string()).into());
        }
        match field {
            StageField::Name(v) => stage.name = v,
            StageField::Description(v) => stage.description = v,
            StageField::FundingAmount(v) => stage.funding_amount = v,
        }
        Ok(())
    }

    /// Explicit `Pending → InProgress`.
    pub fn start_stage(&mut self, id: &StageId) -> Result<(), FundflowError> {
        let idx = self.stage_index(id)?;
        let status = self.stages[idx].status;
        if status != StageStatus::Pending {
            return Err(StateConflict::StageNotPending { stage: id.to_string(), status }.into());
        }
        self.ensure_predecessors_completed(idx)?;
        if let Some(active) = self.in_progress_stage() {
            return Err(StateConflict::StageAlreadyInProgress(active.id.to_string()).into());
        }
        self.stages[idx].status = StageStatus::InProgress;
        Ok(())
    }

    /// Check that `id` may be marked completed, without changing anything.
    pub fn ensure_completable(&self, id: &StageId) -> Result<(), FundflowError> {
        let idx = self.stage_index(id)?;
        if self.stages[idx].is_completed() {
            return Err(StateConflict::StageLocked(id.to_string()).into());
        }
        self.ensure_predecessors_completed(idx)
    }

    /// Irreversible `Pending | InProgress → Completed`. Unlocks funding for
    /// the next stage in sequence.
    pub fn complete_stage(&mut self, id: &StageId) -> Result<(), FundflowError> {
        self.ensure_completable(id)?;
        let idx = self.stage_index(id)?;
        self.stages[idx].status = StageStatus::Completed;
        Ok(())
    }

    /// A stage is open for funding when it is not completed and every
    /// earlier stage is.
    pub fn ensure_fundable(&self, id: &StageId) -> Result<(), FundflowError> {
        let idx = self.stage_index(id)?;
        let open = !self.stages[idx].is_completed()
            && self.stages[..idx].iter().all(Stage::is_completed);
        if !open {
            return Err(StateConflict::StageNotFundable(id.to_string()).into());
        }
        Ok(())
    }

    pub fn record_raised(&mut self, id: &StageId, amount: Amount) -> Result<(), FundflowError> {
        let idx = self.stage_index(id)?;
        self.stages[idx].raised = self.stages[idx].raised.saturating_add(amount);
        Ok(())
    }

    fn ensure_predecessors_completed(&self, idx: usize) -> Result<(), FundflowError> {
        if self.stages[..idx].iter().all(Stage::is_completed) {
            Ok(())
        } else {
            Err(StateConflict::StageOutOfOrder(self.stages[idx].id.to_string()).into())
        }
    }

    /// Reject an incoming edited copy that would alter locked history or move
    /// a stage status outside its lifecycle operations.
    ///
    /// Completed stages must keep their exact position and content. Surviving
    /// open stages keep their relative order; new stages land after the
    /// completed prefix.
    pub fn ensure_edit_preserves_lifecycle(&self, edited: &Project) -> Result<(), FundflowError> {
        let mut seen = HashSet::new();
        for s in &edited.stages {
            if !seen.insert(&s.id) {
                return Err(StateConflict::DuplicateStage(s.id.to_string()).into());
            }
        }

        for (idx, stored) in self.stages.iter().enumerate() {
            if stored.is_completed() {
                match edited.stages.get(idx) {
                    Some(s) if s.same_content(stored) => continue,
                    _ if edited.stage(&stored.id).is_some_and(|s| s.same_content(stored)) => {
                        return Err(StateConflict::StageReordered(stored.id.to_string()).into());
                    }
                    _ => return Err(StateConflict::StageLocked(stored.id.to_string()).into()),
                }
            }
            if let Some(s) = edited.stage(&stored.id) {
                if s.status != stored.status {
                    return Err(StateConflict::StatusChangeNotAllowed(s.id.to_string()).into());
                }
            }
        }

        let mut last = None;
        for s in &edited.stages {
            match self.stage_index(&s.id) {
                Ok(idx) => {
                    if last.is_some_and(|prev| idx < prev) {
                        return Err(StateConflict::StageReordered(s.id.to_string()).into());
                    }
                    last = Some(idx);
                }
                Err(_) if s.status != StageStatus::Pending => {
                    return Err(StateConflict::StatusChangeNotAllowed(s.id.to_string()).into());
                }
                Err(_) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dollars;

    fn stage(id: &str, amount: u64, status: StageStatus) -> Stage {
        Stage {
            id: StageId::from(id),
            name: format!("stage {id}"),
            description: "work".into(),
            funding_amount: dollars(amount),
            status,
            raised: 0,
        }
    }

    fn garden() -> Project {
        Project {
            id: ProjectId::from("p1"),
            owner: UserId::from("jane"),
            title: "Community Garden Project".into(),
            overview: "Grow food together".into(),
            stages: vec![
                stage("s1", 3000, StageStatus::Completed),
                stage("s2", 2500, StageStatus::InProgress),
                stage("s3", 2000, StageStatus::Pending),
            ],
            latest_update: None,
        }
    }

    #[test]
    fn total_funding_sums_all_stages() {
        assert_eq!(garden().total_funding_required(), dollars(7500));
    }

    #[test]
    fn total_tracks_add_update_remove() {
        let mut p = garden();
        let id = p.add_stage(StageId::from("s4")).id.clone();
        assert_eq!(p.total_funding_required(), dollars(7500));
        p.update_stage_field(&id, StageField::FundingAmount(dollars(500))).unwrap();
        assert_eq!(p.total_funding_required(), dollars(8000));
        p.remove_stage(&StageId::from("s3")).unwrap();
        assert_eq!(p.total_funding_required(), dollars(6000));
    }

    #[test]
    fn completed_stage_is_locked() {
        let mut p = garden();
        let s1 = StageId::from("s1");
        let err = p.update_stage_field(&s1, StageField::Name("x".into())).unwrap_err();
        assert!(matches!(err, FundflowError::StateConflict(StateConflict::StageLocked(_))));
        let err = p.remove_stage(&s1).unwrap_err();
        assert!(matches!(err, FundflowError::StateConflict(StateConflict::StageLocked(_))));
        assert_eq!(p, garden());
    }

    #[test]
    fn last_stage_cannot_be_removed_even_if_pending() {
        let mut p = garden();
        p.stages = vec![stage("only", 10, StageStatus::Pending)];
        let err = p.remove_stage(&StageId::from("only")).unwrap_err();
        assert!(matches!(err, FundflowError::StateConflict(StateConflict::LastStage)));
        assert_eq!(p.stages.len(), 1);
    }

    #[test]
    fn start_requires_order_and_single_active_stage() {
        let mut p = garden();
        let err = p.start_stage(&StageId::from("s3")).unwrap_err();
        assert!(matches!(err, FundflowError::StateConflict(StateConflict::StageOutOfOrder(_))));

        p.complete_stage(&StageId::from("s2")).unwrap();
        p.start_stage(&StageId::from("s3")).unwrap();
        assert_eq!(p.in_progress_stage().unwrap().id, StageId::from("s3"));

        let err = p.start_stage(&StageId::from("s3")).unwrap_err();
        assert!(matches!(
            err,
            FundflowError::StateConflict(StateConflict::StageNotPending { status: StageStatus::InProgress, .. })
        ));
    }

    #[test]
    fn second_stage_cannot_start_while_another_is_active() {
        let mut p = garden();
        p.stages[0].status = StageStatus::Pending;
        let err = p.start_stage(&StageId::from("s1")).unwrap_err();
        assert!(matches!(
            err,
            FundflowError::StateConflict(StateConflict::StageAlreadyInProgress(ref id)) if id == "s2"
        ));
    }

    #[test]
    fn completion_is_ordered_and_irreversible() {
        let mut p = garden();
        let err = p.complete_stage(&StageId::from("s3")).unwrap_err();
        assert!(matches!(err, FundflowError::StateConflict(StateConflict::StageOutOfOrder(_))));

        p.complete_stage(&StageId::from("s2")).unwrap();
        let err = p.complete_stage(&StageId::from("s2")).unwrap_err();
        assert!(matches!(err, FundflowError::StateConflict(StateConflict::StageLocked(_))));
        p.complete_stage(&StageId::from("s3")).unwrap();
        assert_eq!(p.phase(), ProjectPhase::Done);
    }

    #[test]
    fn funding_opens_for_next_stage_after_completion() {
        let mut p = garden();
        assert!(p.ensure_fundable(&StageId::from("s1")).is_err());
        assert!(p.ensure_fundable(&StageId::from("s2")).is_ok());
        assert!(p.ensure_fundable(&StageId::from("s3")).is_err());
        p.complete_stage(&StageId::from("s2")).unwrap();
        assert!(p.ensure_fundable(&StageId::from("s3")).is_ok());
    }

    #[test]
    fn phase_and_funding_status() {
        let mut p = garden();
        assert_eq!(p.phase(), ProjectPhase::InProgress);
        assert_eq!(p.funding_status(), FundingStatus::Waiting);
        assert_eq!(p.current_stage_label(), "Stage 2: stage s2");

        p.record_raised(&StageId::from("s2"), dollars(2500)).unwrap();
        assert_eq!(p.funding_status(), FundingStatus::Funded);

        for s in &mut p.stages {
            s.status = StageStatus::Pending;
        }
        assert_eq!(p.phase(), ProjectPhase::Proposal);
    }

    #[test]
    fn edits_cannot_rewrite_history() {
        let stored = garden();

        let mut edited = stored.clone();
        edited.stages[0].name = "renamed".into();
        assert!(stored.ensure_edit_preserves_lifecycle(&edited).is_err());

        let mut edited = stored.clone();
        edited.stages.remove(0);
        assert!(stored.ensure_edit_preserves_lifecycle(&edited).is_err());

        let mut edited = stored.clone();
        edited.stages[2].status = StageStatus::Completed;
        let err = stored.ensure_edit_preserves_lifecycle(&edited).unwrap_err();
        assert!(matches!(err, FundflowError::StateConflict(StateConflict::StatusChangeNotAllowed(_))));

        let mut edited = stored.clone();
        edited.stages[2].description = "new plan".into();
        edited.stages.push(Stage::new(StageId::from("s4")));
        assert!(stored.ensure_edit_preserves_lifecycle(&edited).is_ok());
    }

    #[test]
    fn edits_keep_stage_order_and_unique_ids() {
        let stored = garden();
        let conflict = |edited: &Project| match stored.ensure_edit_preserves_lifecycle(edited) {
            Err(FundflowError::StateConflict(c)) => c,
            other => panic!("expected a conflict, got {other:?}"),
        };

        let mut edited = stored.clone();
        edited.stages.rotate_left(1);
        assert_eq!(conflict(&edited), StateConflict::StageReordered("s1".into()));

        let mut edited = stored.clone();
        edited.stages.insert(0, Stage::new(StageId::from("s0")));
        assert_eq!(conflict(&edited), StateConflict::StageReordered("s1".into()));

        let mut edited = stored.clone();
        edited.stages.swap(1, 2);
        assert_eq!(conflict(&edited), StateConflict::StageReordered("s2".into()));

        let mut edited = stored.clone();
        edited.stages.push(edited.stages[2].clone());
        assert_eq!(conflict(&edited), StateConflict::DuplicateStage("s3".into()));

        let mut edited = stored.clone();
        edited.stages.insert(2, Stage::new(StageId::from("s2b")));
        assert!(stored.ensure_edit_preserves_lifecycle(&edited).is_ok());
    }
}
