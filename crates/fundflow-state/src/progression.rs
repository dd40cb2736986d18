//! Badge and companion progression as a read model over an event log.
//!
//! A user's collection is never edited directly. Each qualifying action is
//! appended to the ledger as a `CollectionEvent`, and the live `Collection`
//! is the fold of those events over the seed baseline. `replay` rebuilds it
//! from scratch and must always agree with the incrementally maintained
//! state.

use serde::{Deserialize, Serialize};
use tracing::debug;

use fundflow_core::collection::{BadgeCategory, Collection, CompanionStage, CompanionTheme};
use fundflow_core::constants::{GACHA_BONUS_PROGRESS, GACHA_PULL_COST};
use fundflow_core::error::FundflowError;
use fundflow_core::types::{BadgeId, CompanionId, Timestamp};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CollectionEvent {
    /// A qualifying user action. With a theme, only badges whose theme is
    /// unset or equal advance.
    Activity {
        category: BadgeCategory,
        theme: Option<CompanionTheme>,
        at: Timestamp,
    },
    TokenSpent { at: Timestamp },
    Unlocked { companion: CompanionId, at: Timestamp },
    Evolved { companion: CompanionId },
    /// Gacha fallback when nothing is left to unlock.
    BonusProgress { companions: Vec<CompanionId> },
}

/// Apply one event to `col`. On error `col` is left untouched.
/// Returns the badges this event earned.
pub fn apply_event(col: &mut Collection, event: &CollectionEvent) -> Result<Vec<BadgeId>, FundflowError> {
    match event {
        CollectionEvent::Activity { category, theme, at } => {
            let mut newly_earned = Vec::new();
            let mut earned_themes = Vec::new();
            for badge in col
                .badges
                .iter_mut()
                .filter(|b| !b.earned && b.category == *category)
                .filter(|b| match (theme, b.theme) {
                    (Some(t), Some(bt)) => *t == bt,
                    _ => true,
                })
            {
                if badge.record_progress(*at) {
                    newly_earned.push(badge.id.clone());
                    if let Some(t) = badge.theme {
                        earned_themes.push(t);
                    }
                }
            }
            for t in earned_themes {
                for c in col.companions.iter_mut().filter(|c| c.unlocked && c.theme == t) {
                    c.evolution_progress += 1;
                }
            }
            Ok(newly_earned)
        }

        CollectionEvent::TokenSpent { .. } => {
            if col.gacha_tokens < GACHA_PULL_COST {
                return Err(FundflowError::InsufficientTokens {
                    need: GACHA_PULL_COST,
                    have: col.gacha_tokens,
                });
            }
            col.gacha_tokens -= GACHA_PULL_COST;
            Ok(Vec::new())
        }

        CollectionEvent::Unlocked { companion, at } => {
            col.companion_mut(companion)?.unlock(*at);
            Ok(Vec::new())
        }

        CollectionEvent::Evolved { companion } => {
            col.companion_mut(companion)?.evolve()?;
            Ok(Vec::new())
        }

        CollectionEvent::BonusProgress { companions } => {
            // Resolve every id before touching anything.
            for id in companions {
                col.companion_mut(id)?;
            }
            for id in companions {
                col.companion_mut(id)?.evolution_progress += GACHA_BONUS_PROGRESS;
            }
            Ok(Vec::new())
        }
    }
}

/// Companions eligible for the gacha bonus: unlocked and not fully evolved.
pub fn bonus_targets(col: &Collection) -> Vec<CompanionId> {
    col.companions
        .iter()
        .filter(|c| c.unlocked && c.stage != CompanionStage::Adult)
        .map(|c| c.id.clone())
        .collect()
}

// ── CollectionLedger ─────────────────────────────────────────────────────────

/// One user's baseline collection, event log, and the folded live state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionLedger {
    baseline: Collection,
    log: Vec<CollectionEvent>,
    state: Collection,
}

impl CollectionLedger {
    pub fn new(baseline: Collection) -> Self {
        Self {
            state: baseline.clone(),
            baseline,
            log: Vec::new(),
        }
    }

    pub fn state(&self) -> &Collection {
        &self.state
    }

    pub fn log(&self) -> &[CollectionEvent] {
        &self.log
    }

    /// Apply `event` and append it to the log. Rejected events are not
    /// logged and leave the state unchanged.
    pub fn record(&mut self, event: CollectionEvent) -> Result<Vec<BadgeId>, FundflowError> {
        let mut next = self.state.clone();
        let earned = apply_event(&mut next, &event)?;
        debug!(?event, earned = earned.len(), "collection event recorded");
        self.state = next;
        self.log.push(event);
        Ok(earned)
    }

    /// Rebuild the collection from the baseline and the full log.
    pub fn replay(&self) -> Result<Collection, FundflowError> {
        let mut col = self.baseline.clone();
        for event in &self.log {
            apply_event(&mut col, event)?;
        }
        Ok(col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundflow_core::collection::{BadgeAchievement, BadgeTier, Companion};

    fn badge(id: &str, category: BadgeCategory, theme: Option<CompanionTheme>, progress: u32, required: u32) -> BadgeAchievement {
        BadgeAchievement {
            id: BadgeId::from(id),
            name: id.to_string(),
            description: String::new(),
            tier: BadgeTier::Bronze,
            category,
            theme,
            earned: progress >= required,
            earned_at: None,
            progress,
            required,
        }
    }

    fn companion(id: &str, theme: CompanionTheme, stage: CompanionStage, progress: u32, unlocked: bool) -> Companion {
        Companion {
            id: CompanionId::from(id),
            name: id.to_string(),
            theme,
            stage,
            collected_at: None,
            evolution_progress: progress,
            unlocked,
        }
    }

    fn baseline() -> Collection {
        Collection {
            badges: vec![
                badge("forest-guardian", BadgeCategory::Project, Some(CompanionTheme::Forest), 9, 10),
                badge("water-guardian", BadgeCategory::Project, Some(CompanionTheme::Ocean), 1, 3),
                badge("eco-warrior", BadgeCategory::Project, None, 3, 5),
                badge("angel", BadgeCategory::Funding, None, 8, 20),
            ],
            companions: vec![
                companion("sprouty", CompanionTheme::Forest, CompanionStage::Baby, 2, true),
                companion("sunny", CompanionTheme::Sun, CompanionStage::Baby, 0, false),
            ],
            gacha_tokens: 1,
        }
    }

    #[test]
    fn activity_advances_matching_category_only() {
        let mut ledger = CollectionLedger::new(baseline());
        let earned = ledger
            .record(CollectionEvent::Activity { category: BadgeCategory::Funding, theme: None, at: 5 })
            .unwrap();
        assert!(earned.is_empty());
        let s = ledger.state();
        assert_eq!(s.badges[3].progress, 9);
        assert_eq!(s.badges[0].progress, 9);
    }

    #[test]
    fn earning_a_themed_badge_feeds_companion_evolution() {
        let mut ledger = CollectionLedger::new(baseline());
        let earned = ledger
            .record(CollectionEvent::Activity {
                category: BadgeCategory::Project,
                theme: Some(CompanionTheme::Forest),
                at: 42,
            })
            .unwrap();
        assert_eq!(earned, vec![BadgeId::from("forest-guardian")]);
        let s = ledger.state();
        assert!(s.badges[0].earned);
        assert_eq!(s.badges[0].earned_at, Some(42));
        // Ocean-themed badge skipped, unthemed badge advanced.
        assert_eq!(s.badges[1].progress, 1);
        assert_eq!(s.badges[2].progress, 4);
        assert_eq!(s.companions[0].evolution_progress, 3);
    }

    #[test]
    fn rejected_event_is_not_logged() {
        let mut ledger = CollectionLedger::new(baseline());
        ledger.record(CollectionEvent::TokenSpent { at: 1 }).unwrap();
        let before = ledger.state().clone();
        let err = ledger.record(CollectionEvent::TokenSpent { at: 2 }).unwrap_err();
        assert!(matches!(err, FundflowError::InsufficientTokens { need: 1, have: 0 }));
        assert_eq!(ledger.state(), &before);
        assert_eq!(ledger.log().len(), 1);

        let err = ledger
            .record(CollectionEvent::Evolved { companion: CompanionId::from("sprouty") })
            .unwrap_err();
        assert!(matches!(err, FundflowError::StateConflict(_)));
        assert_eq!(ledger.log().len(), 1);
    }

    #[test]
    fn bonus_targets_skip_locked_and_adults() {
        let mut col = baseline();
        col.companions.push(companion("old", CompanionTheme::Air, CompanionStage::Adult, 0, true));
        assert_eq!(bonus_targets(&col), vec![CompanionId::from("sprouty")]);
    }

    #[test]
    fn replay_matches_live_state_after_json_round_trip() {
        let mut ledger = CollectionLedger::new(baseline());
        for at in 0..4 {
            ledger
                .record(CollectionEvent::Activity { category: BadgeCategory::Project, theme: None, at })
                .unwrap();
        }
        ledger.record(CollectionEvent::TokenSpent { at: 10 }).unwrap();
        ledger
            .record(CollectionEvent::Unlocked { companion: CompanionId::from("sunny"), at: 11 })
            .unwrap();
        ledger
            .record(CollectionEvent::BonusProgress {
                companions: vec![CompanionId::from("sprouty"), CompanionId::from("sunny")],
            })
            .unwrap();

        assert_eq!(&ledger.replay().unwrap(), ledger.state());

        let json = serde_json::to_string(&ledger).unwrap();
        let restored: CollectionLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.replay().unwrap(), *ledger.state());
    }
}
