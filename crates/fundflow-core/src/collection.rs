//! Badges, companion creatures and gacha tokens.
//!
//! Companions sit on two independent one-way axes: `locked → unlocked`
//! (gacha only) and `Baby → Teen → Adult` (evolution only).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{EVOLVE_BABY_TO_TEEN, EVOLVE_TEEN_TO_ADULT};
use crate::error::{FundflowError, StateConflict};
use crate::types::{BadgeId, CompanionId, Timestamp};

// ── Enumerations ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    Special,
}

/// Which kind of user action advances a badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeCategory {
    Project,
    Funding,
    Community,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanionTheme {
    Forest,
    Ocean,
    Air,
    Sun,
    Earth,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanionStage {
    Baby,
    Teen,
    Adult,
}

impl CompanionStage {
    pub fn next(self) -> Option<CompanionStage> {
        match self {
            CompanionStage::Baby => Some(CompanionStage::Teen),
            CompanionStage::Teen => Some(CompanionStage::Adult),
            CompanionStage::Adult => None,
        }
    }

    /// Evolution progress needed to leave this stage; `None` for the
    /// terminal stage.
    pub fn evolve_threshold(self) -> Option<u32> {
        match self {
            CompanionStage::Baby => Some(EVOLVE_BABY_TO_TEEN),
            CompanionStage::Teen => Some(EVOLVE_TEEN_TO_ADULT),
            CompanionStage::Adult => None,
        }
    }
}

impl fmt::Display for CompanionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompanionStage::Baby => "baby",
            CompanionStage::Teen => "teen",
            CompanionStage::Adult => "adult",
        })
    }
}

// ── BadgeAchievement ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BadgeAchievement {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    pub tier: BadgeTier,
    pub category: BadgeCategory,
    /// Companions of this theme gain evolution progress when it is earned.
    #[serde(default)]
    pub theme: Option<CompanionTheme>,
    pub earned: bool,
    #[serde(default)]
    pub earned_at: Option<Timestamp>,
    pub progress: u32,
    /// Qualifying actions needed to earn the badge. Always >= 1.
    pub required: u32,
}

impl BadgeAchievement {
    /// Count one qualifying action. Returns `true` if this call earned the
    /// badge.
    pub fn record_progress(&mut self, at: Timestamp) -> bool {
        if self.earned {
            return false;
        }
        self.progress = (self.progress + 1).min(self.required);
        if self.progress == self.required {
            self.earned = true;
            self.earned_at = Some(at);
            return true;
        }
        false
    }
}

// ── Companion ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Companion {
    pub id: CompanionId,
    pub name: String,
    pub theme: CompanionTheme,
    pub stage: CompanionStage,
    #[serde(default)]
    pub collected_at: Option<Timestamp>,
    /// Themed badges earned since the last evolution.
    pub evolution_progress: u32,
    pub unlocked: bool,
}

impl Companion {
    pub fn can_evolve(&self) -> bool {
        self.unlocked
            && self
                .stage
                .evolve_threshold()
                .is_some_and(|need| self.evolution_progress >= need)
    }

    /// Advance exactly one stage and reset progress. Leaves `self` untouched
    /// on error.
    pub fn evolve(&mut self) -> Result<CompanionStage, FundflowError> {
        if !self.unlocked {
            return Err(StateConflict::CompanionLocked(self.id.to_string()).into());
        }
        let (next, need) = match (self.stage.next(), self.stage.evolve_threshold()) {
            (Some(next), Some(need)) => (next, need),
            _ => return Err(StateConflict::CompanionFullyEvolved(self.id.to_string()).into()),
        };
        if self.evolution_progress < need {
            return Err(StateConflict::EvolutionNotReady {
                id: self.id.to_string(),
                need,
                have: self.evolution_progress,
            }
            .into());
        }
        self.stage = next;
        self.evolution_progress = 0;
        Ok(next)
    }

    pub fn unlock(&mut self, at: Timestamp) {
        self.unlocked = true;
        self.collected_at.get_or_insert(at);
    }
}

// ── Collection ───────────────────────────────────────────────────────────────

/// One user's badges, companions and gacha tokens.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub badges: Vec<BadgeAchievement>,
    pub companions: Vec<Companion>,
    pub gacha_tokens: u32,
}

impl Collection {
    pub fn earned_count(&self) -> usize {
        self.badges.iter().filter(|b| b.earned).count()
    }

    pub fn companion(&self, id: &CompanionId) -> Option<&Companion> {
        self.companions.iter().find(|c| &c.id == id)
    }

    pub fn companion_mut(&mut self, id: &CompanionId) -> Result<&mut Companion, FundflowError> {
        self.companions
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| FundflowError::UnknownCompanion(id.to_string()))
    }

    /// Locked companions in collection order.
    pub fn locked_companions(&self) -> Vec<&Companion> {
        self.companions.iter().filter(|c| !c.unlocked).collect()
    }
}
