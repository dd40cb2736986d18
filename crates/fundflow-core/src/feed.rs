use serde::{Deserialize, Serialize};

use crate::constants::QUICK_AMOUNTS_DOLLARS;
use crate::types::{dollars, Amount, MediaRef, PostId, ProjectId, StageId, Timestamp, UserId};

// ── FundingPost ──────────────────────────────────────────────────────────────

/// A community feed item asking for funding for one project stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundingPost {
    pub id: PostId,
    pub author: String,
    /// Avatar initials of the author.
    pub avatar: String,
    pub project_title: String,
    /// Display label, e.g. "Stage 1: Land Preparation".
    pub stage_label: String,
    pub description: String,
    pub funding_goal: Amount,
    /// May exceed `funding_goal`; over-funding is not capped.
    pub current_funding: Amount,
    pub likes: u32,
    pub comments: u32,
    pub timestamp: Timestamp,
    /// Set when the post was published from an engine project stage.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub stage_id: Option<StageId>,
    /// Users who currently like this post.
    #[serde(default)]
    pub liked_by: Vec<UserId>,
}

impl FundingPost {
    /// `current_funding / funding_goal * 100`, unclamped. A zero goal yields 0.
    pub fn funding_percentage(&self) -> f64 {
        if self.funding_goal == 0 {
            return 0.0;
        }
        self.current_funding as f64 / self.funding_goal as f64 * 100.0
    }

    pub fn remaining_amount(&self) -> Amount {
        self.funding_goal.saturating_sub(self.current_funding)
    }

    pub fn is_liked_by(&self, user: &UserId) -> bool {
        self.liked_by.contains(user)
    }

    /// Flip `user`'s like. Returns whether the post is now liked.
    pub fn toggle_like(&mut self, user: &UserId) -> bool {
        if let Some(pos) = self.liked_by.iter().position(|u| u == user) {
            self.liked_by.remove(pos);
            self.likes = self.likes.saturating_sub(1);
            false
        } else {
            self.liked_by.push(user.clone());
            self.likes += 1;
            true
        }
    }
}

// ── Quick amounts ────────────────────────────────────────────────────────────

/// Shortcut buttons that fill the contribution amount input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAmount {
    Fixed(Amount),
    Remaining,
}

impl QuickAmount {
    pub fn resolve(self, post: &FundingPost) -> Amount {
        match self {
            QuickAmount::Fixed(a) => a,
            QuickAmount::Remaining => post.remaining_amount(),
        }
    }

    /// The shortcuts offered for a post, in display order.
    pub fn offered() -> Vec<QuickAmount> {
        QUICK_AMOUNTS_DOLLARS
            .iter()
            .map(|d| QuickAmount::Fixed(dollars(*d)))
            .chain(std::iter::once(QuickAmount::Remaining))
            .collect()
    }
}

// ── StatusPost ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostStatus {
    NeedFund,
    InProgress,
    Completed,
}

/// A progress update posted by a project owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusPost {
    pub id: PostId,
    pub project_id: ProjectId,
    pub author: UserId,
    pub content: String,
    pub media: Vec<MediaRef>,
    pub status: PostStatus,
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(goal: u64, current: u64) -> FundingPost {
        FundingPost {
            id: PostId::from("1"),
            author: "Sarah Chen".into(),
            avatar: "SC".into(),
            project_title: "Urban Bee Sanctuary".into(),
            stage_label: "Stage 1: Land Preparation".into(),
            description: String::new(),
            funding_goal: dollars(goal),
            current_funding: dollars(current),
            likes: 42,
            comments: 8,
            timestamp: 0,
            project_id: None,
            stage_id: None,
            liked_by: Vec::new(),
        }
    }

    #[test]
    fn percentage_is_unclamped() {
        assert_eq!(post(5000, 3200).funding_percentage(), 64.0);
        assert_eq!(post(1000, 1500).funding_percentage(), 150.0);
        assert_eq!(post(0, 10).funding_percentage(), 0.0);
    }

    #[test]
    fn remaining_saturates_when_overfunded() {
        assert_eq!(post(5000, 3200).remaining_amount(), dollars(1800));
        assert_eq!(post(1000, 1500).remaining_amount(), 0);
    }

    #[test]
    fn quick_amounts() {
        let p = post(6500, 6100);
        let resolved: Vec<Amount> = QuickAmount::offered().into_iter().map(|q| q.resolve(&p)).collect();
        assert_eq!(resolved, vec![dollars(25), dollars(50), dollars(100), dollars(400)]);
    }

    #[test]
    fn like_toggles_per_user() {
        let mut p = post(1, 0);
        let jane = UserId::from("jane");
        assert!(p.toggle_like(&jane));
        assert_eq!(p.likes, 43);
        assert!(p.is_liked_by(&jane));
        assert!(!p.toggle_like(&jane));
        assert_eq!(p.likes, 42);
    }
}
