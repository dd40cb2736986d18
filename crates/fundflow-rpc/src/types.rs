use chrono::DateTime;
use serde::{Deserialize, Serialize};

use fundflow_core::collection::Collection;
use fundflow_core::feed::{FundingPost, QuickAmount, StatusPost};
use fundflow_core::project::{FundingStatus, Project, ProjectPhase};
use fundflow_core::types::{format_amount, Amount, Timestamp, UserId, UserProfile};

/// Feed card returned by `fundflow_listFeed`, `fundflow_getPost` and
/// `fundflow_toggleLike`. Amounts are in cents; `*_display` fields are
/// pre-rendered dollar strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcFeedPost {
    pub id: String,
    pub author: String,
    pub avatar: String,
    pub project_title: String,
    pub stage_label: String,
    pub description: String,
    pub funding_goal: Amount,
    pub current_funding: Amount,
    pub funding_goal_display: String,
    pub current_funding_display: String,
    /// Unclamped; over-funded posts exceed 100.
    pub funding_percentage: f64,
    pub remaining: Amount,
    /// Contribution shortcuts in display order; the last is "remaining".
    pub quick_amounts: Vec<Amount>,
    pub likes: u32,
    /// Whether the session user likes this post.
    pub liked: bool,
    pub comments: u32,
    /// RFC 3339.
    pub posted_at: String,
    /// e.g. "2 hours ago".
    pub posted_ago: String,
    pub project_id: Option<String>,
    pub stage_id: Option<String>,
}

impl RpcFeedPost {
    pub fn from_post(post: &FundingPost, viewer: &UserId, now: Timestamp) -> Self {
        Self {
            id: post.id.to_string(),
            author: post.author.clone(),
            avatar: post.avatar.clone(),
            project_title: post.project_title.clone(),
            stage_label: post.stage_label.clone(),
            description: post.description.clone(),
            funding_goal: post.funding_goal,
            current_funding: post.current_funding,
            funding_goal_display: format_amount(post.funding_goal),
            current_funding_display: format_amount(post.current_funding),
            funding_percentage: post.funding_percentage(),
            remaining: post.remaining_amount(),
            quick_amounts: QuickAmount::offered().into_iter().map(|q| q.resolve(post)).collect(),
            likes: post.likes,
            liked: post.is_liked_by(viewer),
            comments: post.comments,
            posted_at: rfc3339(post.timestamp),
            posted_ago: relative_age(post.timestamp, now),
            project_id: post.project_id.as_ref().map(ToString::to_string),
            stage_id: post.stage_id.as_ref().map(ToString::to_string),
        }
    }
}

/// A project plus its derived views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcProject {
    #[serde(flatten)]
    pub project: Project,
    pub total_funding_required: Amount,
    pub total_funding_display: String,
    pub phase: ProjectPhase,
    pub funding_status: FundingStatus,
    pub current_stage_label: String,
}

impl From<Project> for RpcProject {
    fn from(project: Project) -> Self {
        let total = project.total_funding_required();
        Self {
            total_funding_required: total,
            total_funding_display: format_amount(total),
            phase: project.phase(),
            funding_status: project.funding_status(),
            current_stage_label: project.current_stage_label(),
            project,
        }
    }
}

/// The stage awaiting confirmation after `fundflow_requestStageCompletion`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcPendingCompletion {
    pub project_id: String,
    pub stage_id: String,
    pub stage_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcStatusPost {
    pub post: StatusPost,
    /// Published to the feed for `need-fund` updates.
    pub funding_post: Option<RpcFeedPost>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcContribution {
    pub post: RpcFeedPost,
    pub amount: Amount,
    pub amount_display: String,
    pub funding_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcCollection {
    #[serde(flatten)]
    pub collection: Collection,
    pub earned_count: usize,
    /// Companions whose evolution progress has reached the threshold.
    pub ready_to_evolve: Vec<String>,
}

impl From<Collection> for RpcCollection {
    fn from(collection: Collection) -> Self {
        Self {
            earned_count: collection.earned_count(),
            ready_to_evolve: collection
                .companions
                .iter()
                .filter(|c| c.can_evolve())
                .map(|c| c.id.to_string())
                .collect(),
            collection,
        }
    }
}

/// Session user summary for the profile page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcProfile {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub projects: usize,
    pub earned_badges: usize,
    pub companions_collected: usize,
    pub gacha_tokens: u32,
}

// ── Time rendering ───────────────────────────────────────────────────────────

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

pub fn rfc3339(ts: Timestamp) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|d| d.to_rfc3339())
        .unwrap_or_default()
}

/// Coarse "N units ago" rendering of `ts` relative to `now`.
pub fn relative_age(ts: Timestamp, now: Timestamp) -> String {
    let secs = now.saturating_sub(ts).max(0);
    let (n, unit) = if secs < MINUTE {
        return "just now".to_string();
    } else if secs < HOUR {
        (secs / MINUTE, "minute")
    } else if secs < DAY {
        (secs / HOUR, "hour")
    } else {
        (secs / DAY, "day")
    };
    let plural = if n == 1 { "" } else { "s" };
    format!("{n} {unit}{plural} ago")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundflow_core::types::{dollars, PostId};

    #[test]
    fn relative_age_buckets() {
        let now = 1_000_000;
        assert_eq!(relative_age(now - 5, now), "just now");
        assert_eq!(relative_age(now - 60, now), "1 minute ago");
        assert_eq!(relative_age(now - 2 * HOUR, now), "2 hours ago");
        assert_eq!(relative_age(now - DAY - 5, now), "1 day ago");
        assert_eq!(relative_age(now - 3 * DAY, now), "3 days ago");
        assert_eq!(relative_age(now + 100, now), "just now");
    }

    #[test]
    fn rfc3339_renders_utc() {
        assert_eq!(rfc3339(0), "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn feed_card_offers_remaining_last() {
        let post = FundingPost {
            id: PostId::from("3"),
            author: "Elena Rodriguez".into(),
            avatar: "ER".into(),
            project_title: "Community Kitchen Initiative".into(),
            stage_label: "Stage 3: Equipment Installation".into(),
            description: String::new(),
            funding_goal: dollars(12000),
            current_funding: dollars(10800),
            likes: 89,
            comments: 23,
            timestamp: 0,
            project_id: None,
            stage_id: None,
            liked_by: vec![UserId::from("jane")],
        };
        let card = RpcFeedPost::from_post(&post, &UserId::from("jane"), DAY);
        assert_eq!(card.quick_amounts, vec![dollars(25), dollars(50), dollars(100), dollars(1200)]);
        assert_eq!(card.current_funding_display, "$10800");
        assert!((card.funding_percentage - 90.0).abs() < 1e-9);
        assert!(card.liked);
        assert_eq!(card.posted_ago, "1 day ago");
    }
}
