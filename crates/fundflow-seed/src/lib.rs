//! fundflow-seed
//!
//! Builds the demo session state from scratch, writing directly into a
//! `StateStore` without going through the lifecycle engine: seed data
//! describes history (completed stages, earned badges) that no sequence of
//! fresh actions could reproduce.
//!
//! The seed holds:
//!
//! 1. The session user's profile
//! 2. Two owned projects, each with one completed, one in-progress and one
//!    pending stage
//! 3. Five community funding posts
//! 4. Twelve badges, five companions and the starting gacha tokens

pub mod params;

pub use params::SeedParams;

use chrono::NaiveDate;
use tracing::info;

use fundflow_core::collection::{
    BadgeAchievement, BadgeCategory, BadgeTier, Collection, Companion, CompanionStage,
    CompanionTheme,
};
use fundflow_core::error::{FundflowError, ValidationError};
use fundflow_core::feed::FundingPost;
use fundflow_core::project::{Project, Stage, StageStatus};
use fundflow_core::types::{
    dollars, Amount, BadgeId, CompanionId, PostId, ProjectId, StageId, Timestamp, UserId,
    UserProfile,
};
use fundflow_state::validation::validate_project;
use fundflow_state::StateStore;

const HOUR: Timestamp = 3600;
const DAY: Timestamp = 24 * HOUR;

/// What `apply_seed` wrote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedSummary {
    pub user: UserId,
    pub projects: usize,
    pub posts: usize,
    pub badges: usize,
    pub companions: usize,
}

/// Write the demo state into `store`. Feed post ages are relative to `now`.
pub fn apply_seed(store: &mut StateStore, params: &SeedParams, now: Timestamp) -> Result<SeedSummary, FundflowError> {
    if params.user_id.trim().is_empty() || params.display_name.trim().is_empty() {
        return Err(ValidationError::MissingField.into());
    }
    info!(user = %params.user_id, "applying session seed");

    // ── 1. Session user ──────────────────────────────────────────────────────
    let user = UserId::new(params.user_id.clone());
    store.put_user(UserProfile {
        id: user.clone(),
        display_name: params.display_name.clone(),
        initials: UserProfile::initials_for(&params.display_name),
        tagline: params.tagline.clone(),
    });

    // ── 2. Owned projects ────────────────────────────────────────────────────
    let projects = seed_projects(&user);
    for project in &projects {
        // Seed data must satisfy the same rules as user edits.
        validate_project(project.clone())?;
        store.put_project(project.clone());
    }
    info!(projects = projects.len(), "seed: projects created");

    // ── 3. Community feed ────────────────────────────────────────────────────
    let posts = seed_feed(now);
    let post_count = posts.len();
    for post in posts {
        store.append_post(post);
    }
    info!(posts = post_count, "seed: feed populated");

    // ── 4. Collection ────────────────────────────────────────────────────────
    let collection = Collection {
        badges: seed_badges(),
        companions: seed_companions(),
        gacha_tokens: params.gacha_tokens,
    };
    let summary = SeedSummary {
        user: user.clone(),
        projects: projects.len(),
        posts: post_count,
        badges: collection.badges.len(),
        companions: collection.companions.len(),
    };
    info!(
        badges = summary.badges,
        companions = summary.companions,
        tokens = collection.gacha_tokens,
        "seed: collection created"
    );
    store.put_collection(user, collection);

    Ok(summary)
}

// ── Projects ─────────────────────────────────────────────────────────────────

fn stage(id: &str, name: &str, description: &str, amount: u64, status: StageStatus) -> Stage {
    Stage {
        id: StageId::from(id),
        name: name.into(),
        description: description.into(),
        funding_amount: dollars(amount),
        status,
        raised: 0,
    }
}

fn seed_projects(owner: &UserId) -> Vec<Project> {
    use StageStatus::*;
    vec![
        Project {
            id: ProjectId::from("1"),
            owner: owner.clone(),
            title: "Community Garden Project".into(),
            overview: "Creating a sustainable community garden to promote local food \
                       production and environmental awareness."
                .into(),
            stages: vec![
                stage("s1", "Site Preparation", "Clear and prepare the land", 3000, Completed),
                stage("s2", "Planting Phase", "Plant initial crops and trees", 2500, InProgress),
                stage("s3", "Maintenance Setup", "Set up irrigation and maintenance schedule", 2000, Pending),
            ],
            latest_update: None,
        },
        Project {
            id: ProjectId::from("2"),
            owner: owner.clone(),
            title: "Mobile App for Local Artisans".into(),
            overview: "Building a mobile marketplace to connect local artisans with customers.".into(),
            stages: vec![
                stage("s1", "Design & Planning", "UI/UX design and technical planning", 4000, Completed),
                stage("s2", "Development", "Build the mobile application", 8000, InProgress),
                stage("s3", "Testing & Launch", "Beta testing and official launch", 3000, Pending),
            ],
            latest_update: None,
        },
    ]
}

// ── Feed ─────────────────────────────────────────────────────────────────────

struct PostSeed {
    author: &'static str,
    project_title: &'static str,
    stage_label: &'static str,
    description: &'static str,
    goal: Amount,
    raised: Amount,
    likes: u32,
    comments: u32,
    age: Timestamp,
}

fn seed_feed(now: Timestamp) -> Vec<FundingPost> {
    let seeds = [
        PostSeed {
            author: "Sarah Chen",
            project_title: "Urban Bee Sanctuary",
            stage_label: "Stage 1: Land Preparation",
            description: "We're creating a safe haven for urban pollinators. This stage involves \
                          preparing the rooftop space and installing bee-friendly plants.",
            goal: dollars(5000),
            raised: dollars(3200),
            likes: 42,
            comments: 8,
            age: 2 * HOUR,
        },
        PostSeed {
            author: "Marcus Johnson",
            project_title: "Youth Coding Bootcamp",
            stage_label: "Stage 2: Equipment Purchase",
            description: "Teaching underprivileged kids to code. The curriculum is done and now \
                          we need laptops and software licenses for 30 students.",
            goal: dollars(8000),
            raised: dollars(4500),
            likes: 67,
            comments: 15,
            age: 5 * HOUR,
        },
        PostSeed {
            author: "Elena Rodriguez",
            project_title: "Community Kitchen Initiative",
            stage_label: "Stage 3: Equipment Installation",
            description: "A space where neighbours cook together and learn from each other. \
                          Final stage: installing professional kitchen equipment.",
            goal: dollars(12000),
            raised: dollars(10800),
            likes: 89,
            comments: 23,
            age: DAY,
        },
        PostSeed {
            author: "David Kim",
            project_title: "Solar Community Center",
            stage_label: "Stage 1: Design & Planning",
            description: "Bringing clean energy to our community center. This stage covers \
                          architectural design and solar panel selection.",
            goal: dollars(15000),
            raised: dollars(8200),
            likes: 54,
            comments: 12,
            age: 2 * DAY,
        },
        PostSeed {
            author: "Amara Okafor",
            project_title: "Local Artists Market",
            stage_label: "Stage 2: Booth Construction",
            description: "A permanent home for local artisans. We're building weather-resistant \
                          booths and setting up the infrastructure.",
            goal: dollars(6500),
            raised: dollars(6100),
            likes: 78,
            comments: 19,
            age: 3 * DAY,
        },
    ];

    seeds
        .into_iter()
        .enumerate()
        .map(|(i, s)| FundingPost {
            id: PostId::new((i + 1).to_string()),
            author: s.author.into(),
            avatar: UserProfile::initials_for(s.author),
            project_title: s.project_title.into(),
            stage_label: s.stage_label.into(),
            description: s.description.into(),
            funding_goal: s.goal,
            current_funding: s.raised,
            likes: s.likes,
            comments: s.comments,
            timestamp: now - s.age,
            project_id: None,
            stage_id: None,
            liked_by: Vec::new(),
        })
        .collect()
}

// ── Collection ───────────────────────────────────────────────────────────────

/// Midnight UTC on the given day of October 2025.
fn october_2025(day: u32) -> Option<Timestamp> {
    NaiveDate::from_ymd_opt(2025, 10, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

#[allow(clippy::too_many_arguments)]
fn badge(
    id: &str,
    name: &str,
    description: &str,
    tier: BadgeTier,
    category: BadgeCategory,
    theme: Option<CompanionTheme>,
    progress: u32,
    required: u32,
    earned_on: Option<u32>,
) -> BadgeAchievement {
    BadgeAchievement {
        id: BadgeId::from(id),
        name: name.into(),
        description: description.into(),
        tier,
        category,
        theme,
        earned: earned_on.is_some(),
        earned_at: earned_on.and_then(october_2025),
        progress,
        required,
    }
}

fn seed_badges() -> Vec<BadgeAchievement> {
    use BadgeCategory::*;
    use BadgeTier::*;
    use CompanionTheme::*;
    vec![
        badge("1", "First Steps", "Complete your first project", Bronze, Project, None, 1, 1, Some(15)),
        badge("2", "Tree Hugger", "Plant 3 trees", Silver, Project, Some(Forest), 3, 3, Some(17)),
        badge("3", "Forest Guardian", "Plant 10 trees", Gold, Project, Some(Forest), 5, 10, None),
        badge("4", "Generous Soul", "Fund your first project", Bronze, Funding, None, 1, 1, Some(16)),
        badge("5", "Philanthropist", "Fund 5 projects", Silver, Funding, None, 5, 5, Some(18)),
        badge("6", "Angel Investor", "Fund 20 projects", Gold, Funding, None, 8, 20, None),
        badge("7", "Community Builder", "Help 3 community projects", Silver, Community, None, 3, 3, Some(19)),
        badge("8", "Clean Streets", "Participate in cleanup events", Bronze, Project, Some(Earth), 1, 1, Some(12)),
        badge("9", "Eco Warrior", "Complete 5 environmental projects", Gold, Project, Some(Earth), 3, 5, None),
        badge("10", "Early Supporter", "Join the community", Special, Community, None, 1, 1, Some(10)),
        badge("11", "Helping Hand", "Volunteer 10 hours", Bronze, Community, None, 6, 10, None),
        badge("12", "Water Guardian", "Support water conservation", Silver, Project, Some(Ocean), 1, 3, None),
    ]
}

fn companion(
    id: &str,
    name: &str,
    theme: CompanionTheme,
    stage: CompanionStage,
    progress: u32,
    collected_on: Option<u32>,
) -> Companion {
    Companion {
        id: CompanionId::from(id),
        name: name.into(),
        theme,
        stage,
        collected_at: collected_on.and_then(october_2025),
        evolution_progress: progress,
        unlocked: collected_on.is_some(),
    }
}

fn seed_companions() -> Vec<Companion> {
    use CompanionStage::*;
    use CompanionTheme::*;
    vec![
        companion("c1", "Sprouty", Forest, Baby, 2, Some(10)),
        companion("c2", "Bubbly", Ocean, Baby, 4, Some(12)),
        companion("c3", "Gusty", Air, Teen, 1, Some(15)),
        companion("c4", "Sunny", Sun, Baby, 0, None),
        companion("c5", "Rocky", Earth, Baby, 0, None),
    ]
}
