/// ─── FundFlow Constants ─────────────────────────────────────────────────────
///
/// Community projects are funded stage by stage. Every amount in the system
/// is held in integer cents.

// ── Currency ─────────────────────────────────────────────────────────────────

/// 1 dollar expressed in cents.
pub const CENTS_PER_DOLLAR: u64 = 100;

/// Maximum digits accepted after the decimal point in a contribution input.
pub const MAX_AMOUNT_DECIMALS: usize = 2;

/// Quick-pick contribution shortcuts offered next to the amount input (dollars).
pub const QUICK_AMOUNTS_DOLLARS: [u64; 3] = [25, 50, 100];

// ── Companion evolution ──────────────────────────────────────────────────────

/// Themed badges needed for a baby companion to become a teen.
pub const EVOLVE_BABY_TO_TEEN: u32 = 4;

/// Themed badges needed for a teen companion to become an adult.
pub const EVOLVE_TEEN_TO_ADULT: u32 = 8;

// ── Gacha ────────────────────────────────────────────────────────────────────

/// Tokens consumed by a single pull.
pub const GACHA_PULL_COST: u32 = 1;

/// Presentation delay between spending a token and revealing the result.
pub const GACHA_PULL_DELAY_MS: u64 = 2_000;

/// Evolution progress granted to each eligible companion when a pull finds
/// nothing left to unlock.
pub const GACHA_BONUS_PROGRESS: u32 = 1;

// ── Seed session ─────────────────────────────────────────────────────────────

/// Gacha tokens held by the seeded user at session start.
pub const SEED_GACHA_TOKENS: u32 = 2;
