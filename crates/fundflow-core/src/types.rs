use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{CENTS_PER_DOLLAR, MAX_AMOUNT_DECIMALS};
use crate::error::ValidationError;

/// Currency amount in cents. Never negative.
pub type Amount = u64;

/// Unix timestamp (seconds, UTC).
pub type Timestamp = i64;

// ── Identifiers ──────────────────────────────────────────────────────────────

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Identifies a session user (project owner, supporter, collector).
    UserId
);
string_id!(
    /// Identifies a project owned by a user.
    ProjectId
);
string_id!(
    /// Identifies a stage within its project. Unique per project only.
    StageId
);
string_id!(
    /// Identifies a funding post or status post in the community feed.
    PostId
);
string_id!(BadgeId);
string_id!(CompanionId);
string_id!(
    /// Opaque reference to an uploaded image or video. Upload handling lives
    /// outside the engine.
    MediaRef
);
string_id!(
    /// Opaque reference to a saved or newly entered payment method.
    PaymentMethodRef
);

// ── UserProfile ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: String,
    /// Avatar fallback, e.g. "JD".
    pub initials: String,
    pub tagline: String,
}

impl UserProfile {
    /// Derive avatar initials from the first letter of each word of a name.
    pub fn initials_for(name: &str) -> String {
        name.split_whitespace()
            .filter_map(|w| w.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

// ── Amount helpers ───────────────────────────────────────────────────────────

/// Parse a user-entered dollar amount such as `"12"`, `"12.5"` or `"12.50"`
/// into cents. At most two decimal places are accepted.
pub fn parse_amount(input: &str) -> Result<Amount, ValidationError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ValidationError::InvalidAmount);
    }
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(ValidationError::InvalidAmount);
    }
    if frac.len() > MAX_AMOUNT_DECIMALS
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ValidationError::InvalidAmount);
    }

    let dollars: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| ValidationError::InvalidAmount)?
    };
    let mut cents: u64 = if frac.is_empty() {
        0
    } else {
        frac.parse().map_err(|_| ValidationError::InvalidAmount)?
    };
    if frac.len() == 1 {
        cents *= 10;
    }

    dollars
        .checked_mul(CENTS_PER_DOLLAR)
        .and_then(|d| d.checked_add(cents))
        .ok_or(ValidationError::InvalidAmount)
}

/// Render cents as a dollar string, e.g. `1250` → `"$12.50"`.
pub fn format_amount(amount: Amount) -> String {
    let dollars = amount / CENTS_PER_DOLLAR;
    let cents = amount % CENTS_PER_DOLLAR;
    if cents == 0 {
        format!("${dollars}")
    } else {
        format!("${dollars}.{cents:02}")
    }
}

/// Whole dollars to cents.
pub const fn dollars(d: u64) -> Amount {
    d * CENTS_PER_DOLLAR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_accepts_up_to_two_decimals() {
        assert_eq!(parse_amount("12").unwrap(), 1200);
        assert_eq!(parse_amount("12.5").unwrap(), 1250);
        assert_eq!(parse_amount("12.50").unwrap(), 1250);
        assert_eq!(parse_amount(".75").unwrap(), 75);
        assert_eq!(parse_amount("0").unwrap(), 0);
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        for bad in ["", " ", ".", "12.505", "-5", "1e3", "12,50", "abc"] {
            assert_eq!(parse_amount(bad), Err(ValidationError::InvalidAmount), "input {bad:?}");
        }
    }

    #[test]
    fn format_amount_drops_zero_cents() {
        assert_eq!(format_amount(dollars(3000)), "$3000");
        assert_eq!(format_amount(1250), "$12.50");
        assert_eq!(format_amount(5), "$0.05");
    }

    #[test]
    fn initials_from_display_name() {
        assert_eq!(UserProfile::initials_for("Jane Doe"), "JD");
        assert_eq!(UserProfile::initials_for("amara okafor smith"), "AO");
        assert_eq!(UserProfile::initials_for(""), "");
    }
}
