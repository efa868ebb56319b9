//! Nickname rules.

use crate::ErrorCode;
use crate::types::Profile;

/// Free renames granted to a new profile.
pub const FREE_RENAMES: i32 = 2;

/// Nickname length bounds in characters.
pub const NICKNAME_CHARS: std::ops::RangeInclusive<usize> = 2..=20;

/// Trimmed nickname, or the rejection.
///
/// # Errors
///
/// [`ErrorCode::InvalidNickname`] when out of bounds or containing control
/// characters.
pub fn validate_nickname(raw: &str) -> Result<String, ErrorCode> {
    let nickname = raw.trim();
    if !NICKNAME_CHARS.contains(&nickname.chars().count())
        || nickname.chars().any(char::is_control)
    {
        return Err(ErrorCode::InvalidNickname);
    }
    Ok(nickname.to_string())
}

/// Spend one rename, free first. Returns `(free, paid)` after spending.
///
/// # Errors
///
/// [`ErrorCode::NicknameChangeExhausted`] when both counters are zero.
pub const fn spend_rename(profile: &Profile) -> Result<(i32, i32), ErrorCode> {
    if profile.free_rename_count > 0 {
        Ok((profile.free_rename_count - 1, profile.paid_rename_count))
    } else if profile.paid_rename_count > 0 {
        Ok((0, profile.paid_rename_count - 1))
    } else {
        Err(ErrorCode::NicknameChangeExhausted)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::types::{ProfileId, UserId};
    use chrono::{TimeZone, Utc};

    fn profile(free: i32, paid: i32) -> Profile {
        Profile {
            id: ProfileId(1),
            user_id: UserId(1),
            nickname: "reader".into(),
            free_rename_count: free,
            paid_rename_count: paid,
            is_default: true,
            created_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn free_renames_are_spent_before_paid() {
        assert_eq!(spend_rename(&profile(2, 1)), Ok((1, 1)));
        assert_eq!(spend_rename(&profile(0, 1)), Ok((0, 0)));
        assert_eq!(
            spend_rename(&profile(0, 0)),
            Err(ErrorCode::NicknameChangeExhausted)
        );
    }

    #[test]
    fn nicknames_are_trimmed_and_bounded() {
        assert_eq!(validate_nickname("  moon  ").unwrap(), "moon");
        assert!(validate_nickname("a").is_err());
        assert!(validate_nickname(&"x".repeat(21)).is_err());
        assert!(validate_nickname("tab\there").is_err());
    }
}
