//! Mutually exclusive recommend / not-recommend toggle.

use crate::types::ReactionKind;

/// Flag pair carried by reaction and usage rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReactionFlags {
    /// Recommend flag
    pub recommend: bool,
    /// Not-recommend flag
    pub not_recommend: bool,
}

impl ReactionFlags {
    /// Neither flag set.
    pub const NEUTRAL: Self = Self {
        recommend: false,
        not_recommend: false,
    };

    /// Press `kind`: set it and clear the opposite, or clear it when already set.
    #[must_use]
    pub const fn toggle(self, kind: ReactionKind) -> Self {
        match kind {
            ReactionKind::Recommend => Self {
                recommend: !self.recommend,
                not_recommend: false,
            },
            ReactionKind::NotRecommend => Self {
                recommend: false,
                not_recommend: !self.not_recommend,
            },
        }
    }

    /// Whether the flag for `kind` is set.
    #[must_use]
    pub const fn is_set(self, kind: ReactionKind) -> bool {
        match kind {
            ReactionKind::Recommend => self.recommend,
            ReactionKind::NotRecommend => self.not_recommend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_clears_the_opposite_flag() {
        let disliked = ReactionFlags::NEUTRAL.toggle(ReactionKind::NotRecommend);
        let liked = disliked.toggle(ReactionKind::Recommend);
        assert!(liked.recommend);
        assert!(!liked.not_recommend);
        let back = liked.toggle(ReactionKind::NotRecommend);
        assert!(!back.recommend);
        assert!(back.not_recommend);
    }

    #[test]
    fn toggling_twice_is_neutral() {
        for kind in ReactionKind::ALL {
            assert_eq!(
                ReactionFlags::NEUTRAL.toggle(*kind).toggle(*kind),
                ReactionFlags::NEUTRAL
            );
        }
    }
}
