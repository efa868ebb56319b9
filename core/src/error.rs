//! Error taxonomy and stable business-error codes.
//!
//! Every business rejection carries an [`ErrorCode`]. The code's wire string
//! and HTTP status are part of the API contract and never change once
//! published. Numeric codes follow `E<status><n>` (`E4044` is a 404);
//! promotion and contract-offer codes use upper snake case names.

use crate::store::StoreError;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Result alias for domain operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Coarse error classification used for logging and HTTP mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, invalid or expired credentials; unverified identity.
    Authentication,
    /// Caller does not own the target.
    Authorization,
    /// Malformed or out-of-range input.
    Validation,
    /// Target absent or soft-deleted.
    NotFound,
    /// A state precondition failed.
    Conflict,
    /// Cash balance too low.
    InsufficientFunds,
    /// Database or identity provider unavailable.
    Transient,
}

macro_rules! error_codes {
    ($(
        $(#[$meta:meta])*
        $variant:ident => ($wire:literal, $status:literal, $kind:ident, $message:literal),
    )+) => {
        /// Stable business-error codes.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ErrorCode {
            $(
                $(#[$meta])*
                $variant,
            )+
        }

        impl ErrorCode {
            /// Wire representation sent in the `code` field.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// HTTP status code for this error.
            #[must_use]
            pub const fn status(self) -> u16 {
                match self {
                    $(Self::$variant => $status,)+
                }
            }

            /// Error classification.
            #[must_use]
            pub const fn kind(self) -> ErrorKind {
                match self {
                    $(Self::$variant => ErrorKind::$kind,)+
                }
            }

            /// Default user-facing message.
            #[must_use]
            pub const fn message(self) -> &'static str {
                match self {
                    $(Self::$variant => $message,)+
                }
            }

            /// Every code, for contract tests.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];
        }
    };
}

error_codes! {
    // Authentication
    /// Access token expired.
    TokenExpired => ("E4010", 401, Authentication, "The access token has expired."),
    /// Access token missing or not recognised.
    TokenInvalid => ("E4011", 401, Authentication, "A valid access token is required."),
    /// Identity verification required.
    IdentityNotVerified => ("E4012", 401, Authentication, "Identity verification is required."),

    // Validation
    /// Generic malformed input.
    InvalidInput => ("E4001", 400, Validation, "The request is invalid."),
    /// Not enough cash.
    InsufficientCash => ("E4002", 400, InsufficientFunds, "Not enough cash."),
    /// Bulk purchase found nothing to buy.
    NothingToPurchase => ("E4003", 400, Validation, "There are no episodes to purchase."),
    /// No ticket can open the episode.
    NoUsableTicket => ("E4004", 400, Validation, "A ticket is required to read this episode."),
    /// Donation amount must be positive.
    InvalidDonationPrice => ("E4005", 400, Validation, "The donation amount must be positive."),
    /// Promotion dates or ticket count out of range.
    InvalidPromotionRequest => ("E4006", 400, Validation, "The promotion request is invalid."),
    /// Nickname empty or too long.
    InvalidNickname => ("E4007", 400, Validation, "The nickname is invalid."),
    /// Cash amount must be positive.
    InvalidCashAmount => ("E4008", 400, Validation, "The amount must be positive."),
    /// Profit rates must be positive and sum to 100.
    InvalidContractOfferProfitRate => ("INVALID_CONTRACT_OFFER_PROFIT_RATE", 400, Validation, "Profit rates must be positive and add up to 100."),
    /// Advance-payment range or message missing.
    InvalidContractOffer => ("INVALID_CONTRACT_OFFER", 400, Validation, "The contract offer is incomplete."),
    /// The offerer is the author.
    CannotOfferOwnProduct => ("CANNOT_OFFER_OWN_PRODUCT", 400, Validation, "You cannot make an offer on your own work."),
    /// Comment or review body empty or too long.
    InvalidContent => ("E4009", 400, Validation, "The content is invalid."),

    // Authorization
    /// Caller is not the product's author.
    NotProductAuthor => ("E4031", 403, Authorization, "Only the author of this work may do this."),
    /// Caller does not own the target resource.
    NotResourceOwner => ("E4032", 403, Authorization, "You do not own this resource."),
    /// Caller is not the offer's author.
    NotOfferRecipient => ("E4033", 403, Authorization, "Only the recipient of this offer may respond."),
    /// Operator role required.
    OperatorOnly => ("E4034", 403, Authorization, "Operator privileges are required."),
    /// Reporting your own content.
    CannotReportOwnContent => ("CANNOT_REPORT_OWN_CONTENT", 403, Authorization, "You cannot report your own content."),
    /// Blocking your own content.
    CannotBlockOwnContent => ("CANNOT_BLOCK_OWN_CONTENT", 403, Authorization, "You cannot block your own content."),

    // Not found
    /// Notification missing.
    NotificationNotFound => ("E4040", 404, NotFound, "The notification does not exist."),
    /// User missing or withdrawn.
    UserNotFound => ("E4041", 404, NotFound, "The user does not exist."),
    /// Profile missing or not owned.
    ProfileNotFound => ("E4042", 404, NotFound, "The profile does not exist."),
    /// Episode missing or unpublished.
    EpisodeNotFound => ("E4043", 404, NotFound, "The episode does not exist."),
    /// Product missing.
    ProductNotFound => ("E4044", 404, NotFound, "The work does not exist."),
    /// Gift missing.
    GiftNotFound => ("E4045", 404, NotFound, "The gift does not exist."),
    /// Promotion missing.
    PromotionNotFound => ("E4046", 404, NotFound, "The promotion does not exist."),
    /// Contract offer missing.
    ContractOfferNotFound => ("E4047", 404, NotFound, "The contract offer does not exist."),
    /// Comment missing.
    CommentNotFound => ("E4048", 404, NotFound, "The comment does not exist."),
    /// Review missing.
    ReviewNotFound => ("E4049", 404, NotFound, "The review does not exist."),

    // Conflict
    /// Gift already claimed.
    GiftAlreadyReceived => ("E4091", 409, Conflict, "This gift has already been received."),
    /// Gift box lifetime elapsed.
    GiftExpired => ("E4092", 409, Conflict, "This gift has expired."),
    /// Email registered to another account.
    DuplicateEmail => ("E4093", 409, Conflict, "The email is already registered."),
    /// Verified phone held by another live account.
    PhoneAlreadyVerified => ("E4094", 409, Conflict, "The phone number is already verified by another account."),
    /// Both rename counters exhausted.
    NicknameChangeExhausted => ("E4095", 409, Conflict, "No nickname changes remain."),
    /// Duplicate report.
    AlreadyReported => ("E4096", 409, Conflict, "You have already reported this content."),
    /// Episode already owned.
    EpisodeAlreadyOwned => ("E4097", 409, Conflict, "You already own this episode."),
    /// Promotion claim window not open.
    ClaimNotAvailable => ("E4098", 409, Conflict, "This benefit is not available right now."),
    /// The account has been withdrawn.
    UserWithdrawn => ("E4099", 409, Conflict, "The account has been withdrawn."),
    /// Weekly applied-promotion cap reached.
    NoAvailableAppliedPromotionSlot => ("NO_AVAILABLE_APPLIED_PROMOTION_SLOT", 409, Conflict, "No promotion slots remain this week."),
    /// An application is already waiting for review.
    AlreadyAppliedPromotion => ("ALREADY_APPLIED_PROMOTION", 409, Conflict, "This promotion has already been applied for."),
    /// The promotion is already running.
    AppliedPromotionInProgress => ("APPLIED_PROMOTION_IN_PROGRESS", 409, Conflict, "This promotion is already in progress."),
    /// Reapplication cool-down after a denial.
    AppliedPromotionCooldown => ("APPLIED_PROMOTION_REAPPLY_COOLDOWN", 409, Conflict, "You cannot reapply for this promotion yet."),
    /// Promotion state machine refused the transition.
    InvalidPromotionTransition => ("INVALID_PROMOTION_STATUS_TRANSITION", 409, Conflict, "The promotion cannot change to that status."),
    /// Source promotion is not running.
    PromotionNotInProgress => ("PROMOTION_NOT_IN_PROGRESS", 409, Conflict, "The promotion is not in progress."),
    /// Offer already answered.
    ContractOfferNotPending => ("CONTRACT_OFFER_NOT_PENDING", 409, Conflict, "The contract offer has already been answered."),
    /// Offerer already has a pending offer on the product.
    ContractOfferAlreadyPending => ("CONTRACT_OFFER_ALREADY_PENDING", 409, Conflict, "You already have a pending offer on this work."),

    // Unprocessable
    /// Product fields failed validation.
    InvalidProductField => ("E4225", 422, Validation, "The work's fields are invalid."),
    /// Episode fields failed validation.
    InvalidEpisodeField => ("E4226", 422, Validation, "The episode's fields are invalid."),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Domain error returned by every service operation.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// A business rule rejected the request.
    #[error("[{code}] {message}")]
    Business {
        /// Stable code
        code: ErrorCode,
        /// User-facing message
        message: String,
    },

    /// Debit larger than the balance.
    #[error("[{}] balance {balance} is less than required {required}", ErrorCode::InsufficientCash)]
    InsufficientFunds {
        /// Current balance
        balance: i64,
        /// Amount the operation needs
        required: i64,
    },

    /// An external dependency (identity provider) is down.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PlatformError {
    /// Business error with the code's default message.
    #[must_use]
    pub fn business(code: ErrorCode) -> Self {
        Self::Business {
            code,
            message: code.message().to_string(),
        }
    }

    /// Business error with a specific message.
    #[must_use]
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Business {
            code,
            message: message.into(),
        }
    }

    /// The stable code, when this is a business error.
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Business { code, .. } => Some(*code),
            Self::InsufficientFunds { .. } => Some(ErrorCode::InsufficientCash),
            Self::ServiceUnavailable(_) | Self::Store(_) => None,
        }
    }

    /// Classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Business { code, .. } => code.kind(),
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::ServiceUnavailable(_) | Self::Store(_) => ErrorKind::Transient,
        }
    }

    /// Whether this error carries `code`.
    #[must_use]
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code() == Some(code)
    }
}

impl From<ErrorCode> for PlatformError {
    fn from(code: ErrorCode) -> Self {
        Self::business(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn wire_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ErrorCode::ALL {
            assert!(seen.insert(code.as_str()), "duplicate code {code}");
        }
    }

    #[test]
    fn numeric_codes_embed_their_status() {
        for code in ErrorCode::ALL {
            let wire = code.as_str();
            if let Some(digits) = wire.strip_prefix('E') {
                assert_eq!(&digits[..3], code.status().to_string(), "{wire}");
            }
        }
    }

    #[test]
    fn published_codes_are_stable() {
        assert_eq!(ErrorCode::InsufficientCash.as_str(), "E4002");
        assert_eq!(ErrorCode::NothingToPurchase.as_str(), "E4003");
        assert_eq!(ErrorCode::ProductNotFound.as_str(), "E4044");
        assert_eq!(ErrorCode::InvalidProductField.as_str(), "E4225");
        assert_eq!(ErrorCode::TokenExpired.as_str(), "E4010");
        assert_eq!(ErrorCode::IdentityNotVerified.as_str(), "E4012");
        assert_eq!(
            ErrorCode::NoAvailableAppliedPromotionSlot.as_str(),
            "NO_AVAILABLE_APPLIED_PROMOTION_SLOT"
        );
        assert_eq!(ErrorCode::InvalidContractOfferProfitRate.status(), 400);
    }

    #[test]
    fn insufficient_funds_maps_to_cash_code() {
        let err = PlatformError::InsufficientFunds {
            balance: 99,
            required: 100,
        };
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert!(err.is(ErrorCode::InsufficientCash));
    }
}
