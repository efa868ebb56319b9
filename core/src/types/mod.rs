//! Domain entities, identifiers and tag enums.
//!
//! Entities mirror the relational rows one to one. `*_yn` columns are `bool`
//! fields here and travel as `"Y"` / `"N"` on the wire (see [`yn`]).

#[macro_use]
mod macros;

pub mod account;
pub mod catalog;
pub mod contract;
pub mod engagement;
pub mod gift;
pub mod ids;
pub mod ledger;
pub mod library;
pub mod notification;
pub mod promotion;
pub mod ticket;
pub mod yn;

pub use account::{NewProfile, NewUser, Profile, Role, User};
pub use catalog::{
    Episode, EpisodeCounter, NewEpisode, NewProduct, PriceType, Product, ProductCounter,
    ProductStatus, ProductType, Rating,
};
pub use contract::{ContractOffer, NewContractOffer, OfferState, ProfitType};
pub use engagement::{
    Block, Comment, ContentRef, NewComment, NewReport, NewReview, Reaction, ReactionKind, Report,
    Review,
};
pub use gift::{
    GiftItem, GiftTransaction, GiftTransactionType, NewGift, NewGiftTransaction, PromotionType,
    TicketExpiration, TicketExpirationType,
};
pub use ids::{
    AppliedPromotionId, CommentId, ContractOfferId, DirectPromotionId, EpisodeId, GiftId,
    NotificationId, ProductId, ProfileId, ReportId, ReviewId, TicketId, UserId,
};
pub use ledger::{CashEntry, CashReason, CashTransaction, NewCashTransaction};
pub use library::{Bookmark, InterestStatus, Recent, Usage};
pub use notification::{NewNotification, Notification, NotificationType};
pub use promotion::{
    AppliedPromotion, AppliedPromotionStatus, AppliedPromotionType, DirectPromotion,
    DirectPromotionStatus, DirectPromotionType, NewAppliedPromotion, NewDirectPromotion,
};
pub use ticket::{AcquisitionType, NewTicket, OwnType, Ticket, TicketType};

/// Error returned when a stored tag does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownTag {
    /// Tag family
    pub kind: &'static str,
    /// Offending value
    pub value: String,
}
