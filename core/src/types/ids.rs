//! Identifier newtypes. All keys are auto-incremented 64-bit integers.

define_id!(
    /// Internal user key.
    UserId
);
define_id!(
    /// Reader profile key.
    ProfileId
);
define_id!(
    /// Product (work) key.
    ProductId
);
define_id!(
    /// Episode key.
    EpisodeId
);
define_id!(
    /// Productbook row key.
    TicketId
);
define_id!(
    /// Giftbook row key.
    GiftId
);
define_id!(
    /// Direct promotion key.
    DirectPromotionId
);
define_id!(
    /// Applied promotion key.
    AppliedPromotionId
);
define_id!(
    /// Contract offer key.
    ContractOfferId
);
define_id!(
    /// Comment key.
    CommentId
);
define_id!(
    /// Review key.
    ReviewId
);
define_id!(
    /// Report key.
    ReportId
);
define_id!(
    /// Notification item key.
    NotificationId
);
