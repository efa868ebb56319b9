//! Promotion engine.
//!
//! * [`direct`]: author-run free-for-first and reader-of-prev promotions
//! * [`applied`]: operator-approved waiting-for-free and 6-9-path promotions
//!   with the weekly slot quota
//! * [`claims`]: reader-side claims that turn a running promotion into a gift

pub mod applied;
pub mod claims;
pub mod direct;

use super::{ServiceContext, notification};
use webnovel_core::PlatformResult;
use webnovel_core::store::{GiftStore, NotificationStore};
use webnovel_core::types::{GiftItem, NewGift, NewNotification, NotificationType, Product};
use webnovel_runtime::metrics::GiftMetrics;

/// Deposit a promotion gift and tell the recipient about it.
async fn gift_with_notice<S: GiftStore + NotificationStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    product: &Product,
    gift: NewGift,
) -> PlatformResult<GiftItem> {
    let user = gift.user_id;
    let kind = gift.promotion_type.map_or("gift", |p| p.as_str());
    let item = tx.insert_gift(gift, ctx.now).await?;
    notification::notify(
        tx,
        ctx,
        NewNotification {
            user_id: user,
            kind: NotificationType::Promotion,
            title: format!("A gift from \"{}\" is waiting in your gift box", product.title),
            content: Some(format!("{} ticket(s)", item.ticket_count())),
        },
    )
    .await?;
    GiftMetrics::record_issued(kind, 1);
    Ok(item)
}
