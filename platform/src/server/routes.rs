//! Router configuration.

use super::health::{metrics, readiness_check};
use super::state::AppState;
use crate::api::{
    auth, cash, catalog, contracts, engagement, episodes, gifts, me, notifications, products,
    promotions,
};
use axum::middleware::from_fn;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use webnovel_core::store::Database;
use webnovel_web::handlers::health_check;
use webnovel_web::{tag_correlation_id, track_http_metrics};

fn product_routes<D: Database>() -> Router<AppState<D>> {
    Router::new()
        .route("/products/:id", get(products::view::<D>))
        .route("/products/:id/episodes", get(products::episodes::<D>))
        .route("/products/:id/bookmark", put(products::toggle_bookmark::<D>))
        .route("/products/:id/interest", get(products::interest::<D>))
        .route(
            "/products/:id/interest/revive",
            put(products::revive_interest::<D>),
        )
        .route(
            "/products/:id/purchase-all-episodes",
            post(products::purchase_all_episodes::<D>),
        )
        .route("/products/:id/sponsor", post(products::sponsor::<D>))
        .route(
            "/products/:id/contract-offer",
            post(products::contract_offer::<D>),
        )
        .route(
            "/products/:id/free-for-first",
            post(products::claim_free_for_first::<D>),
        )
        .route(
            "/products/:id/waiting-for-free",
            post(products::claim_waiting_for_free::<D>),
        )
        .route(
            "/products/:id/six-nine-path",
            post(products::claim_six_nine_path::<D>),
        )
        .route(
            "/products/:id/reviews",
            get(engagement::reviews::<D>).post(engagement::create_review::<D>),
        )
        .route(
            "/products/:id/direct-promotions",
            get(promotions::list_direct::<D>).put(promotions::save_direct::<D>),
        )
        .route(
            "/products/:id/applied-promotions",
            get(promotions::applied_board::<D>).post(promotions::apply::<D>),
        )
}

fn episode_routes<D: Database>() -> Router<AppState<D>> {
    Router::new()
        .route("/episodes/:id/open", post(episodes::open::<D>))
        .route("/episodes/:id/purchase", post(episodes::purchase::<D>))
        .route("/episodes/:id/reaction/:kind", put(episodes::react::<D>))
        .route(
            "/episodes/:id/comments",
            get(episodes::comments::<D>).post(episodes::create_comment::<D>),
        )
        .route("/comments/:id", delete(engagement::delete_comment::<D>))
        .route(
            "/comments/:id/reaction/:kind",
            put(engagement::react_comment::<D>),
        )
        .route("/comments/:id/pin", put(engagement::pin_comment::<D>))
        .route("/comments/:id/block", put(engagement::block_comment::<D>))
        .route("/comments/:id/report", post(engagement::report_comment::<D>))
        .route("/reviews/:id", delete(engagement::delete_review::<D>))
        .route(
            "/reviews/:id/reaction/:kind",
            put(engagement::react_review::<D>),
        )
        .route("/reviews/:id/pin", put(engagement::pin_review::<D>))
        .route("/reviews/:id/block", put(engagement::block_review::<D>))
        .route("/reviews/:id/report", post(engagement::report_review::<D>))
}

fn promotion_routes<D: Database>() -> Router<AppState<D>> {
    Router::new()
        .route(
            "/direct-promotions/:id/start",
            post(promotions::start_direct::<D>),
        )
        .route(
            "/direct-promotions/:id/stop",
            post(promotions::stop_direct::<D>),
        )
        .route("/direct-promotions/:id/end", post(promotions::end_direct::<D>))
        .route(
            "/direct-promotions/:id/issue-reader-of-prev",
            post(promotions::issue_reader_of_prev::<D>),
        )
        .route(
            "/direct-promotions/:id/issuance-status",
            get(promotions::issuance_status::<D>),
        )
        .route("/applied-promotions", get(promotions::queue::<D>))
        .route(
            "/applied-promotion-slots",
            get(promotions::remaining_slots::<D>),
        )
        .route(
            "/applied-promotions/:id/cancel",
            post(promotions::cancel_applied::<D>),
        )
        .route(
            "/applied-promotions/:id/approve",
            post(promotions::approve::<D>),
        )
        .route("/applied-promotions/:id/deny", post(promotions::deny::<D>))
        .route(
            "/applied-promotions/:id/end",
            post(promotions::end_applied::<D>),
        )
}

fn account_routes<D: Database>() -> Router<AppState<D>> {
    Router::new()
        .route("/me", get(me::summary::<D>).delete(me::withdraw::<D>))
        .route(
            "/me/profiles",
            get(me::profiles::<D>).post(me::create_profile::<D>),
        )
        .route(
            "/me/profiles/:id/default",
            put(me::set_default_profile::<D>),
        )
        .route(
            "/me/profiles/:id/nickname",
            put(me::change_nickname::<D>),
        )
        .route("/me/identity", post(me::verify_identity::<D>))
        .route("/me/bookmarks", get(me::bookmarks::<D>))
        .route("/me/recent", get(me::recent::<D>))
        .route("/me/recent/:product_id", delete(me::delete_recent::<D>))
        .route("/giftbook", get(gifts::list::<D>))
        .route("/giftbook/receive/:id", post(gifts::receive::<D>))
        .route("/giftbook/transactions", get(gifts::transactions::<D>))
        .route("/cash", get(cash::balance::<D>))
        .route("/cash/history", get(cash::history::<D>))
        .route("/tickets", get(cash::tickets::<D>))
        .route("/me/contract-offers/received", get(contracts::received::<D>))
        .route("/me/contract-offers/sent", get(contracts::sent::<D>))
        .route(
            "/contract-offers/:id/accept",
            post(contracts::accept::<D>),
        )
        .route(
            "/contract-offers/:id/reject",
            post(contracts::reject::<D>),
        )
        .route(
            "/notifications",
            get(notifications::list::<D>).put(notifications::mark_all_read::<D>),
        )
        .route(
            "/notifications/:id/read",
            put(notifications::mark_read::<D>),
        )
        .route(
            "/notification-preferences",
            get(notifications::preferences::<D>),
        )
        .route(
            "/notification-preferences/:type",
            put(notifications::set_preference::<D>),
        )
}

fn author_routes<D: Database>() -> Router<AppState<D>> {
    Router::new()
        .route("/author/products", post(catalog::create_product::<D>))
        .route(
            "/author/products/:id/status",
            put(catalog::update_status::<D>),
        )
        .route(
            "/author/products/:id/episodes",
            post(catalog::create_episode::<D>),
        )
        .route(
            "/author/episodes/:id/open",
            put(catalog::open_episode::<D>),
        )
        .route("/admin/cash", post(cash::grant::<D>))
        .route("/admin/users/:id/role", put(me::grant_role::<D>))
}

/// Build the complete router.
///
/// Probes, `/metrics` and `/auth/refresh` sit at the root; everything else
/// is nested under `/api`.
pub fn build_router<D: Database>(state: AppState<D>, request_timeout: Duration) -> Router {
    let api_routes = Router::new()
        .merge(product_routes())
        .merge(episode_routes())
        .merge(promotion_routes())
        .merge(account_routes())
        .merge(author_routes());

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check::<D>))
        .route("/metrics", get(metrics::<D>))
        .route("/auth/refresh", post(auth::refresh::<D>))
        .nest("/api", api_routes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(track_http_metrics))
        .layer(from_fn(tag_correlation_id))
        .with_state(state)
}
