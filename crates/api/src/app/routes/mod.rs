pub mod accept;
pub mod inquiries;
pub mod onboarding;
pub mod projects;
pub mod system;

use axum::{
    Router,
    routing::{get, post, put},
};

/// Routes served without authentication.
pub fn public_router() -> Router {
    Router::new().route("/health", get(system::health))
}

/// Routes that require a bearer token.
pub fn router() -> Router {
    Router::new()
        .route("/acceptQuote", post(accept::accept_quote))
        .route("/profile", put(onboarding::register_profile))
        .route("/properties", post(onboarding::create_property))
        .route("/projects", post(onboarding::create_project))
        .route("/projects/:id", get(projects::get_project))
        .route("/projects/:id/cruise", post(projects::submit_cruise))
        .route("/projects/:id/retract", post(projects::retract_cruise))
        .route("/projects/:id/approve", post(projects::approve_cruise))
        .route("/projects/:id/post", post(projects::post_to_marketplace))
        .route("/projects/:id/decline", post(projects::decline_engagement))
        .route("/projects/:id/complete", post(projects::complete_harvest))
        .route("/projects/:id/inventory", get(projects::inventory))
        .route("/projects/:id/report", get(projects::report))
        .route("/projects/:id/activity", get(projects::activity))
        .route("/inquiries", post(inquiries::send_inquiry))
        .route("/inquiries/:id/quote", post(inquiries::submit_quote))
        .route("/inquiries/:id/decline", post(inquiries::decline_inquiry))
        .route("/inquiries/:id/withdraw", post(inquiries::withdraw_inquiry))
}
