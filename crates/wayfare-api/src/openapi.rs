//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the bearer session-token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token issued by /v1/auth/signup or /v1/auth/signin.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wayfare API — Creator Storefront",
        version = "0.3.2",
        description = "Creator-storefront API: creators publish Trips and GoTos, buyers purchase access, and gated content is reachable through a session-based access check or an emailed package-access key.\n\nAuthentication: bearer session token via `Authorization: Bearer <token>`. Public routes: signup/signin, launched-content listings, access-key verification, the media proxy, and health probes.",
        license(name = "AGPL-3.0-or-later"),
        contact(name = "Wayfare", url = "https://github.com/wayfare-hq/wayfare")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        // ── Auth ────────────────────────────────────────────────────────
        crate::routes::auth::signup,
        crate::routes::auth::signin,
        // ── Accounts ────────────────────────────────────────────────────
        crate::routes::accounts::list_accounts,
        crate::routes::accounts::get_account,
        crate::routes::accounts::update_account,
        // ── Trips ───────────────────────────────────────────────────────
        crate::routes::trips::create_trip,
        crate::routes::trips::list_trips,
        crate::routes::trips::get_trip,
        crate::routes::trips::update_trip,
        crate::routes::trips::delete_trip,
        crate::routes::trips::get_trip_content,
        // ── GoTos ───────────────────────────────────────────────────────
        crate::routes::gotos::create_goto,
        crate::routes::gotos::list_gotos,
        crate::routes::gotos::get_goto,
        crate::routes::gotos::update_goto,
        crate::routes::gotos::delete_goto,
        crate::routes::gotos::get_goto_content,
        // ── Purchases ───────────────────────────────────────────────────
        crate::routes::purchases::create_purchase,
        crate::routes::purchases::list_purchases,
        crate::routes::purchases::get_purchase,
        crate::routes::purchases::payment_webhook,
        // ── Refunds ─────────────────────────────────────────────────────
        crate::routes::refunds::create_refund,
        crate::routes::refunds::get_refund,
        crate::routes::refunds::process_refund,
        // ── Discounts ───────────────────────────────────────────────────
        crate::routes::discounts::create_discount,
        crate::routes::discounts::list_discounts,
        crate::routes::discounts::get_discount,
        crate::routes::discounts::update_discount,
        crate::routes::discounts::delete_discount,
        // ── Package Access ──────────────────────────────────────────────
        crate::routes::package_access::issue_grant,
        crate::routes::package_access::verify_access,
        crate::routes::package_access::deactivate_grant,
        // ── Media ───────────────────────────────────────────────────────
        crate::routes::media::upload,
        crate::routes::media::delete_media,
        crate::routes::media::proxy_media,
        // ── Connect ─────────────────────────────────────────────────────
        crate::routes::connect::authorize_url,
        crate::routes::connect::callback,
        crate::routes::connect::disconnect,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::models::AccountRecord,
        crate::models::TripRecord,
        crate::models::GoToRecord,
        crate::models::PurchaseRecord,
        crate::models::DiscountRecord,
        crate::models::RefundRecord,
        crate::routes::auth::SignupRequest,
        crate::routes::auth::SigninRequest,
        crate::routes::auth::SessionResponse,
        crate::routes::accounts::UpdateAccountRequest,
        crate::routes::trips::CreateTripRequest,
        crate::routes::trips::UpdateTripRequest,
        crate::routes::trips::TripSummary,
        crate::routes::trips::TripContentResponse,
        crate::routes::gotos::CreateGoToRequest,
        crate::routes::gotos::UpdateGoToRequest,
        crate::routes::gotos::GoToSummary,
        crate::routes::gotos::GoToContentResponse,
        crate::routes::purchases::CreatePurchaseRequest,
        crate::routes::purchases::PaymentWebhookRequest,
        crate::routes::refunds::CreateRefundRequest,
        crate::routes::refunds::ProcessRefundRequest,
        crate::routes::discounts::CreateDiscountRequest,
        crate::routes::discounts::UpdateDiscountRequest,
        crate::routes::package_access::IssueGrantRequest,
        crate::routes::package_access::VerifyAccessRequest,
        crate::routes::package_access::IssuedGrantResponse,
        crate::routes::package_access::GrantSummaryResponse,
        crate::routes::media::UploadResponse,
        crate::routes::connect::AuthorizeUrlResponse,
        crate::routes::connect::ConnectedResponse,
    )),
    tags(
        (name = "auth", description = "Signup and signin"),
        (name = "accounts", description = "Account profiles"),
        (name = "trips", description = "Trip content packages"),
        (name = "gotos", description = "GoTo content packages"),
        (name = "purchases", description = "Checkout and payment confirmation"),
        (name = "refunds", description = "Refund requests and processing"),
        (name = "discounts", description = "Discount codes"),
        (name = "package_access", description = "Emailed access keys for gated content"),
        (name = "media", description = "Object storage and public proxy"),
        (name = "connect", description = "Payment-provider OAuth connect"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_openapi))
}

/// GET /openapi.json — The assembled spec.
async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
