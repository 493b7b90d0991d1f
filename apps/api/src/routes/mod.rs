pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;
use crate::{admin, ai, auth, payments, resume};

fn auth_routes() -> Router<AppState> {
    use auth::handlers::*;

    Router::new()
        .route("/signup", post(handle_signup))
        .route("/login", post(handle_login))
        .route("/send-otp", post(handle_send_otp))
        .route("/verify-otp", post(handle_verify_otp))
        .route("/google-login", post(handle_google_login))
        .route("/linkedin/callback", get(handle_linkedin_callback))
        .route("/users", get(handle_list_users))
        .route("/linkedin-data", get(handle_linkedin_data))
        .route(
            "/profile",
            get(handle_get_profile).put(handle_update_profile),
        )
        .route("/change-password", put(handle_change_password))
        .route(
            "/delete-account",
            axum::routing::delete(handle_delete_account),
        )
        .route("/logout", post(handle_logout))
}

fn resume_routes() -> Router<AppState> {
    use resume::handlers::*;

    Router::new()
        .route("/", post(handle_create_resume).get(handle_list_resumes))
        .route("/generate", post(handle_create_resume))
        .route("/enhance", post(handle_enhance_field))
        .route("/pdf", post(handle_generate_pdf))
        .route("/cover-letter", post(handle_cover_letter))
        .route(
            "/:id",
            put(handle_update_resume).delete(handle_delete_resume),
        )
}

fn payment_routes() -> Router<AppState> {
    use payments::handlers::*;

    Router::new()
        .route("/razorpay", post(handle_razorpay_order))
        .route("/stripe", post(handle_stripe_session))
        .route("/verify", post(handle_verify_payment))
}

fn admin_routes() -> Router<AppState> {
    use admin::handlers::*;

    Router::new()
        .route("/users", get(handle_list_users))
        .route("/user/delete", post(handle_delete_user))
        .route("/user/analyze", post(handle_analyze_user))
        .route("/user/role", post(handle_set_role))
        .route("/payments", get(handle_list_payments))
        .route("/template", post(handle_update_template))
}

fn ai_routes() -> Router<AppState> {
    use ai::handlers::*;

    Router::new()
        .route("/generate-resume", post(handle_generate_resume))
        .route("/ats-check", post(handle_ats_check))
}

pub fn build_router(state: AppState) -> Router {
    use ai::playground::{handle_gemini, handle_haiku, handle_huggingface};

    Router::new()
        .route("/", get(health::banner_handler))
        .route("/health", get(health::health_handler))
        .nest("/api/auth", auth_routes())
        .nest("/api/resume", resume_routes())
        .nest("/api/payment", payment_routes())
        .nest("/api/admin", admin_routes())
        .nest("/api/ai", ai_routes())
        // Prompt playground
        .route("/api/haiku", post(handle_haiku))
        .route("/api/huggingface", post(handle_huggingface))
        .route("/api/gemini", post(handle_gemini))
        .with_state(state)
}
