use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::models::payment::{NewPayment, PaymentProvider, EXPORT_PRICE, EXPORT_PRICE_MINOR};
use crate::ownership::{ensure_owner, owned_resume};
use crate::payments::{CheckoutProvider, PaymentConfirmation};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub resume_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub provider: String,
    /// Razorpay payment id, or the Stripe checkout session id.
    pub payment_id: String,
    pub resume_id: Option<Uuid>,
    /// Razorpay order id; Stripe sessions are looked up by `payment_id`.
    pub order_id: Option<String>,
    pub signature: Option<String>,
}

fn checkout_for(state: &AppState, provider: PaymentProvider) -> &Arc<dyn CheckoutProvider> {
    match provider {
        PaymentProvider::Razorpay => &state.razorpay,
        PaymentProvider::Stripe => &state.stripe,
    }
}

/// Opens a checkout and records it as a pending payment. Returns the provider reference.
async fn open_checkout(
    state: &AppState,
    user: AuthUser,
    checkout: &dyn CheckoutProvider,
    req: CheckoutRequest,
) -> Result<String, AppError> {
    if let Some(resume_id) = req.resume_id {
        owned_resume(state.resumes.as_ref(), resume_id, user.account_id).await?;
    }

    let provider = checkout.provider();
    let session = checkout.create_checkout(EXPORT_PRICE_MINOR).await?;
    let payment = state
        .payments
        .create_payment(NewPayment {
            user_id: user.account_id,
            amount: EXPORT_PRICE,
            provider,
            provider_ref: session.provider_ref.clone(),
            resume_id: req.resume_id,
        })
        .await?;
    info!("Opened {provider} checkout {} as payment {}", session.provider_ref, payment.id);

    Ok(session.provider_ref)
}

/// POST /api/payment/razorpay
pub async fn handle_razorpay_order(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CheckoutRequest>,
) -> Result<Json<Value>, AppError> {
    let order_id = open_checkout(&state, user, state.razorpay.as_ref(), req).await?;
    Ok(Json(json!({ "orderId": order_id })))
}

/// POST /api/payment/stripe
pub async fn handle_stripe_session(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CheckoutRequest>,
) -> Result<Json<Value>, AppError> {
    let session_id = open_checkout(&state, user, state.stripe.as_ref(), req).await?;
    Ok(Json(json!({ "sessionId": session_id })))
}

/// POST /api/payment/verify
///
/// Flips the caller's pending payment to completed once the provider confirms it.
/// Verifying an already completed payment is a no-op.
pub async fn handle_verify_payment(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<VerifyRequest>,
) -> Result<Json<Value>, AppError> {
    let provider: PaymentProvider = req.provider.parse().map_err(AppError::BadRequest)?;

    let provider_ref = match provider {
        PaymentProvider::Razorpay => {
            let signed = req.signature.as_deref().is_some_and(|s| !s.trim().is_empty());
            match req.order_id.clone().filter(|id| !id.trim().is_empty()) {
                Some(order_id) if signed => order_id,
                _ => {
                    return Err(AppError::BadRequest(
                        "Razorpay verification requires orderId and signature".to_string(),
                    ))
                }
            }
        }
        PaymentProvider::Stripe => req.payment_id.clone(),
    };
    let payment = ensure_owner(
        state
            .payments
            .find_payment_by_ref(provider, &provider_ref)
            .await?,
        user.account_id,
    )?;

    if req.resume_id.is_some() && req.resume_id != payment.resume_id {
        return Err(AppError::BadRequest(
            "Payment does not belong to this resume".to_string(),
        ));
    }

    if payment.is_completed() {
        info!("Payment {} already completed", payment.id);
        return Ok(Json(json!({ "message": "Payment verified", "payment": payment })));
    }

    let confirmation = PaymentConfirmation {
        provider_ref,
        payment_id: req.payment_id,
        signature: req.signature,
    };
    if !checkout_for(&state, provider).confirm(&confirmation).await? {
        warn!("{provider} did not confirm payment {}", payment.id);
        return Err(AppError::BadRequest("Payment could not be confirmed".to_string()));
    }

    let payment = state
        .payments
        .complete_payment(payment.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;
    info!("Completed {provider} payment {}", payment.id);

    Ok(Json(json!({ "message": "Payment verified", "payment": payment })))
}
