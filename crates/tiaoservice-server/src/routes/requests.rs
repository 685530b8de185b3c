use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    now_iso, RequestStatus, ServicePeriod, ServiceRequest, User, UserRole, UserStatus,
};
use crate::routes::AppState;
use crate::services::wallet::{self, Balances, Currency, Party};

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub professional_id: String,
    pub description: String,
    pub preferred_date: String,
    pub preferred_period: ServicePeriod,
}

#[derive(Debug, Deserialize)]
pub struct PayRequest {
    pub method: Currency,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub request: ServiceRequest,
    pub charged: f64,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(body): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<ServiceRequest>)> {
    if user.role != UserRole::Client {
        return Err(AppError::Forbidden(
            "Only clients can request services".to_string(),
        ));
    }
    if body.description.is_empty() {
        return Err(AppError::BadRequest("Description is required".to_string()));
    }

    let professional = state.store.user(&body.professional_id)?;
    if professional.role != UserRole::Professional || professional.status != UserStatus::Approved {
        return Err(AppError::BadRequest(
            "Professional is not available".to_string(),
        ));
    }

    let request = ServiceRequest {
        id: Uuid::new_v4().to_string(),
        client_id: user.id,
        professional_id: professional.id,
        service: professional
            .services
            .first()
            .cloned()
            .unwrap_or_else(|| "Serviço".to_string()),
        description: body.description,
        preferred_date: body.preferred_date,
        preferred_period: body.preferred_period,
        status: RequestStatus::Pending,
        // Mock pricing: the platform has no pricing engine
        price: f64::from(rand::thread_rng().gen_range(50..=300)),
        created_at: now_iso(),
    };

    state.store.insert_request(request.clone())?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<Vec<ServiceRequest>>> {
    Ok(Json(state.store.requests_for(&user.id)?))
}

pub async fn accept(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> AppResult<Json<ServiceRequest>> {
    transition(&state, &user, &id, RequestStatus::Pending, RequestStatus::Accepted)
}

pub async fn decline(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> AppResult<Json<ServiceRequest>> {
    transition(&state, &user, &id, RequestStatus::Pending, RequestStatus::Declined)
}

/// The professional marks the job as done, which puts the request on the
/// client's tab.
pub async fn complete(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> AppResult<Json<ServiceRequest>> {
    transition(
        &state,
        &user,
        &id,
        RequestStatus::Accepted,
        RequestStatus::AwaitingPayment,
    )
}

pub async fn pay(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Json(body): Json<PayRequest>,
) -> AppResult<Json<PaymentResponse>> {
    let mut request = state.store.request(&id)?;
    if request.client_id != user.id {
        return Err(AppError::Forbidden(
            "Only the requesting client can pay".to_string(),
        ));
    }
    if request.status != RequestStatus::AwaitingPayment {
        return Err(AppError::Conflict(
            "Request is not awaiting payment".to_string(),
        ));
    }

    let mut payer = state.store.user(&request.client_id)?;
    let mut payee = state.store.user(&request.professional_id)?;

    let outcome = wallet::service_payment(
        Party {
            id: &payer.id,
            name: &payer.name,
            balances: Balances {
                tc: payer.balance_tc,
                brl: payer.balance_brl,
            },
        },
        Party {
            id: &payee.id,
            name: &payee.name,
            balances: Balances {
                tc: payee.balance_tc,
                brl: payee.balance_brl,
            },
        },
        request.price,
        body.method,
    )?;

    payer.balance_tc = outcome.payer_balances.tc;
    payer.balance_brl = outcome.payer_balances.brl;
    payer.transactions.push(outcome.payer_tx);
    payer.updated_at = now_iso();

    payee.balance_tc = outcome.payee_balances.tc;
    payee.balance_brl = outcome.payee_balances.brl;
    payee.transactions.push(outcome.payee_tx);
    payee.updated_at = now_iso();

    state.store.update_users(vec![payer, payee])?;

    request.status = RequestStatus::Paid;
    state.store.update_request(request.clone())?;

    tracing::info!(
        "Service request {} paid: {:.2} charged to {}",
        request.id,
        outcome.charged,
        request.client_id
    );

    Ok(Json(PaymentResponse {
        request,
        charged: outcome.charged,
    }))
}

/// Status changes driven by the professional side of a request.
fn transition(
    state: &AppState,
    user: &User,
    id: &str,
    expected: RequestStatus,
    next: RequestStatus,
) -> AppResult<Json<ServiceRequest>> {
    let mut request = state.store.request(id)?;

    if request.professional_id != user.id {
        return Err(AppError::Forbidden(
            "Request belongs to another user".to_string(),
        ));
    }
    if request.status != expected {
        return Err(AppError::Conflict(format!("Request is not {expected:?}")));
    }

    request.status = next;
    state.store.update_request(request.clone())?;
    Ok(Json(request))
}
