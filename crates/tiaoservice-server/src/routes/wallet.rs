use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{now_iso, Transaction, User, UserRole};
use crate::routes::AppState;
use crate::services::wallet::{self, Balances, Currency, WalletUpdate};

#[derive(Debug, Serialize)]
pub struct WalletResponse {
    pub balance_tc: f64,
    pub balance_brl: f64,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub amount: f64,
    pub currency: Currency,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeRequest {
    pub from: Currency,
    pub amount: f64,
}

pub async fn get_wallet(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<WalletResponse>> {
    let user = state.store.user(&user.id)?;
    Ok(Json(wallet_response(&user)))
}

pub async fn deposit(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(body): Json<DepositRequest>,
) -> AppResult<Json<WalletResponse>> {
    let mut user = state.store.user(&user.id)?;
    let update = wallet::deposit(balances_of(&user), body.amount, body.currency)?;
    commit(&mut user, update);
    state.store.update_user(user.clone())?;
    Ok(Json(wallet_response(&user)))
}

pub async fn withdraw(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(body): Json<WithdrawRequest>,
) -> AppResult<Json<WalletResponse>> {
    // Only professionals cash out earnings.
    if user.role != UserRole::Professional {
        return Err(AppError::Forbidden(
            "Only professionals can withdraw".to_string(),
        ));
    }

    let mut user = state.store.user(&user.id)?;
    let update = wallet::withdraw(balances_of(&user), body.amount)?;
    commit(&mut user, update);
    state.store.update_user(user.clone())?;
    Ok(Json(wallet_response(&user)))
}

pub async fn exchange(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(body): Json<ExchangeRequest>,
) -> AppResult<Json<WalletResponse>> {
    let mut user = state.store.user(&user.id)?;
    let update = wallet::exchange(balances_of(&user), body.from, body.amount)?;
    commit(&mut user, update);
    state.store.update_user(user.clone())?;
    Ok(Json(wallet_response(&user)))
}

fn balances_of(user: &User) -> Balances {
    Balances {
        tc: user.balance_tc,
        brl: user.balance_brl,
    }
}

fn commit(user: &mut User, update: WalletUpdate) {
    user.balance_tc = update.balances.tc;
    user.balance_brl = update.balances.brl;
    user.transactions.extend(update.transactions);
    user.updated_at = now_iso();
}

fn wallet_response(user: &User) -> WalletResponse {
    let mut transactions = user.transactions.clone();
    transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    WalletResponse {
        balance_tc: user.balance_tc,
        balance_brl: user.balance_brl,
        transactions,
    }
}
