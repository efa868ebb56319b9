//! Cash ledger.
//!
//! The balance is always `SUM(cash_entry.balance)` read through the current
//! transaction; nothing is cached. Each movement writes one signed entry and
//! one transaction row.

use super::{ServiceContext, account};
use serde::Serialize;
use webnovel_core::store::{AccountStore, LedgerStore};
use webnovel_core::types::{CashReason, CashTransaction, NewCashTransaction, Role, User, UserId};
use webnovel_core::{ErrorCode, PlatformError, PlatformResult};

/// Outcome of a movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    /// Transaction row written
    pub transaction: CashTransaction,
    /// Balance after the movement
    pub balance: i64,
}

/// Current balance.
///
/// # Errors
///
/// Storage failures.
pub async fn balance<S: LedgerStore>(tx: &mut S, user: UserId) -> PlatformResult<i64> {
    Ok(tx.balance(user).await?)
}

/// Add `amount` to `user`.
///
/// `peer` is the paying user, `None` for system credits.
///
/// # Errors
///
/// [`ErrorCode::InvalidCashAmount`] unless `amount > 0`.
pub async fn credit<S: LedgerStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    amount: i64,
    reason: CashReason,
    peer: Option<UserId>,
) -> PlatformResult<Movement> {
    if amount <= 0 {
        return Err(ErrorCode::InvalidCashAmount.into());
    }
    tx.insert_cash_entry(user, amount, ctx.now).await?;
    let transaction = tx
        .insert_cash_transaction(
            NewCashTransaction {
                from_user: peer,
                to_user: Some(user),
                amount,
                reason,
            },
            ctx.now,
        )
        .await?;
    let balance = tx.balance(user).await?;
    tracing::info!(user_id = %user, amount, reason = %reason, balance, "Cash credited");
    Ok(Movement {
        transaction,
        balance,
    })
}

/// Take `amount` from `user`.
///
/// `peer` is the receiving user, `None` for outflows to the system.
///
/// # Errors
///
/// * [`ErrorCode::InvalidCashAmount`] unless `amount > 0`
/// * [`PlatformError::InsufficientFunds`] when the balance is lower
pub async fn debit<S: LedgerStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    user: UserId,
    amount: i64,
    reason: CashReason,
    peer: Option<UserId>,
) -> PlatformResult<Movement> {
    if amount <= 0 {
        return Err(ErrorCode::InvalidCashAmount.into());
    }
    let current = tx.balance(user).await?;
    if current < amount {
        tracing::warn!(user_id = %user, balance = current, required = amount, "Insufficient cash");
        return Err(PlatformError::InsufficientFunds {
            balance: current,
            required: amount,
        });
    }
    tx.insert_cash_entry(user, -amount, ctx.now).await?;
    let transaction = tx
        .insert_cash_transaction(
            NewCashTransaction {
                from_user: Some(user),
                to_user: peer,
                amount,
                reason,
            },
            ctx.now,
        )
        .await?;
    tracing::info!(user_id = %user, amount, reason = %reason, "Cash debited");
    Ok(Movement {
        transaction,
        balance: current - amount,
    })
}

/// Movements of a user, newest first.
///
/// # Errors
///
/// Storage failures.
pub async fn history<S: LedgerStore>(
    tx: &mut S,
    user: UserId,
) -> PlatformResult<Vec<CashTransaction>> {
    Ok(tx.list_cash_transactions(user).await?)
}

/// Administrative top-up of another user's balance.
///
/// # Errors
///
/// * [`ErrorCode::OperatorOnly`] unless `admin` is an administrator
/// * [`ErrorCode::UserNotFound`] for an unknown or withdrawn target
/// * [`ErrorCode::InvalidCashAmount`] unless `amount > 0`
pub async fn grant<S: AccountStore + LedgerStore>(
    tx: &mut S,
    ctx: &ServiceContext,
    admin: &User,
    target: UserId,
    amount: i64,
) -> PlatformResult<Movement> {
    if admin.role != Role::Admin {
        return Err(ErrorCode::OperatorOnly.into());
    }
    account::find_user(tx, target).await?;
    credit(tx, ctx, target, amount, CashReason::Charge, None).await
}
