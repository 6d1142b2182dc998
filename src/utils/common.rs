use serde::Serialize;
use serde_json::Value;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::error::AppResult;

/// Loosely-typed boolean input: a real boolean or its textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoolInput {
    Bool(bool),
    Text(String),
}

impl From<bool> for BoolInput {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for BoolInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for BoolInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

pub fn stringify_json<T: Serialize + ?Sized>(data: &T) -> AppResult<String> {
    Ok(serde_json::to_string(data)?)
}

/// `true` for an absent value or JSON `null`.
pub fn is_null_or_undefined(data: Option<&Value>) -> bool {
    matches!(data, None | Some(Value::Null))
}

pub fn is_boolean(data: &Value) -> bool {
    data.is_boolean()
}

/// Absent input yields `default_val`. Text is true only when it equals `"true"` ignoring
/// ASCII case; `"1"`, `"yes"` and the like are false.
pub fn parse_boolean(data: Option<BoolInput>, default_val: bool) -> bool {
    match data {
        None => default_val,
        Some(BoolInput::Bool(b)) => b,
        Some(BoolInput::Text(s)) => s.eq_ignore_ascii_case("true"),
    }
}

/// Random (v4) UUID in lowercase hyphenated form.
pub fn create_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Begin a transaction on `pool`. The caller owns the handle and must close it exactly once
/// with [`commit_transaction`] or [`rollback_transaction`]; dropping it open rolls back.
pub async fn fetch_sql_transaction_instance(
    pool: &SqlitePool,
) -> AppResult<Transaction<'static, Sqlite>> {
    let transaction = pool.begin().await?;
    tracing::debug!("SQL transaction opened");
    Ok(transaction)
}

pub async fn commit_transaction(transaction: Transaction<'static, Sqlite>) -> AppResult<()> {
    transaction.commit().await?;
    tracing::debug!("SQL transaction committed");
    Ok(())
}

/// Roll back `transaction` if there is one; `None` is a no-op.
pub async fn rollback_transaction(transaction: Option<Transaction<'static, Sqlite>>) -> AppResult<()> {
    if let Some(transaction) = transaction {
        transaction.rollback().await?;
        tracing::debug!("SQL transaction rolled back");
    }
    Ok(())
}
