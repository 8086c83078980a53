//! Account store access: lookup, creation, credential verification.
//!
//! Every read reconstructs the account from the accounts x roles join and
//! re-validates it against the account schema; a row that fails validation is
//! store corruption, not a client error.

use sqlx::{FromRow, PgPool};
use thiserror::Error;

use crate::auth::password;
use crate::database::models::account::{Account, Credentials, Role};
use crate::database::pool::{is_unique_violation, DatabaseError};

const ACCOUNT_SELECT: &str = "SELECT ac.account_id, ac.email, r.role_id, r.role_name \
     FROM accounts ac INNER JOIN roles r ON ac.role_id = r.role_id";

/// Optional filter for account listing; email wins when both are requested
#[derive(Debug, Clone)]
pub enum AccountQuery {
    Email(String),
    Role(i32),
}

/// Credential verification failure. `UnknownEmail` and `Mismatch` are
/// internal distinctions only; the login boundary collapses them into one
/// generic response so callers cannot enumerate accounts.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("unknown account email")]
    UnknownEmail,

    #[error("password mismatch")]
    Mismatch,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, FromRow)]
struct AccountRow {
    account_id: i32,
    email: String,
    role_id: i32,
    role_name: Option<String>,
}

fn from_row(row: AccountRow) -> Result<Account, DatabaseError> {
    let account = Account {
        account_id: row.account_id,
        email: row.email,
        role: Role {
            role_id: row.role_id,
            role_name: row.role_name,
        },
    };
    account.validate().map_err(|reason| {
        DatabaseError::Corrupt(format!(
            "account {} does not validate: {}",
            account.account_id, reason
        ))
    })?;
    Ok(account)
}

fn expect_one(mut rows: Vec<AccountRow>, what: &str) -> Result<Account, DatabaseError> {
    if rows.len() > 1 {
        return Err(DatabaseError::Corrupt(format!(
            "multiple accounts matched {}",
            what
        )));
    }
    match rows.pop() {
        Some(row) => from_row(row),
        None => Err(DatabaseError::NotFound(format!(
            "account not found by {}",
            what
        ))),
    }
}

pub async fn read_by_email(pool: &PgPool, email: &str) -> Result<Account, DatabaseError> {
    let rows: Vec<AccountRow> = sqlx::query_as(&format!("{} WHERE ac.email = $1", ACCOUNT_SELECT))
        .bind(email)
        .fetch_all(pool)
        .await?;
    expect_one(rows, &format!("email: {}", email))
}

pub async fn read_by_id(pool: &PgPool, account_id: i32) -> Result<Account, DatabaseError> {
    let rows: Vec<AccountRow> =
        sqlx::query_as(&format!("{} WHERE ac.account_id = $1", ACCOUNT_SELECT))
            .bind(account_id)
            .fetch_all(pool)
            .await?;
    expect_one(rows, &format!("accountid: {}", account_id))
}

pub async fn read_all(
    pool: &PgPool,
    query: Option<AccountQuery>,
) -> Result<Vec<Account>, DatabaseError> {
    let rows: Vec<AccountRow> = match query {
        Some(AccountQuery::Email(email)) => {
            sqlx::query_as(&format!("{} WHERE ac.email = $1", ACCOUNT_SELECT))
                .bind(email)
                .fetch_all(pool)
                .await?
        }
        Some(AccountQuery::Role(role_id)) => {
            sqlx::query_as(&format!("{} WHERE ac.role_id = $1", ACCOUNT_SELECT))
                .bind(role_id)
                .fetch_all(pool)
                .await?
        }
        None => sqlx::query_as(ACCOUNT_SELECT).fetch_all(pool).await?,
    };

    rows.into_iter().map(from_row).collect()
}

/// Create an account plus its credential row in one transaction. The role
/// comes from the store default; email uniqueness is the store's unique
/// constraint, surfaced as Conflict.
pub async fn create(pool: &PgPool, credentials: &Credentials) -> Result<Account, DatabaseError> {
    let password_hash = password::hash(&credentials.password)
        .map_err(|e| DatabaseError::Internal(format!("password hashing failed: {}", e)))?;

    let mut tx = pool.begin().await?;

    let (account_id,): (i32,) =
        sqlx::query_as("INSERT INTO accounts (email) VALUES ($1) RETURNING account_id")
            .bind(&credentials.email)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DatabaseError::Conflict("account already exists".to_string())
                } else {
                    DatabaseError::from(e)
                }
            })?;

    sqlx::query("INSERT INTO account_passwords (account_id, password_hash) VALUES ($1, $2)")
        .bind(account_id)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    read_by_id(pool, account_id).await
}

pub async fn update_password(
    pool: &PgPool,
    account_id: i32,
    raw_password: &str,
) -> Result<(), DatabaseError> {
    let password_hash = password::hash(raw_password)
        .map_err(|e| DatabaseError::Internal(format!("password hashing failed: {}", e)))?;

    let result = sqlx::query("UPDATE account_passwords SET password_hash = $2 WHERE account_id = $1")
        .bind(account_id)
        .bind(&password_hash)
        .execute(pool)
        .await?;

    if result.rows_affected() != 1 {
        return Err(DatabaseError::Corrupt(format!(
            "credential row missing for account {}",
            account_id
        )));
    }
    Ok(())
}

/// Delete the credential row and the account together; responds with the
/// account as it was before deletion.
pub async fn delete(pool: &PgPool, account_id: i32) -> Result<Account, DatabaseError> {
    let account = read_by_id(pool, account_id).await?;

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM account_passwords WHERE account_id = $1")
        .bind(account_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM accounts WHERE account_id = $1")
        .bind(account_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(account)
}

/// Resolve an email/password pair to the stored account. Exactly one
/// credential row must exist for the account; zero or several is corruption.
pub async fn check_credentials(
    pool: &PgPool,
    credentials: &Credentials,
) -> Result<Account, CredentialError> {
    let account = match read_by_email(pool, &credentials.email).await {
        Ok(account) => account,
        Err(DatabaseError::NotFound(_)) => return Err(CredentialError::UnknownEmail),
        Err(other) => return Err(other.into()),
    };

    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT password_hash FROM account_passwords WHERE account_id = $1")
            .bind(account.account_id)
            .fetch_all(pool)
            .await
            .map_err(DatabaseError::from)?;

    if rows.len() != 1 {
        return Err(DatabaseError::Corrupt(format!(
            "{} credential rows for account {}",
            rows.len(),
            account.account_id
        ))
        .into());
    }

    if !password::verify(&credentials.password, &rows[0].0) {
        return Err(CredentialError::Mismatch);
    }

    Ok(account)
}
