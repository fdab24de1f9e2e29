use crate::config::DatabaseConfig;
use crate::domain::ports::{SchemaAdmin, SchemaChange, TicketStore};
use crate::domain::ticket::{PayeeDetails, Payout, Ticket, TicketNumber};
use crate::error::{PayoutError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use std::time::Duration;

/// SQLSTATE raised by MySQL for `ER_DUP_FIELDNAME`.
const DUPLICATE_COLUMN: &str = "42S21";

// Payee columns may not exist yet, so the row is read by name afterwards.
const SELECT_TICKET: &str = "SELECT * FROM tickets WHERE TicketNumber = ?";

// The paid/winner predicate makes the update its own eligibility check.
const APPLY_PAYMENT: &str = "UPDATE tickets SET Surname = ?, FirstName = ?, PhoneNumber = ?, \
     PhoneNetwork = ?, IdType = ?, IdNumber = ?, AmountPaid = ?, method = ?, \
     Paid = 1, PaidDate_Time = NOW() \
     WHERE TicketNumber = ? AND Paid = 0 AND Winner = 1";

const ADD_PAYEE_COLUMNS: &str = "ALTER TABLE tickets \
     ADD Surname VARCHAR(255), \
     ADD FirstName VARCHAR(255), \
     ADD PhoneNumber VARCHAR(255), \
     ADD PhoneNetwork VARCHAR(255), \
     ADD IdType VARCHAR(255), \
     ADD IdNumber VARCHAR(255), \
     ADD AmountPaid DECIMAL(10,2), \
     ADD method VARCHAR(255), \
     ADD PaidDate_Time DATETIME";

/// Ticket store backed by the `tickets` table in MySQL.
///
/// The pool is shared process-wide; every call borrows one connection for
/// a single statement and hands it straight back.
#[derive(Clone)]
pub struct MySqlTicketStore {
    pool: MySqlPool,
}

impl MySqlTicketStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Builds the pool from the deployment's connection parameters and checks
    /// that one connection can be opened.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.database);
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        tracing::info!(host = %config.host, database = %config.database, "connected to database");
        Ok(Self::new(pool))
    }
}

/// Reads a payee column, treating a table without it as a row without a value.
fn payee_column<T>(read: std::result::Result<Option<T>, sqlx::Error>) -> Result<Option<T>> {
    match read {
        Ok(value) => Ok(value),
        Err(sqlx::Error::ColumnNotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn payout_from_row(row: &MySqlRow) -> Result<Option<Payout>> {
    let amount_paid: Option<Decimal> = payee_column(row.try_get("AmountPaid"))?;
    let method: Option<String> = payee_column(row.try_get("method"))?;
    let paid_at: Option<DateTime<Utc>> = payee_column(row.try_get("PaidDate_Time"))?;

    let (Some(amount_paid), Some(method), Some(paid_at)) = (amount_paid, method, paid_at) else {
        return Ok(None);
    };

    Ok(Some(Payout {
        details: PayeeDetails {
            surname: payee_column(row.try_get("Surname"))?,
            first_name: payee_column(row.try_get("FirstName"))?,
            phone_number: payee_column(row.try_get("PhoneNumber"))?,
            phone_network: payee_column(row.try_get("PhoneNetwork"))?,
            id_type: payee_column(row.try_get("IdType"))?,
            id_number: payee_column(row.try_get("IdNumber"))?,
            amount_paid,
            method,
        },
        paid_at,
    }))
}

fn ticket_from_row(row: &MySqlRow) -> Result<Ticket> {
    let number: String = row.try_get("TicketNumber")?;
    let number = TicketNumber::parse(number)
        .map_err(|e| PayoutError::ValidationError(e.to_string()))?;
    let paid: bool = row.try_get("Paid")?;
    let payout = if paid { payout_from_row(row)? } else { None };

    Ok(Ticket {
        number,
        winner: row.try_get("Winner")?,
        paid,
        payout,
    })
}

#[async_trait]
impl TicketStore for MySqlTicketStore {
    async fn find_by_number(&self, number: &TicketNumber) -> Result<Option<Ticket>> {
        let row = sqlx::query(SELECT_TICKET)
            .bind(number.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(ticket_from_row).transpose()
    }

    async fn apply_payment(&self, number: &TicketNumber, details: &PayeeDetails) -> Result<u64> {
        let result = sqlx::query(APPLY_PAYMENT)
            .bind(&details.surname)
            .bind(&details.first_name)
            .bind(&details.phone_number)
            .bind(&details.phone_network)
            .bind(&details.id_type)
            .bind(&details.id_number)
            .bind(details.amount_paid)
            .bind(&details.method)
            .bind(number.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SchemaAdmin for MySqlTicketStore {
    async fn add_payee_columns(&self) -> Result<SchemaChange> {
        match sqlx::query(ADD_PAYEE_COLUMNS).execute(&self.pool).await {
            Ok(_) => {
                tracing::info!("payee columns added to tickets table");
                Ok(SchemaChange::Applied)
            }
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(DUPLICATE_COLUMN) => {
                tracing::info!("payee columns already present");
                Ok(SchemaChange::AlreadyApplied)
            }
            Err(e) => Err(e.into()),
        }
    }
}
