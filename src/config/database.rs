//! Database configuration module for the ledger store.
//!
//! This module handles database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the foreign keys (and their cascade rules) come straight from the entity relations.

use crate::entities::{Debt, DebtPayment, DebtSchedule};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/installment_ledger.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(&get_database_url())
        .await
        .map_err(Into::into)
}

/// Creates the debt, schedule and payment tables if they do not exist yet.
///
/// Tables are created parent-first so the foreign keys resolve.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut debt_table = schema.create_table_from_entity(Debt);
    let mut schedule_table = schema.create_table_from_entity(DebtSchedule);
    let mut payment_table = schema.create_table_from_entity(DebtPayment);

    debt_table.if_not_exists();
    schedule_table.if_not_exists();
    payment_table.if_not_exists();

    db.execute(builder.build(&debt_table)).await?;
    db.execute(builder.build(&schedule_table)).await?;
    db.execute(builder.build(&payment_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DebtModel, DebtPaymentModel, DebtScheduleModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<DebtModel> = Debt::find().limit(1).all(&db).await?;
        let _: Vec<DebtScheduleModel> = DebtSchedule::find().limit(1).all(&db).await?;
        let _: Vec<DebtPaymentModel> = DebtPayment::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
