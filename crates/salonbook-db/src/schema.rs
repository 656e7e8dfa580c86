//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Calendar days are ISO `YYYY-MM-DD`
//! strings and slot times are 12-hour labels; bookings additionally
//! carry `start_minutes`/`duration_minutes` integers so the overlap
//! predicate can run inside the database.

use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, Deserialize)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Businesses (root aggregate; staff roster is embedded)
-- =======================================================================
DEFINE TABLE business SCHEMAFULL;
DEFINE FIELD name ON TABLE business TYPE string;
DEFINE FIELD address ON TABLE business TYPE string;
DEFINE FIELD location ON TABLE business TYPE object;
DEFINE FIELD location.latitude ON TABLE business TYPE float;
DEFINE FIELD location.longitude ON TABLE business TYPE float;
DEFINE FIELD staff ON TABLE business TYPE array DEFAULT [] \
    ASSERT array::len($value) <= 5;
DEFINE FIELD staff.* ON TABLE business TYPE object FLEXIBLE;
DEFINE FIELD rating ON TABLE business TYPE float DEFAULT 0.0;
DEFINE FIELD created_at ON TABLE business TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE business TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Service catalog (business scope)
-- =======================================================================
DEFINE TABLE service SCHEMAFULL;
DEFINE FIELD business_id ON TABLE service TYPE string;
DEFINE FIELD name ON TABLE service TYPE string;
DEFINE FIELD price ON TABLE service TYPE float;
DEFINE FIELD duration_minutes ON TABLE service TYPE int;
DEFINE FIELD created_at ON TABLE service TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_service_business ON TABLE service \
    COLUMNS business_id;

-- =======================================================================
-- Bookings (business scope; services are frozen snapshots)
-- =======================================================================
DEFINE TABLE booking SCHEMAFULL;
DEFINE FIELD business_id ON TABLE booking TYPE string;
DEFINE FIELD customer_name ON TABLE booking TYPE string;
DEFINE FIELD customer_email ON TABLE booking TYPE string;
DEFINE FIELD barber_name ON TABLE booking TYPE string;
DEFINE FIELD date ON TABLE booking TYPE string;
DEFINE FIELD time ON TABLE booking TYPE string;
DEFINE FIELD start_minutes ON TABLE booking TYPE int;
DEFINE FIELD duration_minutes ON TABLE booking TYPE int;
DEFINE FIELD services ON TABLE booking TYPE array DEFAULT [];
DEFINE FIELD services.* ON TABLE booking TYPE object FLEXIBLE;
DEFINE FIELD status ON TABLE booking TYPE string \
    ASSERT $value IN ['Pending', 'Confirmed', 'Completed', 'Cancelled'];
DEFINE FIELD cancelled_by ON TABLE booking TYPE option<string>;
DEFINE FIELD cancelled_at ON TABLE booking TYPE option<datetime>;
DEFINE FIELD review ON TABLE booking TYPE option<object>;
DEFINE FIELD review.rating ON TABLE booking TYPE int;
DEFINE FIELD review.comment ON TABLE booking TYPE option<string>;
DEFINE FIELD review.date ON TABLE booking TYPE datetime;
DEFINE FIELD created_at ON TABLE booking TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_booking_barber_date ON TABLE booking \
    COLUMNS business_id, barber_name, date;
DEFINE INDEX idx_booking_customer ON TABLE booking \
    COLUMNS customer_email;
DEFINE INDEX idx_booking_business ON TABLE booking \
    COLUMNS business_id;

-- =======================================================================
-- Notifications (append-only from the core's perspective)
-- =======================================================================
DEFINE TABLE notification SCHEMAFULL;
DEFINE FIELD recipient ON TABLE notification TYPE string;
DEFINE FIELD kind ON TABLE notification TYPE string \
    ASSERT $value IN ['booking', 'confirmed', 'completed', 'cancel', \
    'review'];
DEFINE FIELD message ON TABLE notification TYPE string;
DEFINE FIELD booking_id ON TABLE notification TYPE string;
DEFINE FIELD read ON TABLE notification TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE notification TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_notification_recipient ON TABLE notification \
    COLUMNS recipient;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL).await?.check()?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
