//! SurrealDB implementation of [`NotificationRepository`].

use salonbook_core::error::SalonbookResult;
use salonbook_core::models::notification::{CreateNotification, Notification, NotificationKind};
use salonbook_core::repository::{NotificationRepository, PaginatedResult, Pagination};
use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, Deserialize)]
struct NotificationRow {
    recipient: String,
    kind: String,
    message: String,
    booking_id: String,
    read: bool,
    created_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct NotificationRowWithId {
    record_id: String,
    recipient: String,
    kind: String,
    message: String,
    booking_id: String,
    read: bool,
    created_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

fn parse_kind(raw: &str) -> Result<NotificationKind, DbError> {
    NotificationKind::parse(raw)
        .ok_or_else(|| DbError::Decode(format!("unknown notification kind: {raw}")))
}

impl NotificationRow {
    fn into_notification(self, id: Uuid) -> Result<Notification, DbError> {
        let kind = parse_kind(&self.kind)?;
        let booking_id = Uuid::parse_str(&self.booking_id)
            .map_err(|e| DbError::Decode(format!("invalid booking UUID: {e}")))?;
        Ok(Notification {
            id,
            recipient: self.recipient,
            kind,
            message: self.message,
            booking_id,
            read: self.read,
            created_at: self.created_at.into(),
        })
    }
}

impl NotificationRowWithId {
    fn try_into_notification(self) -> Result<Notification, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let row = NotificationRow {
            recipient: self.recipient,
            kind: self.kind,
            message: self.message,
            booking_id: self.booking_id,
            read: self.read,
            created_at: self.created_at,
        };
        row.into_notification(id)
    }
}

/// SurrealDB implementation of the Notification repository.
#[derive(Clone)]
pub struct SurrealNotificationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealNotificationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> NotificationRepository for SurrealNotificationRepository<C> {
    async fn append(&self, input: CreateNotification) -> SalonbookResult<Notification> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // read defaults to false through the schema.
        let result = self
            .db
            .query(
                "CREATE type::thing('notification', $id) SET \
                 recipient = $recipient, \
                 kind = $kind, \
                 message = $message, \
                 booking_id = $booking_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("recipient", input.recipient))
            .bind(("kind", input.kind.as_str().to_string()))
            .bind(("message", input.message))
            .bind(("booking_id", input.booking_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<NotificationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "notification".into(),
            id: id_str,
        })?;

        Ok(row.into_notification(id)?)
    }

    async fn list_for_recipient(
        &self,
        recipient: &str,
        pagination: Pagination,
    ) -> SalonbookResult<PaginatedResult<Notification>> {
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM notification \
                 WHERE recipient = $recipient GROUP ALL",
            )
            .bind(("recipient", recipient.to_string()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM notification \
                 WHERE recipient = $recipient \
                 ORDER BY created_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("recipient", recipient.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NotificationRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_notification())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn mark_read(&self, recipient: &str, id: Uuid) -> SalonbookResult<()> {
        let result = self
            .db
            .query(
                "UPDATE type::thing('notification', $id) SET read = true \
                 WHERE recipient = $recipient",
            )
            .bind(("id", id.to_string()))
            .bind(("recipient", recipient.to_string()))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from)?;

        Ok(())
    }

    async fn delete(&self, recipient: &str, id: Uuid) -> SalonbookResult<()> {
        self.db
            .query(
                "DELETE type::thing('notification', $id) \
                 WHERE recipient = $recipient",
            )
            .bind(("id", id.to_string()))
            .bind(("recipient", recipient.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn clear_for_recipient(&self, recipient: &str) -> SalonbookResult<u64> {
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM notification \
                 WHERE recipient = $recipient GROUP ALL",
            )
            .bind(("recipient", recipient.to_string()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let removed = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query("DELETE notification WHERE recipient = $recipient")
            .bind(("recipient", recipient.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(removed)
    }
}
