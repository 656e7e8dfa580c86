//! SurrealDB implementation of [`BookingRepository`].
//!
//! Booking creation runs inside a database transaction so that the
//! conflict check and the insert are atomic. Two concurrent attempts
//! on the same slot cannot both observe an empty conflict set and
//! both commit.

use chrono::NaiveDate;
use salonbook_core::error::SalonbookResult;
use salonbook_core::models::booking::{
    Booking, BookingStatus, CancelledBy, CreateBooking, CreateReview, Review,
};
use salonbook_core::models::service::ServiceSnapshot;
use salonbook_core::repository::BookingRepository;
use salonbook_core::time::TimeOfDay;
use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;

/// Must match the THROW literal in the create transaction.
const SLOT_TAKEN_MARKER: &str = "slot_taken";

#[derive(Debug, Deserialize)]
struct ReviewRow {
    rating: u8,
    comment: Option<String>,
    date: Datetime,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            rating: row.rating,
            comment: row.comment,
            date: row.date.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BookingRow {
    business_id: String,
    customer_name: String,
    customer_email: String,
    barber_name: String,
    date: String,
    time: String,
    duration_minutes: u32,
    services: Vec<ServiceSnapshot>,
    status: String,
    cancelled_by: Option<String>,
    cancelled_at: Option<Datetime>,
    review: Option<ReviewRow>,
    created_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct BookingRowWithId {
    record_id: String,
    business_id: String,
    customer_name: String,
    customer_email: String,
    barber_name: String,
    date: String,
    time: String,
    duration_minutes: u32,
    services: Vec<ServiceSnapshot>,
    status: String,
    cancelled_by: Option<String>,
    cancelled_at: Option<Datetime>,
    review: Option<ReviewRow>,
    created_at: Datetime,
}

fn parse_status(raw: &str) -> Result<BookingStatus, DbError> {
    BookingStatus::parse(raw)
        .ok_or_else(|| DbError::Decode(format!("unknown booking status: {raw}")))
}

fn parse_cancelled_by(raw: &str) -> Result<CancelledBy, DbError> {
    CancelledBy::parse(raw)
        .ok_or_else(|| DbError::Decode(format!("unknown cancelling party: {raw}")))
}

impl BookingRow {
    fn into_booking(self, id: Uuid) -> Result<Booking, DbError> {
        let business_id = Uuid::parse_str(&self.business_id)
            .map_err(|e| DbError::Decode(format!("invalid business UUID: {e}")))?;
        let date = self
            .date
            .parse::<NaiveDate>()
            .map_err(|e| DbError::Decode(format!("invalid booking date: {e}")))?;
        let time = self
            .time
            .parse::<TimeOfDay>()
            .map_err(|e| DbError::Decode(format!("invalid booking time: {e}")))?;
        let status = parse_status(&self.status)?;
        let cancelled_by = self
            .cancelled_by
            .as_deref()
            .map(parse_cancelled_by)
            .transpose()?;
        Ok(Booking {
            id,
            business_id,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            barber_name: self.barber_name,
            date,
            time,
            duration_minutes: self.duration_minutes,
            services: self.services,
            status,
            cancelled_by,
            cancelled_at: self.cancelled_at.map(Into::into),
            review: self.review.map(Into::into),
            created_at: self.created_at.into(),
        })
    }
}

impl BookingRowWithId {
    fn try_into_booking(self) -> Result<Booking, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let row = BookingRow {
            business_id: self.business_id,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            barber_name: self.barber_name,
            date: self.date,
            time: self.time,
            duration_minutes: self.duration_minutes,
            services: self.services,
            status: self.status,
            cancelled_by: self.cancelled_by,
            cancelled_at: self.cancelled_at,
            review: self.review,
            created_at: self.created_at,
        };
        row.into_booking(id)
    }
}

/// SurrealDB implementation of the Booking repository.
#[derive(Clone)]
pub struct SurrealBookingRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealBookingRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn list_rows(
        &self,
        query: &'static str,
        key: &'static str,
        value: String,
    ) -> SalonbookResult<Vec<Booking>> {
        let mut result = self
            .db
            .query(query)
            .bind((key, value))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_booking())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}

impl<C: Connection> BookingRepository for SurrealBookingRepository<C> {
    async fn create_checked(&self, input: CreateBooking) -> SalonbookResult<Booking> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let start_minutes = u32::from(input.time.minutes_from_midnight());
        let end_minutes = start_minutes + input.duration_minutes;

        let mut result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 LET $conflicts = (SELECT VALUE id FROM booking \
                 WHERE business_id = $business_id \
                 AND barber_name = $barber_name \
                 AND date = $date \
                 AND status IN ['Pending', 'Confirmed'] \
                 AND start_minutes < $end_minutes \
                 AND start_minutes + duration_minutes > $start_minutes); \
                 IF array::len($conflicts) > 0 { THROW 'slot_taken'; }; \
                 CREATE type::thing('booking', $id) SET \
                 business_id = $business_id, \
                 customer_name = $customer_name, \
                 customer_email = $customer_email, \
                 barber_name = $barber_name, \
                 date = $date, \
                 time = $time, \
                 start_minutes = $start_minutes, \
                 duration_minutes = $duration_minutes, \
                 services = $services, \
                 status = 'Pending'; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str.clone()))
            .bind(("business_id", input.business_id.to_string()))
            .bind(("customer_name", input.customer_name))
            .bind(("customer_email", input.customer_email))
            .bind(("barber_name", input.barber_name.clone()))
            .bind(("date", input.date.to_string()))
            .bind(("time", input.time.to_string()))
            .bind(("start_minutes", start_minutes))
            .bind(("end_minutes", end_minutes))
            .bind(("duration_minutes", input.duration_minutes))
            .bind(("services", input.services))
            .await
            .map_err(DbError::from)?;

        let errors = result.take_errors();
        if !errors.is_empty() {
            if errors
                .values()
                .any(|e| e.to_string().contains(SLOT_TAKEN_MARKER))
            {
                return Err(DbError::SlotConflict {
                    barber: input.barber_name,
                    date: input.date.to_string(),
                    time: input.time.to_string(),
                }
                .into());
            }
            // A failed transaction reports every statement; surface the
            // earliest error, the later ones are cascade noise.
            let mut errors: Vec<_> = errors.into_iter().collect();
            errors.sort_by_key(|(index, _)| *index);
            let (_, error) = errors.remove(0);
            return Err(DbError::Surreal(error).into());
        }

        // The CREATE is the last statement that yields rows.
        let create_index = result.num_statements() - 1;
        let rows: Vec<BookingRow> = result.take(create_index).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> SalonbookResult<Booking> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('booking', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn list_active_for_barber_on_date(
        &self,
        business_id: Uuid,
        barber_name: &str,
        date: NaiveDate,
    ) -> SalonbookResult<Vec<Booking>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM booking \
                 WHERE business_id = $business_id \
                 AND barber_name = $barber_name \
                 AND date = $date \
                 AND status IN ['Pending', 'Confirmed'] \
                 ORDER BY start_minutes ASC",
            )
            .bind(("business_id", business_id.to_string()))
            .bind(("barber_name", barber_name.to_string()))
            .bind(("date", date.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_booking())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn list_upcoming_for_customer(
        &self,
        customer_email: &str,
    ) -> SalonbookResult<Vec<Booking>> {
        self.list_rows(
            "SELECT meta::id(id) AS record_id, * FROM booking \
             WHERE customer_email = $customer_email \
             AND status IN ['Pending', 'Confirmed'] \
             ORDER BY date ASC, start_minutes ASC",
            "customer_email",
            customer_email.to_string(),
        )
        .await
    }

    async fn list_past_for_customer(
        &self,
        customer_email: &str,
    ) -> SalonbookResult<Vec<Booking>> {
        self.list_rows(
            "SELECT meta::id(id) AS record_id, * FROM booking \
             WHERE customer_email = $customer_email \
             AND status IN ['Completed', 'Cancelled'] \
             ORDER BY date DESC, start_minutes DESC",
            "customer_email",
            customer_email.to_string(),
        )
        .await
    }

    async fn list_upcoming_for_business(
        &self,
        business_id: Uuid,
    ) -> SalonbookResult<Vec<Booking>> {
        self.list_rows(
            "SELECT meta::id(id) AS record_id, * FROM booking \
             WHERE business_id = $business_id \
             AND status IN ['Pending', 'Confirmed'] \
             ORDER BY date ASC, start_minutes ASC",
            "business_id",
            business_id.to_string(),
        )
        .await
    }

    async fn list_past_for_business(&self, business_id: Uuid) -> SalonbookResult<Vec<Booking>> {
        self.list_rows(
            "SELECT meta::id(id) AS record_id, * FROM booking \
             WHERE business_id = $business_id \
             AND status IN ['Completed', 'Cancelled'] \
             ORDER BY date DESC, start_minutes DESC",
            "business_id",
            business_id.to_string(),
        )
        .await
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> SalonbookResult<Booking> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::thing('booking', $id) SET status = $to \
                 WHERE status = $from",
            )
            .bind(("id", id_str.clone()))
            .bind(("from", from.to_string()))
            .bind(("to", to.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        // No rows means the record is gone or its status moved on.
        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn cancel(&self, id: Uuid, by: CancelledBy) -> SalonbookResult<Booking> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::thing('booking', $id) SET \
                 status = 'Cancelled', \
                 cancelled_by = $by, \
                 cancelled_at = time::now() \
                 WHERE status IN ['Pending', 'Confirmed']",
            )
            .bind(("id", id_str.clone()))
            .bind(("by", by.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn attach_review(&self, id: Uuid, input: CreateReview) -> SalonbookResult<Booking> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::thing('booking', $id) SET \
                 review = { rating: $rating, comment: $comment, date: time::now() } \
                 WHERE status = 'Completed' AND review = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("rating", input.rating))
            .bind(("comment", input.comment))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn list_reviewed(&self, business_id: Uuid) -> SalonbookResult<Vec<Booking>> {
        self.list_rows(
            "SELECT meta::id(id) AS record_id, * FROM booking \
             WHERE business_id = $business_id \
             AND status = 'Completed' \
             AND review != NONE",
            "business_id",
            business_id.to_string(),
        )
        .await
    }
}
