//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Booking-scoped queries take a
//! `business_id` so two businesses can never see (or conflict with)
//! each other's calendars, even when staff names collide.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::SalonbookResult;
use crate::models::{
    booking::{Booking, BookingStatus, CancelledBy, CreateBooking, CreateReview},
    business::{Business, CreateBusiness, StaffMember, UpdateBusiness},
    notification::{CreateNotification, Notification},
    service::{CreateService, Service},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Businesses (root aggregate, embeds the staff roster)
// ---------------------------------------------------------------------------

pub trait BusinessRepository: Send + Sync {
    fn create(
        &self,
        input: CreateBusiness,
    ) -> impl Future<Output = SalonbookResult<Business>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SalonbookResult<Business>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateBusiness,
    ) -> impl Future<Output = SalonbookResult<Business>> + Send;
    /// Replace the whole staff roster. The table schema re-asserts the
    /// five-member cap.
    fn set_staff(
        &self,
        id: Uuid,
        staff: Vec<StaffMember>,
    ) -> impl Future<Output = SalonbookResult<Business>> + Send;
    /// Overwrite the aggregate rating (already rounded by the caller).
    fn set_rating(&self, id: Uuid, rating: f64)
    -> impl Future<Output = SalonbookResult<()>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = SalonbookResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = SalonbookResult<PaginatedResult<Business>>> + Send;
}

// ---------------------------------------------------------------------------
// Service catalog (business-scoped)
// ---------------------------------------------------------------------------

pub trait ServiceRepository: Send + Sync {
    fn create(&self, input: CreateService) -> impl Future<Output = SalonbookResult<Service>> + Send;
    fn get_by_id(
        &self,
        business_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = SalonbookResult<Service>> + Send;
    fn delete(
        &self,
        business_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = SalonbookResult<()>> + Send;
    fn list_by_business(
        &self,
        business_id: Uuid,
    ) -> impl Future<Output = SalonbookResult<Vec<Service>>> + Send;
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

pub trait BookingRepository: Send + Sync {
    /// Insert a booking in `Pending` status, but only if no active
    /// booking for the same staff member on the same date overlaps the
    /// `[start, start + duration)` window. The check and the insert run
    /// in a single transaction; losing the race surfaces as
    /// [`SalonbookError::SlotConflict`](crate::error::SalonbookError).
    fn create_checked(
        &self,
        input: CreateBooking,
    ) -> impl Future<Output = SalonbookResult<Booking>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SalonbookResult<Booking>> + Send;

    /// Active (Pending or Confirmed) bookings for one staff member on
    /// one date, the set the availability filter subtracts.
    fn list_active_for_barber_on_date(
        &self,
        business_id: Uuid,
        barber_name: &str,
        date: NaiveDate,
    ) -> impl Future<Output = SalonbookResult<Vec<Booking>>> + Send;

    /// Active bookings for a customer, soonest first.
    fn list_upcoming_for_customer(
        &self,
        customer_email: &str,
    ) -> impl Future<Output = SalonbookResult<Vec<Booking>>> + Send;

    /// Completed or cancelled bookings for a customer, newest first.
    fn list_past_for_customer(
        &self,
        customer_email: &str,
    ) -> impl Future<Output = SalonbookResult<Vec<Booking>>> + Send;

    /// Active bookings for a business, soonest first.
    fn list_upcoming_for_business(
        &self,
        business_id: Uuid,
    ) -> impl Future<Output = SalonbookResult<Vec<Booking>>> + Send;

    /// Completed or cancelled bookings for a business, newest first.
    fn list_past_for_business(
        &self,
        business_id: Uuid,
    ) -> impl Future<Output = SalonbookResult<Vec<Booking>>> + Send;

    /// Move a booking from `from` to `to`. The write is guarded on the
    /// current status, so a booking that moved on in the meantime is
    /// not updated.
    fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> impl Future<Output = SalonbookResult<Booking>> + Send;

    /// Cancel an active booking, recording who cancelled and when.
    /// Guarded on the status still being active.
    fn cancel(
        &self,
        id: Uuid,
        by: CancelledBy,
    ) -> impl Future<Output = SalonbookResult<Booking>> + Send;

    /// Attach a review to a completed, not-yet-reviewed booking.
    fn attach_review(
        &self,
        id: Uuid,
        review: CreateReview,
    ) -> impl Future<Output = SalonbookResult<Booking>> + Send;

    /// Completed bookings for a business that carry a review; the set
    /// the aggregate rating is recomputed from.
    fn list_reviewed(
        &self,
        business_id: Uuid,
    ) -> impl Future<Output = SalonbookResult<Vec<Booking>>> + Send;
}

// ---------------------------------------------------------------------------
// Notifications (append + recipient-side maintenance)
// ---------------------------------------------------------------------------

pub trait NotificationRepository: Send + Sync {
    fn append(
        &self,
        input: CreateNotification,
    ) -> impl Future<Output = SalonbookResult<Notification>> + Send;

    /// Newest first.
    fn list_for_recipient(
        &self,
        recipient: &str,
        pagination: Pagination,
    ) -> impl Future<Output = SalonbookResult<PaginatedResult<Notification>>> + Send;

    fn mark_read(
        &self,
        recipient: &str,
        id: Uuid,
    ) -> impl Future<Output = SalonbookResult<()>> + Send;

    fn delete(&self, recipient: &str, id: Uuid)
    -> impl Future<Output = SalonbookResult<()>> + Send;

    /// Remove everything for a recipient; returns how many were removed.
    fn clear_for_recipient(
        &self,
        recipient: &str,
    ) -> impl Future<Output = SalonbookResult<u64>> + Send;
}
