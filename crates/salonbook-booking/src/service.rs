//! Booking service — availability lookups and the booking lifecycle.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use salonbook_core::error::SalonbookResult;
use salonbook_core::models::booking::{
    Booking, BookingStatus, CancelledBy, CreateBooking, CreateReview,
};
use salonbook_core::models::notification::{CreateNotification, NotificationKind};
use salonbook_core::models::service::ServiceSnapshot;
use salonbook_core::repository::{
    BookingRepository, BusinessRepository, NotificationRepository, ServiceRepository,
};
use salonbook_core::time::{TimeOfDay, Weekday};
use tracing::info;
use uuid::Uuid;

use crate::availability;
use crate::config::BookingConfig;
use crate::error::BookingError;
use crate::reminder::{self, Reminder};

/// Who is performing an operation. Passed explicitly on every call;
/// there is no ambient current-user state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Customer { email: String },
    Owner { business_id: Uuid },
}

/// Input for an availability lookup. `barber_name` and `date` are
/// optional because the UI asks for slots before both are chosen.
#[derive(Debug, Clone)]
pub struct AvailabilityQuery {
    pub business_id: Uuid,
    pub barber_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub service_ids: Vec<Uuid>,
    /// The slot the customer currently has selected, if any.
    pub selected: Option<TimeOfDay>,
}

/// Availability lookup result.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailableSlots {
    /// Offerable slots in time order.
    pub slots: Vec<TimeOfDay>,
    /// The prior selection, kept only while it is still offerable.
    /// `None` tells the caller to clear the selection.
    pub selection: Option<TimeOfDay>,
}

/// Input for creating a booking.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub business_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub barber_name: String,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub service_ids: Vec<Uuid>,
}

/// Booking service.
///
/// Generic over repository implementations so the booking layer has
/// no dependency on the database crate.
pub struct BookingService<B, K, S, N>
where
    B: BusinessRepository,
    K: BookingRepository,
    S: ServiceRepository,
    N: NotificationRepository,
{
    business_repo: B,
    booking_repo: K,
    service_repo: S,
    notification_repo: N,
    config: BookingConfig,
}

impl<B, K, S, N> BookingService<B, K, S, N>
where
    B: BusinessRepository,
    K: BookingRepository,
    S: ServiceRepository,
    N: NotificationRepository,
{
    pub fn new(
        business_repo: B,
        booking_repo: K,
        service_repo: S,
        notification_repo: N,
        config: BookingConfig,
    ) -> Self {
        Self {
            business_repo,
            booking_repo,
            service_repo,
            notification_repo,
            config,
        }
    }

    /// Compute the slots offerable to a customer right now.
    ///
    /// A previously selected slot that no longer survives comes back
    /// as `selection: None`; the caller must drop it rather than
    /// submit a just-invalidated time.
    pub async fn available_slots(
        &self,
        query: AvailabilityQuery,
    ) -> SalonbookResult<AvailableSlots> {
        // 1. Resolve the business and, when named, the staff member.
        let business = self.business_repo.get_by_id(query.business_id).await?;
        let staff = match &query.barber_name {
            Some(name) => Some(business.staff_by_name(name).ok_or_else(|| {
                salonbook_core::SalonbookError::NotFound {
                    entity: "staff member".into(),
                    id: name.clone(),
                }
            })?),
            None => None,
        };

        // 2. Snapshot the requested services for their durations.
        let requested = self.resolve_snapshots(query.business_id, &query.service_ids).await?;

        // 3. Fetch the bookings the filter has to subtract. Only
        //    meaningful once a barber and a date are both fixed.
        let existing = match (staff, query.date) {
            (Some(staff), Some(date)) => {
                self.booking_repo
                    .list_active_for_barber_on_date(query.business_id, &staff.name, date)
                    .await?
            }
            _ => Vec::new(),
        };

        // 4. Run the pure filter over the canonical slot list.
        let slots = availability::filter_slots(
            &availability::business_day_slots(),
            staff,
            query.date,
            &requested,
            &existing,
            self.config.default_service_minutes,
        );

        let selection = query.selected.filter(|time| slots.contains(time));

        Ok(AvailableSlots { slots, selection })
    }

    /// The staff members able to take a booking at a fixed date and
    /// time, for pickers that choose the slot first.
    pub async fn available_barbers(
        &self,
        business_id: Uuid,
        date: NaiveDate,
        time: TimeOfDay,
    ) -> SalonbookResult<Vec<String>> {
        let business = self.business_repo.get_by_id(business_id).await?;
        Ok(availability::available_barbers(&business.staff, date, time)
            .into_iter()
            .map(|member| member.name.clone())
            .collect())
    }

    /// Create a booking in `Pending` status and notify the owner.
    ///
    /// The no-overlap check runs inside the repository's transaction,
    /// so two customers racing for the same slot cannot both win; the
    /// loser gets `SlotConflict` and must re-fetch availability.
    pub async fn create_booking(&self, request: BookingRequest) -> SalonbookResult<Booking> {
        // 1. Required fields.
        if request.customer_email.trim().is_empty() {
            return Err(BookingError::MissingField {
                field: "customer email",
            }
            .into());
        }
        if request.barber_name.trim().is_empty() {
            return Err(BookingError::MissingField {
                field: "barber name",
            }
            .into());
        }
        if request.service_ids.is_empty() {
            return Err(BookingError::NoServices.into());
        }

        // 2. The barber must exist and be working that weekday, and
        //    the slot must fall inside the working window.
        let business = self.business_repo.get_by_id(request.business_id).await?;
        let staff = business.staff_by_name(&request.barber_name).ok_or_else(|| {
            salonbook_core::SalonbookError::NotFound {
                entity: "staff member".into(),
                id: request.barber_name.clone(),
            }
        })?;

        let day = Weekday::from_date(request.date);
        let Some((window_start, window_end)) = staff.working_window(day) else {
            return Err(BookingError::NotWorkingThatDay {
                barber: staff.name.clone(),
                day,
            }
            .into());
        };
        if request.time.hour < window_start.hour || request.time.hour >= window_end.hour {
            return Err(BookingError::OutsideWorkingHours {
                barber: staff.name.clone(),
                time: request.time,
            }
            .into());
        }

        // 3. Freeze the service list and resolve the total duration.
        let services = self
            .resolve_snapshots(request.business_id, &request.service_ids)
            .await?;
        let duration_minutes =
            availability::total_duration_minutes(&services, self.config.default_service_minutes);

        // 4. Transactional insert; the overlap check happens in-store.
        let booking = self
            .booking_repo
            .create_checked(CreateBooking {
                business_id: request.business_id,
                customer_name: request.customer_name,
                customer_email: request.customer_email,
                barber_name: request.barber_name,
                date: request.date,
                time: request.time,
                duration_minutes,
                services,
            })
            .await?;

        info!(
            booking_id = %booking.id,
            business_id = %booking.business_id,
            barber = %booking.barber_name,
            date = %booking.date,
            time = %booking.time,
            "Booking created"
        );

        // 5. Tell the owner.
        self.notification_repo
            .append(CreateNotification {
                recipient: booking.business_id.to_string(),
                kind: NotificationKind::Requested,
                message: format!(
                    "New booking from {} for {} on {} at {}",
                    booking.customer_name,
                    service_names(&booking.services),
                    booking.date,
                    booking.time,
                ),
                booking_id: booking.id,
            })
            .await?;

        Ok(booking)
    }

    /// Owner accepts a pending booking.
    pub async fn confirm_booking(&self, actor: &Actor, booking_id: Uuid) -> SalonbookResult<Booking> {
        let booking = self.booking_repo.get_by_id(booking_id).await?;
        require_owner(actor, booking.business_id, "confirm")?;
        check_transition(&booking, BookingStatus::Confirmed)?;

        let booking = self
            .booking_repo
            .update_status(booking_id, BookingStatus::Pending, BookingStatus::Confirmed)
            .await?;

        info!(booking_id = %booking.id, "Booking confirmed");

        self.notification_repo
            .append(CreateNotification {
                recipient: booking.customer_email.clone(),
                kind: NotificationKind::Confirmed,
                message: format!(
                    "Your booking for {} on {} at {} has been confirmed!",
                    service_names(&booking.services),
                    booking.date,
                    booking.time,
                ),
                booking_id: booking.id,
            })
            .await?;

        Ok(booking)
    }

    /// Owner marks a confirmed booking as done.
    pub async fn complete_booking(
        &self,
        actor: &Actor,
        booking_id: Uuid,
    ) -> SalonbookResult<Booking> {
        let booking = self.booking_repo.get_by_id(booking_id).await?;
        require_owner(actor, booking.business_id, "complete")?;
        check_transition(&booking, BookingStatus::Completed)?;

        let business = self.business_repo.get_by_id(booking.business_id).await?;
        let booking = self
            .booking_repo
            .update_status(
                booking_id,
                BookingStatus::Confirmed,
                BookingStatus::Completed,
            )
            .await?;

        info!(booking_id = %booking.id, "Booking completed");

        self.notification_repo
            .append(CreateNotification {
                recipient: booking.customer_email.clone(),
                kind: NotificationKind::Completed,
                message: format!(
                    "Your booking at {} with {} for {} has been marked as completed!",
                    business.name,
                    booking.barber_name,
                    service_names(&booking.services),
                ),
                booking_id: booking.id,
            })
            .await?;

        Ok(booking)
    }

    /// Either party cancels an active booking. Records who cancelled
    /// and when, and notifies the other party.
    pub async fn cancel_booking(&self, actor: &Actor, booking_id: Uuid) -> SalonbookResult<Booking> {
        let booking = self.booking_repo.get_by_id(booking_id).await?;

        // 1. Work out which party is cancelling.
        let by = match actor {
            Actor::Owner { business_id } if *business_id == booking.business_id => {
                CancelledBy::Owner
            }
            Actor::Customer { email } if *email == booking.customer_email => CancelledBy::Customer,
            _ => {
                return Err(BookingError::Forbidden {
                    party: "booking's customer or the business owner",
                    action: "cancel",
                }
                .into());
            }
        };

        // 2. Only active bookings can be cancelled.
        check_transition(&booking, BookingStatus::Cancelled)?;

        // 3. Guarded write; records cancelled_by and cancelled_at.
        let booking = self.booking_repo.cancel(booking_id, by).await?;

        info!(booking_id = %booking.id, by = by.as_str(), "Booking cancelled");

        // 4. Tell the other party.
        let notification = match by {
            CancelledBy::Owner => {
                let business = self.business_repo.get_by_id(booking.business_id).await?;
                CreateNotification {
                    recipient: booking.customer_email.clone(),
                    kind: NotificationKind::Cancelled,
                    message: format!(
                        "Your booking at {} with {} for {} has been cancelled by the barber shop.",
                        business.name,
                        booking.barber_name,
                        service_names(&booking.services),
                    ),
                    booking_id: booking.id,
                }
            }
            CancelledBy::Customer => CreateNotification {
                recipient: booking.business_id.to_string(),
                kind: NotificationKind::Cancelled,
                message: format!(
                    "{} cancelled their booking for {} on {} at {}",
                    booking.customer_name,
                    service_names(&booking.services),
                    booking.date,
                    booking.time,
                ),
                booking_id: booking.id,
            },
        };
        self.notification_repo.append(notification).await?;

        Ok(booking)
    }

    /// Customer reviews a completed booking. Recomputes the business's
    /// aggregate rating and notifies the owner.
    pub async fn submit_review(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        review: CreateReview,
    ) -> SalonbookResult<Booking> {
        let booking = self.booking_repo.get_by_id(booking_id).await?;

        // 1. Only this booking's customer may review it.
        match actor {
            Actor::Customer { email } if *email == booking.customer_email => {}
            _ => {
                return Err(BookingError::Forbidden {
                    party: "booking's customer",
                    action: "review",
                }
                .into());
            }
        }

        // 2. Completed, unreviewed, rating in range.
        if booking.status != BookingStatus::Completed {
            return Err(BookingError::NotCompleted.into());
        }
        if booking.review.is_some() {
            return Err(BookingError::AlreadyReviewed.into());
        }
        if !(1..=5).contains(&review.rating) {
            return Err(BookingError::RatingOutOfRange(review.rating).into());
        }

        let rating = review.rating;
        let booking = self.booking_repo.attach_review(booking_id, review).await?;

        // 3. Recompute the aggregate over completed-and-reviewed
        //    bookings, rounded to one decimal.
        let reviewed = self.booking_repo.list_reviewed(booking.business_id).await?;
        let ratings: Vec<f64> = reviewed
            .iter()
            .filter_map(|b| b.review.as_ref())
            .map(|r| f64::from(r.rating))
            .collect();
        if !ratings.is_empty() {
            let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
            let rounded = (mean * 10.0).round() / 10.0;
            self.business_repo
                .set_rating(booking.business_id, rounded)
                .await?;
        }

        info!(booking_id = %booking.id, rating, "Review submitted");

        // 4. Tell the owner.
        let business = self.business_repo.get_by_id(booking.business_id).await?;
        let comment_suffix = booking
            .review
            .as_ref()
            .and_then(|r| r.comment.as_deref())
            .map(|c| format!(" - {c}"))
            .unwrap_or_default();
        self.notification_repo
            .append(CreateNotification {
                recipient: booking.business_id.to_string(),
                kind: NotificationKind::Review,
                message: format!(
                    "{} left a review for {} ({}, {}): {}/5{}",
                    booking.customer_name,
                    business.name,
                    booking.barber_name,
                    service_names(&booking.services),
                    rating,
                    comment_suffix,
                ),
                booking_id: booking.id,
            })
            .await?;

        Ok(booking)
    }

    /// A customer's active bookings, soonest first.
    pub async fn upcoming_for_customer(&self, email: &str) -> SalonbookResult<Vec<Booking>> {
        self.booking_repo.list_upcoming_for_customer(email).await
    }

    /// A customer's finished bookings, newest first.
    pub async fn past_for_customer(&self, email: &str) -> SalonbookResult<Vec<Booking>> {
        self.booking_repo.list_past_for_customer(email).await
    }

    /// A business's active bookings, soonest first.
    pub async fn upcoming_for_business(&self, business_id: Uuid) -> SalonbookResult<Vec<Booking>> {
        self.booking_repo.list_upcoming_for_business(business_id).await
    }

    /// A business's finished bookings, newest first.
    pub async fn past_for_business(&self, business_id: Uuid) -> SalonbookResult<Vec<Booking>> {
        self.booking_repo.list_past_for_business(business_id).await
    }

    /// Local reminders due for a customer's upcoming bookings, using
    /// the configured window. The caller hands each entry to the
    /// device's one-shot notification scheduler.
    pub async fn due_reminders_for_customer(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> SalonbookResult<Vec<Reminder>> {
        let bookings = self.booking_repo.list_upcoming_for_customer(email).await?;

        // Reminder bodies name the salon; the booking row only holds
        // its id.
        let mut names: HashMap<Uuid, String> = HashMap::new();
        for booking in &bookings {
            if !names.contains_key(&booking.business_id) {
                let business = self.business_repo.get_by_id(booking.business_id).await?;
                names.insert(booking.business_id, business.name);
            }
        }

        Ok(reminder::due_reminders(
            bookings
                .iter()
                .map(|booking| (booking, names[&booking.business_id].as_str())),
            now,
            self.config.reminder_window_hours,
        ))
    }

    async fn resolve_snapshots(
        &self,
        business_id: Uuid,
        service_ids: &[Uuid],
    ) -> SalonbookResult<Vec<ServiceSnapshot>> {
        let mut snapshots = Vec::with_capacity(service_ids.len());
        for id in service_ids {
            let service = self.service_repo.get_by_id(business_id, *id).await?;
            snapshots.push(ServiceSnapshot::from(&service));
        }
        Ok(snapshots)
    }
}

fn require_owner(actor: &Actor, business_id: Uuid, action: &'static str) -> SalonbookResult<()> {
    match actor {
        Actor::Owner { business_id: owner } if *owner == business_id => Ok(()),
        _ => Err(BookingError::Forbidden {
            party: "business owner",
            action,
        }
        .into()),
    }
}

fn check_transition(booking: &Booking, to: BookingStatus) -> SalonbookResult<()> {
    if booking.status.can_transition_to(to) {
        Ok(())
    } else {
        Err(BookingError::InvalidTransition {
            from: booking.status,
            to,
        }
        .into())
    }
}

fn service_names(services: &[ServiceSnapshot]) -> String {
    services
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
