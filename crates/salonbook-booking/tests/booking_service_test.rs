//! Integration tests for the booking lifecycle and availability,
//! running against an in-memory SurrealDB with migrations applied.

use chrono::{NaiveDate, NaiveTime};
use salonbook_booking::{
    Actor, AvailabilityQuery, BookingConfig, BookingRequest, BookingService, RosterService,
};
use salonbook_core::SalonbookError;
use salonbook_core::models::booking::{BookingStatus, CancelledBy, CreateReview};
use salonbook_core::models::business::{CreateBusiness, DaySchedule, GeoPoint};
use salonbook_core::models::notification::NotificationKind;
use salonbook_core::models::service::CreateService;
use salonbook_core::repository::{NotificationRepository, Pagination};
use salonbook_core::time::{TimeOfDay, Weekday};
use salonbook_db::repository::{
    SurrealBookingRepository, SurrealBusinessRepository, SurrealNotificationRepository,
    SurrealServiceRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type TestBookingService = BookingService<
    SurrealBusinessRepository<Db>,
    SurrealBookingRepository<Db>,
    SurrealServiceRepository<Db>,
    SurrealNotificationRepository<Db>,
>;
type TestRosterService = RosterService<SurrealBusinessRepository<Db>, SurrealServiceRepository<Db>>;

/// 2024-06-03 is a Monday.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

fn slot(label: &str) -> TimeOfDay {
    label.parse().unwrap()
}

/// A default week with one weekday switched on, 9:00 AM–5:00 PM.
fn working_on(day: Weekday) -> Vec<DaySchedule> {
    let mut week = DaySchedule::default_week();
    for schedule in &mut week {
        if schedule.day == day {
            schedule.is_working = true;
        }
    }
    week
}

struct TestContext {
    bookings: TestBookingService,
    roster: TestRosterService,
    notifications: SurrealNotificationRepository<Db>,
    business_id: Uuid,
    haircut_id: Uuid,
    beard_trim_id: Uuid,
}

/// Spin up an in-memory DB, run migrations, and provision a business
/// with one barber (Alex, Mondays 9–5) and two services.
async fn setup() -> TestContext {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    salonbook_db::run_migrations(&db).await.unwrap();

    let business_repo = SurrealBusinessRepository::new(db.clone());
    let booking_repo = SurrealBookingRepository::new(db.clone());
    let service_repo = SurrealServiceRepository::new(db.clone());
    let notification_repo = SurrealNotificationRepository::new(db.clone());

    let roster = RosterService::new(
        business_repo.clone(),
        service_repo.clone(),
        BookingConfig::default(),
    );

    let business = roster
        .create_business(CreateBusiness {
            name: "Fade Factory".into(),
            address: "12 Clipper St".into(),
            location: GeoPoint {
                latitude: 45.07,
                longitude: 7.68,
            },
        })
        .await
        .unwrap();

    roster
        .add_staff_member(business.id, "Alex".into(), working_on(Weekday::Monday))
        .await
        .unwrap();

    let haircut = roster
        .add_service(CreateService {
            business_id: business.id,
            name: "Haircut".into(),
            price: 25.0,
            duration_minutes: 30,
        })
        .await
        .unwrap();
    let beard_trim = roster
        .add_service(CreateService {
            business_id: business.id,
            name: "Beard Trim".into(),
            price: 10.0,
            duration_minutes: 15,
        })
        .await
        .unwrap();

    let bookings = BookingService::new(
        business_repo,
        booking_repo,
        service_repo,
        notification_repo.clone(),
        BookingConfig::default(),
    );

    TestContext {
        bookings,
        roster,
        notifications: notification_repo,
        business_id: business.id,
        haircut_id: haircut.id,
        beard_trim_id: beard_trim.id,
    }
}

fn haircut_request(ctx: &TestContext, time: &str) -> BookingRequest {
    BookingRequest {
        business_id: ctx.business_id,
        customer_name: "Dana".into(),
        customer_email: "dana@example.com".into(),
        barber_name: "Alex".into(),
        date: monday(),
        time: slot(time),
        service_ids: vec![ctx.haircut_id],
    }
}

fn dana() -> Actor {
    Actor::Customer {
        email: "dana@example.com".into(),
    }
}

fn owner(ctx: &TestContext) -> Actor {
    Actor::Owner {
        business_id: ctx.business_id,
    }
}

async fn kinds_for(ctx: &TestContext, recipient: &str) -> Vec<NotificationKind> {
    ctx.notifications
        .list_for_recipient(recipient, Pagination::default())
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|n| n.kind)
        .collect()
}

#[tokio::test]
async fn create_booking_pends_and_notifies_owner() {
    let ctx = setup().await;

    let booking = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.duration_minutes, 30);
    assert_eq!(booking.services.len(), 1);
    assert_eq!(booking.services[0].name, "Haircut");

    let kinds = kinds_for(&ctx, &ctx.business_id.to_string()).await;
    assert_eq!(kinds, vec![NotificationKind::Requested]);
}

#[tokio::test]
async fn multi_service_booking_sums_durations() {
    let ctx = setup().await;

    let mut request = haircut_request(&ctx, "9:00 AM");
    request.service_ids = vec![ctx.haircut_id, ctx.beard_trim_id];
    let booking = ctx.bookings.create_booking(request).await.unwrap();

    assert_eq!(booking.duration_minutes, 45);
}

#[tokio::test]
async fn overlapping_create_loses_the_race() {
    let ctx = setup().await;

    ctx.bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();

    // [9:15, 9:45) overlaps [9:00, 9:30); the transactional check
    // must reject it.
    let err = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "9:15 AM"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, SalonbookError::SlotConflict { .. }),
        "expected SlotConflict, got {err:?}"
    );
}

#[tokio::test]
async fn back_to_back_bookings_are_allowed() {
    let ctx = setup().await;

    ctx.bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();

    // [9:30, 10:00) touches [9:00, 9:30) without overlapping.
    let booking = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "9:30 AM"))
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);
}

#[tokio::test]
async fn available_slots_excludes_booked_and_clears_selection() {
    let ctx = setup().await;

    ctx.bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();

    let available = ctx
        .bookings
        .available_slots(AvailabilityQuery {
            business_id: ctx.business_id,
            barber_name: Some("Alex".into()),
            date: Some(monday()),
            service_ids: vec![ctx.haircut_id],
            selected: Some(slot("9:15 AM")),
        })
        .await
        .unwrap();

    assert!(!available.slots.contains(&slot("9:00 AM")));
    assert!(!available.slots.contains(&slot("9:15 AM")));
    assert!(available.slots.contains(&slot("9:30 AM")));
    assert_eq!(available.selection, None);
}

#[tokio::test]
async fn surviving_selection_is_kept() {
    let ctx = setup().await;

    let available = ctx
        .bookings
        .available_slots(AvailabilityQuery {
            business_id: ctx.business_id,
            barber_name: Some("Alex".into()),
            date: Some(monday()),
            service_ids: vec![ctx.haircut_id],
            selected: Some(slot("10:00 AM")),
        })
        .await
        .unwrap();

    assert_eq!(available.selection, Some(slot("10:00 AM")));
}

#[tokio::test]
async fn day_off_has_no_slots() {
    let ctx = setup().await;

    // 2024-06-02 is a Sunday; Alex only works Mondays.
    let available = ctx
        .bookings
        .available_slots(AvailabilityQuery {
            business_id: ctx.business_id,
            barber_name: Some("Alex".into()),
            date: Some(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()),
            service_ids: vec![],
            selected: None,
        })
        .await
        .unwrap();

    assert!(available.slots.is_empty());
}

#[tokio::test]
async fn booking_on_a_day_off_is_rejected() {
    let ctx = setup().await;

    let mut request = haircut_request(&ctx, "9:00 AM");
    request.date = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
    let err = ctx.bookings.create_booking(request).await.unwrap_err();
    assert!(matches!(err, SalonbookError::Validation { .. }));
}

#[tokio::test]
async fn booking_outside_working_hours_is_rejected() {
    let ctx = setup().await;

    // 5:00 PM is the exclusive end of the window.
    let err = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "5:00 PM"))
        .await
        .unwrap_err();
    assert!(matches!(err, SalonbookError::Validation { .. }));
}

#[tokio::test]
async fn booking_without_services_is_rejected() {
    let ctx = setup().await;

    let mut request = haircut_request(&ctx, "9:00 AM");
    request.service_ids = vec![];
    let err = ctx.bookings.create_booking(request).await.unwrap_err();
    assert!(matches!(err, SalonbookError::Validation { .. }));

    // No partial state: nothing was written.
    let upcoming = ctx
        .bookings
        .upcoming_for_business(ctx.business_id)
        .await
        .unwrap();
    assert!(upcoming.is_empty());
}

#[tokio::test]
async fn confirm_and_complete_notify_the_customer() {
    let ctx = setup().await;

    let booking = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();

    let booking = ctx
        .bookings
        .confirm_booking(&owner(&ctx), booking.id)
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);

    let booking = ctx
        .bookings
        .complete_booking(&owner(&ctx), booking.id)
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Completed);

    // Newest first: completed, then confirmed.
    let kinds = kinds_for(&ctx, "dana@example.com").await;
    assert_eq!(
        kinds,
        vec![NotificationKind::Completed, NotificationKind::Confirmed]
    );
}

#[tokio::test]
async fn only_the_owner_may_confirm() {
    let ctx = setup().await;

    let booking = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();

    let err = ctx
        .bookings
        .confirm_booking(&dana(), booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, SalonbookError::Validation { .. }));

    let other_owner = Actor::Owner {
        business_id: Uuid::new_v4(),
    };
    let err = ctx
        .bookings
        .confirm_booking(&other_owner, booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, SalonbookError::Validation { .. }));
}

#[tokio::test]
async fn pending_cannot_skip_to_completed() {
    let ctx = setup().await;

    let booking = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();

    let err = ctx
        .bookings
        .complete_booking(&owner(&ctx), booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, SalonbookError::Validation { .. }));
}

#[tokio::test]
async fn cancelled_booking_frees_its_slot() {
    let ctx = setup().await;

    let booking = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();

    let booking = ctx
        .bookings
        .cancel_booking(&dana(), booking.id)
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Cancelled);
    assert_eq!(booking.cancelled_by, Some(CancelledBy::Customer));
    assert!(booking.cancelled_at.is_some());

    // The owner hears about it.
    let kinds = kinds_for(&ctx, &ctx.business_id.to_string()).await;
    assert_eq!(
        kinds,
        vec![NotificationKind::Cancelled, NotificationKind::Requested]
    );

    // The slot is offerable again and a new booking can take it.
    let available = ctx
        .bookings
        .available_slots(AvailabilityQuery {
            business_id: ctx.business_id,
            barber_name: Some("Alex".into()),
            date: Some(monday()),
            service_ids: vec![ctx.haircut_id],
            selected: None,
        })
        .await
        .unwrap();
    assert!(available.slots.contains(&slot("9:00 AM")));

    ctx.bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();
}

#[tokio::test]
async fn owner_cancellation_notifies_the_customer() {
    let ctx = setup().await;

    let booking = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();

    let booking = ctx
        .bookings
        .cancel_booking(&owner(&ctx), booking.id)
        .await
        .unwrap();
    assert_eq!(booking.cancelled_by, Some(CancelledBy::Owner));

    let kinds = kinds_for(&ctx, "dana@example.com").await;
    assert_eq!(kinds, vec![NotificationKind::Cancelled]);
}

#[tokio::test]
async fn terminal_bookings_accept_no_transition() {
    let ctx = setup().await;

    let booking = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();
    ctx.bookings
        .cancel_booking(&dana(), booking.id)
        .await
        .unwrap();

    for result in [
        ctx.bookings.confirm_booking(&owner(&ctx), booking.id).await,
        ctx.bookings.complete_booking(&owner(&ctx), booking.id).await,
        ctx.bookings.cancel_booking(&dana(), booking.id).await,
    ] {
        assert!(matches!(
            result.unwrap_err(),
            SalonbookError::Validation { .. }
        ));
    }
}

#[tokio::test]
async fn review_recomputes_the_aggregate_rating() {
    let ctx = setup().await;

    let first = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();
    ctx.bookings
        .confirm_booking(&owner(&ctx), first.id)
        .await
        .unwrap();
    ctx.bookings
        .complete_booking(&owner(&ctx), first.id)
        .await
        .unwrap();

    ctx.bookings
        .submit_review(
            &dana(),
            first.id,
            CreateReview {
                rating: 5,
                comment: Some("Great cut".into()),
            },
        )
        .await
        .unwrap();

    let business = ctx.roster.get_business(ctx.business_id).await.unwrap();
    assert_eq!(business.rating, 5.0);

    // A second reviewed booking pulls the mean to 4.5.
    let second = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "10:00 AM"))
        .await
        .unwrap();
    ctx.bookings
        .confirm_booking(&owner(&ctx), second.id)
        .await
        .unwrap();
    ctx.bookings
        .complete_booking(&owner(&ctx), second.id)
        .await
        .unwrap();
    ctx.bookings
        .submit_review(
            &dana(),
            second.id,
            CreateReview {
                rating: 4,
                comment: None,
            },
        )
        .await
        .unwrap();

    let business = ctx.roster.get_business(ctx.business_id).await.unwrap();
    assert_eq!(business.rating, 4.5);

    let kinds = kinds_for(&ctx, &ctx.business_id.to_string()).await;
    assert_eq!(
        kinds
            .iter()
            .filter(|kind| **kind == NotificationKind::Review)
            .count(),
        2
    );
}

#[tokio::test]
async fn a_booking_can_be_reviewed_only_once() {
    let ctx = setup().await;

    let booking = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();
    ctx.bookings
        .confirm_booking(&owner(&ctx), booking.id)
        .await
        .unwrap();
    ctx.bookings
        .complete_booking(&owner(&ctx), booking.id)
        .await
        .unwrap();

    ctx.bookings
        .submit_review(
            &dana(),
            booking.id,
            CreateReview {
                rating: 4,
                comment: None,
            },
        )
        .await
        .unwrap();

    let err = ctx
        .bookings
        .submit_review(
            &dana(),
            booking.id,
            CreateReview {
                rating: 5,
                comment: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SalonbookError::Validation { .. }));
}

#[tokio::test]
async fn active_bookings_cannot_be_reviewed() {
    let ctx = setup().await;

    let booking = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();

    let err = ctx
        .bookings
        .submit_review(
            &dana(),
            booking.id,
            CreateReview {
                rating: 5,
                comment: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SalonbookError::Validation { .. }));
}

#[tokio::test]
async fn deleting_a_catalog_service_leaves_snapshots_intact() {
    let ctx = setup().await;

    let booking = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();

    ctx.roster
        .remove_service(ctx.business_id, ctx.haircut_id)
        .await
        .unwrap();

    let upcoming = ctx
        .bookings
        .upcoming_for_customer("dana@example.com")
        .await
        .unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].services[0].name, "Haircut");
    assert_eq!(upcoming[0].duration_minutes, 30);
}

#[tokio::test]
async fn identically_named_barbers_at_two_businesses_never_conflict() {
    let ctx = setup().await;

    let other = ctx
        .roster
        .create_business(CreateBusiness {
            name: "Shear Genius".into(),
            address: "9 Razor Rd".into(),
            location: GeoPoint {
                latitude: 45.06,
                longitude: 7.66,
            },
        })
        .await
        .unwrap();
    ctx.roster
        .add_staff_member(other.id, "Alex".into(), working_on(Weekday::Monday))
        .await
        .unwrap();
    let other_cut = ctx
        .roster
        .add_service(CreateService {
            business_id: other.id,
            name: "Haircut".into(),
            price: 30.0,
            duration_minutes: 30,
        })
        .await
        .unwrap();

    ctx.bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();

    // Same barber name, same date and slot, different business.
    ctx.bookings
        .create_booking(BookingRequest {
            business_id: other.id,
            customer_name: "Erin".into(),
            customer_email: "erin@example.com".into(),
            barber_name: "Alex".into(),
            date: monday(),
            time: slot("9:00 AM"),
            service_ids: vec![other_cut.id],
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn upcoming_and_past_split_by_status() {
    let ctx = setup().await;

    let active = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();
    let cancelled = ctx
        .bookings
        .create_booking(haircut_request(&ctx, "10:00 AM"))
        .await
        .unwrap();
    ctx.bookings
        .cancel_booking(&dana(), cancelled.id)
        .await
        .unwrap();

    let upcoming = ctx
        .bookings
        .upcoming_for_customer("dana@example.com")
        .await
        .unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].id, active.id);

    let past = ctx
        .bookings
        .past_for_customer("dana@example.com")
        .await
        .unwrap();
    assert_eq!(past.len(), 1);
    assert_eq!(past[0].id, cancelled.id);
}

#[tokio::test]
async fn concurrent_creates_for_the_same_slot_yield_one_winner() {
    let ctx = setup().await;

    // [9:00, 9:30) and [9:15, 9:45) overlap, so at most one of these
    // in-flight creates may commit regardless of interleaving.
    let (first, second) = tokio::join!(
        ctx.bookings.create_booking(haircut_request(&ctx, "9:00 AM")),
        ctx.bookings.create_booking(haircut_request(&ctx, "9:15 AM")),
    );

    let mut winners = 0;
    let mut losers = 0;
    for result in [first, second] {
        match result {
            Ok(_) => winners += 1,
            Err(SalonbookError::SlotConflict { .. }) => losers += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!((winners, losers), (1, 1));

    let upcoming = ctx
        .bookings
        .upcoming_for_business(ctx.business_id)
        .await
        .unwrap();
    assert_eq!(upcoming.len(), 1);
}

#[tokio::test]
async fn due_reminders_respect_the_configured_window() {
    let ctx = setup().await;

    // Within 24 hours of `now`.
    ctx.bookings
        .create_booking(haircut_request(&ctx, "9:00 AM"))
        .await
        .unwrap();

    // The following Monday, well outside the window.
    let mut request = haircut_request(&ctx, "9:00 AM");
    request.date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    ctx.bookings.create_booking(request).await.unwrap();

    let now = monday()
        .and_time(NaiveTime::from_hms_opt(8, 0, 0).unwrap())
        .and_utc();
    let reminders = ctx
        .bookings
        .due_reminders_for_customer("dana@example.com", now)
        .await
        .unwrap();

    assert_eq!(reminders.len(), 1);
    assert_eq!(
        reminders[0].fire_at,
        monday()
            .and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap())
            .and_utc()
    );
    assert!(reminders[0].body.contains("Fade Factory"));
    assert!(reminders[0].body.contains("Alex"));
}

#[tokio::test]
async fn available_barbers_for_a_fixed_slot() {
    let ctx = setup().await;

    let at_ten = ctx
        .bookings
        .available_barbers(ctx.business_id, monday(), slot("10:00 AM"))
        .await
        .unwrap();
    assert_eq!(at_ten, vec!["Alex".to_string()]);

    let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
    let on_sunday = ctx
        .bookings
        .available_barbers(ctx.business_id, sunday, slot("10:00 AM"))
        .await
        .unwrap();
    assert!(on_sunday.is_empty());
}
