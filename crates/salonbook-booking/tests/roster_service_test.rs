//! Integration tests for owner-side roster and catalog management.

use salonbook_booking::{BookingConfig, RosterService};
use salonbook_core::SalonbookError;
use salonbook_core::models::business::{CreateBusiness, DaySchedule, GeoPoint, UpdateBusiness};
use salonbook_core::models::service::CreateService;
use salonbook_core::repository::Pagination;
use salonbook_core::time::{TimeOfDay, Weekday};
use salonbook_db::repository::{SurrealBusinessRepository, SurrealServiceRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type TestRosterService = RosterService<SurrealBusinessRepository<Db>, SurrealServiceRepository<Db>>;

async fn setup() -> (TestRosterService, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    salonbook_db::run_migrations(&db).await.unwrap();

    let roster = RosterService::new(
        SurrealBusinessRepository::new(db.clone()),
        SurrealServiceRepository::new(db),
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

    (roster, business.id)
}

#[tokio::test]
async fn roster_is_capped_at_five_members() {
    let (roster, business_id) = setup().await;

    for i in 0..5 {
        roster
            .add_staff_member(business_id, format!("Barber {i}"), DaySchedule::default_week())
            .await
            .unwrap();
    }

    let err = roster
        .add_staff_member(
            business_id,
            "One Too Many".into(),
            DaySchedule::default_week(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SalonbookError::Validation { .. }));

    let business = roster.get_business(business_id).await.unwrap();
    assert_eq!(business.staff.len(), 5);
}

#[tokio::test]
async fn staff_schedule_must_cover_the_whole_week() {
    let (roster, business_id) = setup().await;

    let mut short_week = DaySchedule::default_week();
    short_week.pop();

    let err = roster
        .add_staff_member(business_id, "Alex".into(), short_week)
        .await
        .unwrap_err();
    assert!(matches!(err, SalonbookError::Validation { .. }));
}

#[tokio::test]
async fn blank_staff_name_is_rejected() {
    let (roster, business_id) = setup().await;

    let err = roster
        .add_staff_member(business_id, "   ".into(), DaySchedule::default_week())
        .await
        .unwrap_err();
    assert!(matches!(err, SalonbookError::Validation { .. }));
}

#[tokio::test]
async fn staff_can_be_removed() {
    let (roster, business_id) = setup().await;

    let business = roster
        .add_staff_member(business_id, "Alex".into(), DaySchedule::default_week())
        .await
        .unwrap();
    let staff_id = business.staff[0].id;

    let business = roster
        .remove_staff_member(business_id, staff_id)
        .await
        .unwrap();
    assert!(business.staff.is_empty());

    let err = roster
        .remove_staff_member(business_id, staff_id)
        .await
        .unwrap_err();
    assert!(matches!(err, SalonbookError::NotFound { .. }));
}

#[tokio::test]
async fn staff_schedule_can_be_updated() {
    let (roster, business_id) = setup().await;

    let business = roster
        .add_staff_member(business_id, "Alex".into(), DaySchedule::default_week())
        .await
        .unwrap();
    let staff_id = business.staff[0].id;

    let mut week = DaySchedule::default_week();
    for schedule in &mut week {
        if schedule.day == Weekday::Tuesday {
            schedule.is_working = true;
            schedule.start = TimeOfDay {
                hour: 10,
                minute: 0,
            };
            schedule.end = TimeOfDay {
                hour: 14,
                minute: 0,
            };
        }
    }

    let business = roster
        .update_staff_schedule(business_id, staff_id, week)
        .await
        .unwrap();
    let window = business.staff[0].working_window(Weekday::Tuesday).unwrap();
    assert_eq!(window.0.hour, 10);
    assert_eq!(window.1.hour, 14);
}

#[tokio::test]
async fn catalog_entries_are_validated() {
    let (roster, business_id) = setup().await;

    let blank = roster
        .add_service(CreateService {
            business_id,
            name: "".into(),
            price: 10.0,
            duration_minutes: 30,
        })
        .await;
    assert!(matches!(
        blank.unwrap_err(),
        SalonbookError::Validation { .. }
    ));

    let negative = roster
        .add_service(CreateService {
            business_id,
            name: "Haircut".into(),
            price: -1.0,
            duration_minutes: 30,
        })
        .await;
    assert!(matches!(
        negative.unwrap_err(),
        SalonbookError::Validation { .. }
    ));

    let instant = roster
        .add_service(CreateService {
            business_id,
            name: "Haircut".into(),
            price: 25.0,
            duration_minutes: 0,
        })
        .await;
    assert!(matches!(
        instant.unwrap_err(),
        SalonbookError::Validation { .. }
    ));
}

#[tokio::test]
async fn catalog_round_trip() {
    let (roster, business_id) = setup().await;

    let haircut = roster
        .add_service(CreateService {
            business_id,
            name: "Haircut".into(),
            price: 25.0,
            duration_minutes: 30,
        })
        .await
        .unwrap();

    let services = roster.list_services(business_id).await.unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].name, "Haircut");

    roster.remove_service(business_id, haircut.id).await.unwrap();
    assert!(roster.list_services(business_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn profile_updates_are_partial() {
    let (roster, business_id) = setup().await;

    let business = roster
        .update_profile(
            business_id,
            UpdateBusiness {
                address: Some("1 New Address".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(business.name, "Fade Factory");
    assert_eq!(business.address, "1 New Address");
}

#[tokio::test]
async fn businesses_are_listed_with_pagination() {
    let (roster, _) = setup().await;

    for i in 0..3 {
        roster
            .create_business(CreateBusiness {
                name: format!("Shop {i}"),
                address: "somewhere".into(),
                location: GeoPoint {
                    latitude: 0.0,
                    longitude: 0.0,
                },
            })
            .await
            .unwrap();
    }

    // Four in total with the one from setup.
    let page = roster
        .list_businesses(Pagination {
            offset: 0,
            limit: 2,
        })
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 4);
}
