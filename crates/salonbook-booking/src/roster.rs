//! Roster service — owner-side staff and catalog management.

use std::collections::HashSet;

use salonbook_core::error::SalonbookResult;
use salonbook_core::models::business::{
    Business, CreateBusiness, DaySchedule, StaffMember, UpdateBusiness,
};
use salonbook_core::models::service::{CreateService, Service};
use salonbook_core::repository::{
    BusinessRepository, PaginatedResult, Pagination, ServiceRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::config::BookingConfig;
use crate::error::BookingError;

/// Owner-side management of a business, its staff roster, and its
/// service catalog. Generic over repository implementations.
pub struct RosterService<B, S>
where
    B: BusinessRepository,
    S: ServiceRepository,
{
    business_repo: B,
    service_repo: S,
    config: BookingConfig,
}

impl<B, S> RosterService<B, S>
where
    B: BusinessRepository,
    S: ServiceRepository,
{
    pub fn new(business_repo: B, service_repo: S, config: BookingConfig) -> Self {
        Self {
            business_repo,
            service_repo,
            config,
        }
    }

    pub async fn create_business(&self, input: CreateBusiness) -> SalonbookResult<Business> {
        if input.name.trim().is_empty() {
            return Err(BookingError::MissingField {
                field: "business name",
            }
            .into());
        }
        let business = self.business_repo.create(input).await?;
        info!(business_id = %business.id, name = %business.name, "Business created");
        Ok(business)
    }

    pub async fn get_business(&self, id: Uuid) -> SalonbookResult<Business> {
        self.business_repo.get_by_id(id).await
    }

    pub async fn list_businesses(
        &self,
        pagination: Pagination,
    ) -> SalonbookResult<PaginatedResult<Business>> {
        self.business_repo.list(pagination).await
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        input: UpdateBusiness,
    ) -> SalonbookResult<Business> {
        self.business_repo.update(id, input).await
    }

    /// Add a staff member. The roster is capped; the weekly schedule
    /// must list each weekday exactly once with sane windows.
    pub async fn add_staff_member(
        &self,
        business_id: Uuid,
        name: String,
        availability: Vec<DaySchedule>,
    ) -> SalonbookResult<Business> {
        // 1. Validate the member before touching the roster.
        if name.trim().is_empty() {
            return Err(BookingError::MissingField {
                field: "staff member name",
            }
            .into());
        }
        validate_week(&availability)?;

        // 2. Enforce the cap against the current roster.
        let business = self.business_repo.get_by_id(business_id).await?;
        if business.staff.len() >= self.config.max_staff_members {
            return Err(BookingError::RosterFull {
                cap: self.config.max_staff_members,
            }
            .into());
        }

        // 3. Replace the roster wholesale; the schema re-asserts the
        //    cap on write.
        let mut staff = business.staff;
        staff.push(StaffMember {
            id: Uuid::new_v4(),
            name,
            availability,
        });
        let business = self.business_repo.set_staff(business_id, staff).await?;

        info!(
            business_id = %business.id,
            roster_size = business.staff.len(),
            "Staff member added"
        );

        Ok(business)
    }

    /// Replace one staff member's weekly schedule.
    pub async fn update_staff_schedule(
        &self,
        business_id: Uuid,
        staff_id: Uuid,
        availability: Vec<DaySchedule>,
    ) -> SalonbookResult<Business> {
        validate_week(&availability)?;

        let business = self.business_repo.get_by_id(business_id).await?;
        let mut staff = business.staff;
        let member = staff
            .iter_mut()
            .find(|member| member.id == staff_id)
            .ok_or_else(|| salonbook_core::SalonbookError::NotFound {
                entity: "staff member".into(),
                id: staff_id.to_string(),
            })?;
        member.availability = availability;

        self.business_repo.set_staff(business_id, staff).await
    }

    pub async fn remove_staff_member(
        &self,
        business_id: Uuid,
        staff_id: Uuid,
    ) -> SalonbookResult<Business> {
        let business = self.business_repo.get_by_id(business_id).await?;
        let mut staff = business.staff;
        let before = staff.len();
        staff.retain(|member| member.id != staff_id);
        if staff.len() == before {
            return Err(salonbook_core::SalonbookError::NotFound {
                entity: "staff member".into(),
                id: staff_id.to_string(),
            });
        }
        self.business_repo.set_staff(business_id, staff).await
    }

    pub async fn add_service(&self, input: CreateService) -> SalonbookResult<Service> {
        if input.name.trim().is_empty() {
            return Err(BookingError::MissingField {
                field: "service name",
            }
            .into());
        }
        if input.price < 0.0 || input.price.is_nan() {
            return Err(BookingError::NegativePrice.into());
        }
        if input.duration_minutes == 0 {
            return Err(BookingError::ZeroDuration.into());
        }
        self.service_repo.create(input).await
    }

    /// Remove a catalog entry. Bookings keep their frozen snapshots.
    pub async fn remove_service(&self, business_id: Uuid, id: Uuid) -> SalonbookResult<()> {
        self.service_repo.delete(business_id, id).await
    }

    pub async fn list_services(&self, business_id: Uuid) -> SalonbookResult<Vec<Service>> {
        self.service_repo.list_by_business(business_id).await
    }
}

/// Every weekday exactly once; working days need `start < end`.
fn validate_week(availability: &[DaySchedule]) -> SalonbookResult<()> {
    let days: HashSet<_> = availability.iter().map(|schedule| schedule.day).collect();
    if availability.len() != 7 || days.len() != 7 {
        return Err(BookingError::MalformedWeek.into());
    }
    for schedule in availability {
        if schedule.is_working && schedule.start >= schedule.end {
            return Err(BookingError::EmptyWindow {
                day: schedule.day,
                start: schedule.start,
                end: schedule.end,
            }
            .into());
        }
    }
    Ok(())
}
