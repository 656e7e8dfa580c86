//! SurrealDB implementation of [`BusinessRepository`].
//!
//! The staff roster is embedded in the business record as a FLEXIBLE
//! array of objects; the schema caps it at five members.

use salonbook_core::error::SalonbookResult;
use salonbook_core::models::business::{
    Business, CreateBusiness, GeoPoint, StaffMember, UpdateBusiness,
};
use salonbook_core::repository::{BusinessRepository, PaginatedResult, Pagination};
use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, Deserialize)]
struct BusinessRow {
    name: String,
    address: String,
    location: GeoPoint,
    staff: Vec<StaffMember>,
    rating: f64,
    created_at: Datetime,
    updated_at: Datetime,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct BusinessRowWithId {
    record_id: String,
    name: String,
    address: String,
    location: GeoPoint,
    staff: Vec<StaffMember>,
    rating: f64,
    created_at: Datetime,
    updated_at: Datetime,
}

impl BusinessRow {
    fn into_business(self, id: Uuid) -> Business {
        Business {
            id,
            name: self.name,
            address: self.address,
            location: self.location,
            staff: self.staff,
            rating: self.rating,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        }
    }
}

impl BusinessRowWithId {
    fn try_into_business(self) -> Result<Business, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid business UUID: {e}")))?;
        Ok(Business {
            id,
            name: self.name,
            address: self.address,
            location: self.location,
            staff: self.staff,
            rating: self.rating,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Business repository.
#[derive(Clone)]
pub struct SurrealBusinessRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealBusinessRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> BusinessRepository for SurrealBusinessRepository<C> {
    async fn create(&self, input: CreateBusiness) -> SalonbookResult<Business> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // staff and rating come from the schema defaults ([] and 0.0).
        let result = self
            .db
            .query(
                "CREATE type::thing('business', $id) SET \
                 name = $name, \
                 address = $address, \
                 location = $location",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("address", input.address))
            .bind(("location", input.location))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<BusinessRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "business".into(),
            id: id_str,
        })?;

        Ok(row.into_business(id))
    }

    async fn get_by_id(&self, id: Uuid) -> SalonbookResult<Business> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('business', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BusinessRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "business".into(),
            id: id_str,
        })?;

        Ok(row.into_business(id))
    }

    async fn update(&self, id: Uuid, input: UpdateBusiness) -> SalonbookResult<Business> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.address.is_some() {
            sets.push("address = $address");
        }
        if input.location.is_some() {
            sets.push("location = $location");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::thing('business', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(address) = input.address {
            builder = builder.bind(("address", address));
        }
        if let Some(location) = input.location {
            builder = builder.bind(("location", location));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<BusinessRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "business".into(),
            id: id_str,
        })?;

        Ok(row.into_business(id))
    }

    async fn set_staff(&self, id: Uuid, staff: Vec<StaffMember>) -> SalonbookResult<Business> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::thing('business', $id) SET \
                 staff = $staff, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("staff", staff))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<BusinessRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "business".into(),
            id: id_str,
        })?;

        Ok(row.into_business(id))
    }

    async fn set_rating(&self, id: Uuid, rating: f64) -> SalonbookResult<()> {
        self.db
            .query(
                "UPDATE type::thing('business', $id) SET \
                 rating = $rating, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .bind(("rating", rating))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> SalonbookResult<()> {
        self.db
            .query("DELETE type::thing('business', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> SalonbookResult<PaginatedResult<Business>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM business GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM business \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BusinessRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_business())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
