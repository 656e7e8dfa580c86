//! SurrealDB implementation of [`ServiceRepository`].

use salonbook_core::error::SalonbookResult;
use salonbook_core::models::service::{CreateService, Service};
use salonbook_core::repository::ServiceRepository;
use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, Deserialize)]
struct ServiceRow {
    business_id: String,
    name: String,
    price: f64,
    duration_minutes: u32,
    created_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct ServiceRowWithId {
    record_id: String,
    business_id: String,
    name: String,
    price: f64,
    duration_minutes: u32,
    created_at: Datetime,
}

impl ServiceRow {
    fn into_service(self, id: Uuid) -> Result<Service, DbError> {
        let business_id = Uuid::parse_str(&self.business_id)
            .map_err(|e| DbError::Decode(format!("invalid business UUID: {e}")))?;
        Ok(Service {
            id,
            business_id,
            name: self.name,
            price: self.price,
            duration_minutes: self.duration_minutes,
            created_at: self.created_at.into(),
        })
    }
}

impl ServiceRowWithId {
    fn try_into_service(self) -> Result<Service, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let business_id = Uuid::parse_str(&self.business_id)
            .map_err(|e| DbError::Decode(format!("invalid business UUID: {e}")))?;
        Ok(Service {
            id,
            business_id,
            name: self.name,
            price: self.price,
            duration_minutes: self.duration_minutes,
            created_at: self.created_at.into(),
        })
    }
}

/// SurrealDB implementation of the Service repository.
#[derive(Clone)]
pub struct SurrealServiceRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealServiceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ServiceRepository for SurrealServiceRepository<C> {
    async fn create(&self, input: CreateService) -> SalonbookResult<Service> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('service', $id) SET \
                 business_id = $business_id, \
                 name = $name, \
                 price = $price, \
                 duration_minutes = $duration_minutes",
            )
            .bind(("id", id_str.clone()))
            .bind(("business_id", input.business_id.to_string()))
            .bind(("name", input.name))
            .bind(("price", input.price))
            .bind(("duration_minutes", input.duration_minutes))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<ServiceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "service".into(),
            id: id_str,
        })?;

        Ok(row.into_service(id)?)
    }

    async fn get_by_id(&self, business_id: Uuid, id: Uuid) -> SalonbookResult<Service> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::thing('service', $id) \
                 WHERE business_id = $business_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("business_id", business_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ServiceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "service".into(),
            id: id_str,
        })?;

        Ok(row.into_service(id)?)
    }

    async fn delete(&self, business_id: Uuid, id: Uuid) -> SalonbookResult<()> {
        self.db
            .query(
                "DELETE type::thing('service', $id) \
                 WHERE business_id = $business_id",
            )
            .bind(("id", id.to_string()))
            .bind(("business_id", business_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_business(&self, business_id: Uuid) -> SalonbookResult<Vec<Service>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM service \
                 WHERE business_id = $business_id \
                 ORDER BY created_at ASC",
            )
            .bind(("business_id", business_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ServiceRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_service())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}
