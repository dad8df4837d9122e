use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "dealer_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DealerStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Dealer {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub status: DealerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct CreateDealer {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateDealer {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    /// Free text on the wire; anything but active/inactive is ignored.
    pub status: Option<String>,
}

/// Optional filters for the dealer directory listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct DealerFilter {
    pub city: Option<String>,
    pub status: Option<DealerStatus>,
}

const DEALER_COLUMNS: &str = "id, name, contact_person, phone, address, province, city, district, \
     status, created_at, updated_at";

impl Dealer {
    pub async fn find_all(
        pool: &SqlitePool,
        filter: &DealerFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {DEALER_COLUMNS} FROM dealers WHERE 1=1"));

        if let Some(city) = &filter.city {
            query.push(" AND city = ");
            query.push_bind(city.clone());
        }

        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(status);
        }

        query.push(" ORDER BY created_at DESC, rowid DESC");

        query.build_query_as::<Dealer>().fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Dealer>(&format!(
            "SELECT {DEALER_COLUMNS} FROM dealers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateDealer,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Dealer>(&format!(
            r#"INSERT INTO dealers (id, name, contact_person, phone, address, province, city, district)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {DEALER_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.contact_person)
        .bind(&data.phone)
        .bind(&data.address)
        .bind(&data.province)
        .bind(&data.city)
        .bind(&data.district)
        .fetch_one(pool)
        .await
    }

    /// Persist every mutable field of `self`
    pub async fn save(&self, pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Dealer>(&format!(
            r#"UPDATE dealers
               SET name = $2,
                   contact_person = $3,
                   phone = $4,
                   address = $5,
                   province = $6,
                   city = $7,
                   district = $8,
                   status = $9,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {DEALER_COLUMNS}"#
        ))
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.contact_person)
        .bind(&self.phone)
        .bind(&self.address)
        .bind(&self.province)
        .bind(&self.city)
        .bind(&self.district)
        .bind(self.status)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM dealers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
