//! Dealer directory.

use std::str::FromStr;

use db::models::dealer::{CreateDealer, Dealer, DealerFilter, DealerStatus, UpdateDealer};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DealerError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("dealer not found")]
    NotFound,
    #[error("invalid dealer: {0}")]
    Validation(String),
}

pub struct DealerService;

impl DealerService {
    pub async fn list(pool: &SqlitePool, filter: &DealerFilter) -> Result<Vec<Dealer>, DealerError> {
        Ok(Dealer::find_all(pool, filter).await?)
    }

    pub async fn get(pool: &SqlitePool, id: Uuid) -> Result<Dealer, DealerError> {
        Dealer::find_by_id(pool, id)
            .await?
            .ok_or(DealerError::NotFound)
    }

    pub async fn create(pool: &SqlitePool, data: &CreateDealer) -> Result<Dealer, DealerError> {
        if data.name.trim().is_empty() {
            return Err(DealerError::Validation("name is required".to_string()));
        }

        let dealer = Dealer::create(pool, Uuid::new_v4(), data).await?;
        info!(dealer_id = %dealer.id, name = %dealer.name, "Created dealer");
        Ok(dealer)
    }

    /// Apply the populated fields. A status other than active/inactive is
    /// ignored rather than rejected.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateDealer,
    ) -> Result<Dealer, DealerError> {
        let mut dealer = Self::get(pool, id).await?;

        if let Some(name) = &data.name {
            if name.trim().is_empty() {
                return Err(DealerError::Validation("name is required".to_string()));
            }
            dealer.name = name.clone();
        }

        let optional_fields = [
            (&data.contact_person, &mut dealer.contact_person),
            (&data.phone, &mut dealer.phone),
            (&data.address, &mut dealer.address),
            (&data.province, &mut dealer.province),
            (&data.city, &mut dealer.city),
            (&data.district, &mut dealer.district),
        ];
        for (update, field) in optional_fields {
            if update.is_some() {
                field.clone_from(update);
            }
        }

        if let Some(raw) = &data.status {
            match DealerStatus::from_str(raw) {
                Ok(status) => dealer.status = status,
                Err(_) => warn!(dealer_id = %id, status = %raw, "Ignoring unknown dealer status"),
            }
        }

        Ok(dealer.save(pool).await?)
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<(), DealerError> {
        if Dealer::delete(pool, id).await? == 0 {
            return Err(DealerError::NotFound);
        }
        info!(dealer_id = %id, "Deleted dealer");
        Ok(())
    }
}
