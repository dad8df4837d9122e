//! Delivery address book with default-address bookkeeping.

use db::models::address::{Address, CreateAddress, UpdateAddress};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("address not found")]
    NotFound,
    #[error("address belongs to another user")]
    Forbidden,
    #[error("address is used by an order")]
    InUse,
    #[error("invalid address: {0}")]
    Validation(String),
}

fn require(field: &str, value: &str) -> Result<(), AddressError> {
    if value.trim().is_empty() {
        return Err(AddressError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn validate_new(data: &CreateAddress) -> Result<(), AddressError> {
    require("receiver", &data.receiver)?;
    require("phone", &data.phone)?;
    require("province", &data.province)?;
    require("city", &data.city)?;
    require("district", &data.district)?;
    require("detail", &data.detail)
}

pub struct AddressService;

impl AddressService {
    pub async fn list(pool: &SqlitePool, user_id: &str) -> Result<Vec<Address>, AddressError> {
        Ok(Address::find_by_user(pool, user_id).await?)
    }

    pub async fn get_default(
        pool: &SqlitePool,
        user_id: &str,
    ) -> Result<Option<Address>, AddressError> {
        Ok(Address::find_default(pool, user_id).await?)
    }

    pub async fn get(pool: &SqlitePool, user_id: &str, id: Uuid) -> Result<Address, AddressError> {
        let address = Address::find_by_id(pool, id)
            .await?
            .ok_or(AddressError::NotFound)?;
        if address.user_id != user_id {
            return Err(AddressError::Forbidden);
        }
        Ok(address)
    }

    /// A user's first address always becomes the default.
    pub async fn create(
        pool: &SqlitePool,
        user_id: &str,
        data: &CreateAddress,
    ) -> Result<Address, AddressError> {
        validate_new(data)?;

        // Dropping `tx` on an early return rolls the default bookkeeping back.
        let mut tx = pool.begin().await?;

        let is_first = Address::count_for_user(&mut *tx, user_id).await? == 0;
        let is_default = is_first || data.is_default.unwrap_or(false);
        if is_default && !is_first {
            Address::clear_default(&mut *tx, user_id).await?;
        }

        let address = Address::create(&mut *tx, Uuid::new_v4(), user_id, data, is_default).await?;
        tx.commit().await?;

        info!(user_id = %user_id, address_id = %address.id, is_default, "Created address");
        Ok(address)
    }

    pub async fn update(
        pool: &SqlitePool,
        user_id: &str,
        id: Uuid,
        data: &UpdateAddress,
    ) -> Result<Address, AddressError> {
        let mut address = Self::get(pool, user_id, id).await?;

        let text_fields = [
            (&data.receiver, &mut address.receiver, "receiver"),
            (&data.phone, &mut address.phone, "phone"),
            (&data.province, &mut address.province, "province"),
            (&data.city, &mut address.city, "city"),
            (&data.district, &mut address.district, "district"),
            (&data.detail, &mut address.detail, "detail"),
        ];
        for (update, field, name) in text_fields {
            if let Some(value) = update {
                require(name, value)?;
                *field = value.clone();
            }
        }
        if let Some(tag) = &data.tag {
            address.tag = Some(tag.clone()).filter(|t| !t.is_empty());
        }

        let mut tx = pool.begin().await?;

        match data.is_default {
            Some(true) if !address.is_default => {
                Address::clear_default(&mut *tx, user_id).await?;
                address.is_default = true;
            }
            // Unsetting the only default would leave the user without one
            Some(false) if address.is_default => {
                if let Some(next) = Address::find_newest_excluding(&mut *tx, user_id, id).await? {
                    Address::set_default_flag(&mut *tx, next.id, true).await?;
                    address.is_default = false;
                }
            }
            _ => {}
        }

        let saved = address.save(&mut *tx).await?;
        tx.commit().await?;
        Ok(saved)
    }

    pub async fn set_default(
        pool: &SqlitePool,
        user_id: &str,
        id: Uuid,
    ) -> Result<Address, AddressError> {
        let address = Self::get(pool, user_id, id).await?;
        if address.is_default {
            return Ok(address);
        }

        let mut tx = pool.begin().await?;
        Address::clear_default(&mut *tx, user_id).await?;
        Address::set_default_flag(&mut *tx, id, true).await?;
        tx.commit().await?;

        info!(user_id = %user_id, address_id = %id, "Changed default address");
        Self::get(pool, user_id, id).await
    }

    /// Deleting the default promotes the newest remaining address. Addresses
    /// that orders were delivered to cannot be deleted.
    pub async fn delete(pool: &SqlitePool, user_id: &str, id: Uuid) -> Result<(), AddressError> {
        let address = Self::get(pool, user_id, id).await?;

        let mut tx = pool.begin().await?;

        if Address::is_used_by_order(&mut *tx, id).await? {
            return Err(AddressError::InUse);
        }

        Address::delete(&mut *tx, id).await?;

        let promoted = if address.is_default {
            let next = Address::find_newest_excluding(&mut *tx, user_id, id).await?;
            if let Some(next) = &next {
                Address::set_default_flag(&mut *tx, next.id, true).await?;
            }
            next
        } else {
            None
        };

        tx.commit().await?;

        if let Some(next) = promoted {
            info!(user_id = %user_id, address_id = %next.id, "Promoted default address");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use db::{
        DBService,
        models::{
            dealer::{CreateDealer, Dealer},
            order::{NewOrder, Order},
        },
    };
    use rust_decimal::Decimal;

    use super::*;

    fn new_address(receiver: &str, is_default: Option<bool>) -> CreateAddress {
        CreateAddress {
            receiver: receiver.to_string(),
            phone: "13800000000".to_string(),
            province: "广东省".to_string(),
            city: "佛山市".to_string(),
            district: "顺德区".to_string(),
            detail: "乐从镇 8 号".to_string(),
            is_default,
            tag: None,
        }
    }

    #[tokio::test]
    async fn test_first_address_becomes_default() {
        let db = DBService::new_in_memory().await.unwrap();
        let first = AddressService::create(&db.pool, "u1", &new_address("a", Some(false)))
            .await
            .unwrap();
        assert!(first.is_default);

        let second = AddressService::create(&db.pool, "u1", &new_address("b", None))
            .await
            .unwrap();
        assert!(!second.is_default);
    }

    #[tokio::test]
    async fn test_new_default_clears_previous() {
        let db = DBService::new_in_memory().await.unwrap();
        let first = AddressService::create(&db.pool, "u1", &new_address("a", None))
            .await
            .unwrap();
        let second = AddressService::create(&db.pool, "u1", &new_address("b", Some(true)))
            .await
            .unwrap();

        let default = AddressService::get_default(&db.pool, "u1").await.unwrap().unwrap();
        assert_eq!(default.id, second.id);
        assert!(!AddressService::get(&db.pool, "u1", first.id).await.unwrap().is_default);

        let listed = AddressService::list(&db.pool, "u1").await.unwrap();
        assert_eq!(listed[0].id, second.id);
    }

    #[tokio::test]
    async fn test_set_default_and_delete_promotes_newest() {
        let db = DBService::new_in_memory().await.unwrap();
        let a = AddressService::create(&db.pool, "u1", &new_address("a", None))
            .await
            .unwrap();
        let b = AddressService::create(&db.pool, "u1", &new_address("b", None))
            .await
            .unwrap();
        let c = AddressService::create(&db.pool, "u1", &new_address("c", None))
            .await
            .unwrap();

        AddressService::set_default(&db.pool, "u1", b.id).await.unwrap();
        assert!(!AddressService::get(&db.pool, "u1", a.id).await.unwrap().is_default);

        AddressService::delete(&db.pool, "u1", b.id).await.unwrap();
        let default = AddressService::get_default(&db.pool, "u1").await.unwrap().unwrap();
        assert_eq!(default.id, c.id);
    }

    #[tokio::test]
    async fn test_other_users_address_is_forbidden() {
        let db = DBService::new_in_memory().await.unwrap();
        let a = AddressService::create(&db.pool, "u1", &new_address("a", None))
            .await
            .unwrap();

        assert!(matches!(
            AddressService::get(&db.pool, "u2", a.id).await,
            Err(AddressError::Forbidden)
        ));
        assert!(matches!(
            AddressService::delete(&db.pool, "u2", a.id).await,
            Err(AddressError::Forbidden)
        ));
        assert!(matches!(
            AddressService::get(&db.pool, "u1", Uuid::new_v4()).await,
            Err(AddressError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_partial_update_and_validation() {
        let db = DBService::new_in_memory().await.unwrap();
        let a = AddressService::create(&db.pool, "u1", &new_address("a", None))
            .await
            .unwrap();

        let updated = AddressService::update(
            &db.pool,
            "u1",
            a.id,
            &UpdateAddress {
                detail: Some("龙江镇 2 号".to_string()),
                tag: Some("公司".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.receiver, "a");
        assert_eq!(updated.full_address(), "广东省佛山市顺德区龙江镇 2 号");
        assert_eq!(updated.tag.as_deref(), Some("公司"));

        assert!(matches!(
            AddressService::update(
                &db.pool,
                "u1",
                a.id,
                &UpdateAddress {
                    phone: Some(" ".to_string()),
                    ..Default::default()
                },
            )
            .await,
            Err(AddressError::Validation(_))
        ));
        assert!(matches!(
            AddressService::create(&db.pool, "u1", &new_address("", None)).await,
            Err(AddressError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_address_used_by_an_order_cannot_be_deleted() {
        let db = DBService::new_in_memory().await.unwrap();
        let a = AddressService::create(&db.pool, "u1", &new_address("a", None))
            .await
            .unwrap();
        let b = AddressService::create(&db.pool, "u1", &new_address("b", None))
            .await
            .unwrap();
        let dealer = Dealer::create(
            &db.pool,
            Uuid::new_v4(),
            &CreateDealer {
                name: "乐从建材".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        Order::create(
            &db.pool,
            &NewOrder {
                id: Uuid::new_v4(),
                order_no: "DD20250301000001",
                user_id: "u1",
                address_id: a.id,
                dealer_id: dealer.id,
                total_amount: Decimal::ZERO,
            },
        )
        .await
        .unwrap();

        assert!(matches!(
            AddressService::delete(&db.pool, "u1", a.id).await,
            Err(AddressError::InUse)
        ));
        let kept = AddressService::get(&db.pool, "u1", a.id).await.unwrap();
        assert!(kept.is_default);
        assert!(!AddressService::get(&db.pool, "u1", b.id).await.unwrap().is_default);

        AddressService::delete(&db.pool, "u1", b.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_unsetting_default_hands_it_to_newest_other() {
        let db = DBService::new_in_memory().await.unwrap();
        let a = AddressService::create(&db.pool, "u1", &new_address("a", None))
            .await
            .unwrap();
        let b = AddressService::create(&db.pool, "u1", &new_address("b", None))
            .await
            .unwrap();

        let updated = AddressService::update(
            &db.pool,
            "u1",
            a.id,
            &UpdateAddress {
                is_default: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!updated.is_default);

        let defaults: Vec<_> = AddressService::list(&db.pool, "u1")
            .await
            .unwrap()
            .into_iter()
            .filter(|address| address.is_default)
            .collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, b.id);
    }
}
