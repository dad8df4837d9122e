use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, QueryBuilder, Row, Sqlite, SqlitePool, sqlite::SqliteRow};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use crate::money::decimal_column;

/// A product attribute dimension that can be searched on and disambiguated.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    TS,
    EnumString,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Attribute {
    Brand,
    Specification,
    Pressure,
    Color,
    Length,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Brand,
        Attribute::Specification,
        Attribute::Pressure,
        Attribute::Color,
        Attribute::Length,
    ];

    /// Column in `products` holding this attribute.
    pub fn column(&self) -> &'static str {
        match self {
            Attribute::Brand => "brand",
            Attribute::Specification => "specification",
            Attribute::Pressure => "pressure",
            Attribute::Color => "color",
            Attribute::Length => "length",
        }
    }
}

/// Attribute values extracted from one utterance. Unset attributes are `None`,
/// never the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct AttributeSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub specification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub length: Option<String>,
}

impl AttributeSet {
    pub fn get(&self, attribute: Attribute) -> Option<&str> {
        self.slot(attribute).as_deref()
    }

    pub fn contains(&self, attribute: Attribute) -> bool {
        self.slot(attribute).is_some()
    }

    /// Set an attribute. An empty value clears it instead.
    pub fn insert(&mut self, attribute: Attribute, value: impl Into<String>) {
        let value = value.into();
        *self.slot_mut(attribute) = if value.is_empty() { None } else { Some(value) };
    }

    /// Populated attributes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &str)> + '_ {
        Attribute::ALL
            .into_iter()
            .filter_map(move |attribute| self.get(attribute).map(|value| (attribute, value)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    fn slot(&self, attribute: Attribute) -> &Option<String> {
        match attribute {
            Attribute::Brand => &self.brand,
            Attribute::Specification => &self.specification,
            Attribute::Pressure => &self.pressure,
            Attribute::Color => &self.color,
            Attribute::Length => &self.length,
        }
    }

    fn slot_mut(&mut self, attribute: Attribute) -> &mut Option<String> {
        match attribute {
            Attribute::Brand => &mut self.brand,
            Attribute::Specification => &mut self.specification,
            Attribute::Pressure => &mut self.pressure,
            Attribute::Color => &mut self.color,
            Attribute::Length => &mut self.length,
        }
    }
}

/// One purchasable product variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct Product {
    pub code: String,
    pub name: String,
    pub brand: Option<String>,
    pub specification: Option<String>,
    pub pressure: Option<String>,
    pub color: Option<String>,
    pub length: Option<String>,
    pub material: Option<String>,
    pub description: Option<String>,
    #[ts(type = "string")]
    pub price: Decimal,
    pub stock: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Product {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            brand: row.try_get("brand")?,
            specification: row.try_get("specification")?,
            pressure: row.try_get("pressure")?,
            color: row.try_get("color")?,
            length: row.try_get("length")?,
            material: row.try_get("material")?,
            description: row.try_get("description")?,
            price: decimal_column(row, "price")?,
            stock: row.try_get("stock")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Insert payload for the catalog. Used by seeding and tests; the catalog is
/// otherwise read-only to this service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct CreateProduct {
    pub code: String,
    pub name: String,
    pub brand: Option<String>,
    pub specification: Option<String>,
    pub pressure: Option<String>,
    pub color: Option<String>,
    pub length: Option<String>,
    pub material: Option<String>,
    pub description: Option<String>,
    #[ts(type = "string")]
    pub price: Decimal,
    pub stock: Option<i64>,
}

const PRODUCT_COLUMNS: &str = "code, name, brand, specification, pressure, color, length, \
     material, description, price, stock, created_at";

impl Product {
    pub fn attribute(&self, attribute: Attribute) -> Option<&str> {
        match attribute {
            Attribute::Brand => self.brand.as_deref(),
            Attribute::Specification => self.specification.as_deref(),
            Attribute::Pressure => self.pressure.as_deref(),
            Attribute::Color => self.color.as_deref(),
            Attribute::Length => self.length.as_deref(),
        }
    }

    /// Products whose populated attributes equal every value in `filter`,
    /// in insertion order, at most `limit` rows.
    pub async fn search(
        pool: &SqlitePool,
        filter: &AttributeSet,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1=1"));

        for (attribute, value) in filter.iter() {
            query.push(" AND ");
            query.push(attribute.column());
            query.push(" = ");
            query.push_bind(value.to_string());
        }

        query.push(" ORDER BY rowid LIMIT ");
        query.push_bind(limit);

        query.build_query_as::<Product>().fetch_all(pool).await
    }

    pub async fn find_all(pool: &SqlitePool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY rowid LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_code<'e, E>(executor: E, code: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(executor)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateProduct) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            r#"INSERT INTO products (code, name, brand, specification, pressure, color, length,
                                     material, description, price, stock)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               RETURNING {PRODUCT_COLUMNS}"#
        ))
        .bind(&data.code)
        .bind(&data.name)
        .bind(&data.brand)
        .bind(&data.specification)
        .bind(&data.pressure)
        .bind(&data.color)
        .bind(&data.length)
        .bind(&data.material)
        .bind(&data.description)
        .bind(data.price.to_string())
        .bind(data.stock)
        .fetch_one(pool)
        .await
    }
}
