//! Postgres-backed product repository.
//!
//! ## Conditional transitions
//!
//! `conditional_transition()` is one statement:
//!
//! ```sql
//! UPDATE products
//! SET status = $3, current_auction_id = $4
//! WHERE id = $1 AND status = ANY($2)
//! ```
//!
//! Postgres takes a row lock for the update and re-evaluates the `WHERE`
//! clause against the latest committed row version, so of two racing
//! statements expecting the same status only one reports a matched row.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (integrity constraint) | `23xxx` | `Rejected` |
//! | Database (other) | any other | `Unavailable` |
//! | ColumnDecode / Decode / ColumnNotFound | N/A | `Corrupt` |
//! | PoolClosed / PoolTimedOut / Io / Tls / other | N/A | `Unavailable` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::{Span, instrument};
use uuid::Uuid;

use catalog_core::{AuctionId, ProductId};
use catalog_products::{
    ConditionalUpdate, NewProduct, Product, ProductCategory, ProductFilter, ProductStatus,
};

use super::r#trait::{ProductRepository, StoreError};
use crate::config::{DEFAULT_PRODUCTS_TABLE, validate_table_name};

const COLUMNS: &str = concat!(
    "id, category, title, description, starting_price, ",
    "status, created_at, seller_id, current_auction_id"
);

/// SQL text for one products table. Built once; the table name is validated
/// before it is interpolated.
#[derive(Debug)]
struct Queries {
    create_table: String,
    create_status_index: String,
    insert: String,
    select_one: String,
    select_filtered: String,
    replace: String,
    transition: String,
    delete: String,
}

impl Queries {
    fn for_table(t: &str) -> Self {
        Self {
            create_table: format!(
                r#"
                CREATE TABLE IF NOT EXISTS {t} (
                    id                 UUID PRIMARY KEY,
                    category           TEXT NOT NULL,
                    title              TEXT NOT NULL,
                    description        TEXT NOT NULL DEFAULT '',
                    starting_price     NUMERIC NOT NULL CHECK (starting_price >= 0),
                    status             TEXT NOT NULL,
                    created_at         TIMESTAMPTZ NOT NULL,
                    seller_id          TEXT NOT NULL,
                    current_auction_id UUID NULL,
                    CONSTRAINT {t}_auction_ref_check
                        CHECK ((status = 'InAuction') = (current_auction_id IS NOT NULL))
                )
                "#
            ),
            create_status_index: format!(
                "CREATE INDEX IF NOT EXISTS {t}_status_idx ON {t} (status)"
            ),
            insert: format!(
                "INSERT INTO {t} ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
            ),
            select_one: format!("SELECT {COLUMNS} FROM {t} WHERE id = $1"),
            select_filtered: format!(
                r#"
                SELECT {COLUMNS} FROM {t}
                WHERE ($1::text IS NULL OR category = $1)
                  AND ($2::text IS NULL OR status = $2)
                ORDER BY created_at ASC, id ASC
                "#
            ),
            replace: format!(
                r#"
                UPDATE {t}
                SET category = $2,
                    title = $3,
                    description = $4,
                    starting_price = $5,
                    status = $6,
                    current_auction_id = $7
                WHERE id = $1
                "#
            ),
            transition: format!(
                r#"
                UPDATE {t}
                SET status = $3, current_auction_id = $4
                WHERE id = $1 AND status = ANY($2)
                "#
            ),
            delete: format!("DELETE FROM {t} WHERE id = $1"),
        }
    }
}

/// Postgres-backed product repository.
///
/// `Send + Sync`; clones share the pool.
#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
    table: String,
    queries: Arc<Queries>,
}

impl PostgresProductRepository {
    /// Use the default `products` table.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            table: DEFAULT_PRODUCTS_TABLE.to_string(),
            queries: Arc::new(Queries::for_table(DEFAULT_PRODUCTS_TABLE)),
        }
    }

    pub fn with_table(pool: PgPool, table: impl Into<String>) -> Result<Self, StoreError> {
        let table = table.into();
        validate_table_name(&table).map_err(StoreError::Rejected)?;
        let queries = Arc::new(Queries::for_table(&table));
        Ok(Self { pool, table, queries })
    }

    /// Open a pool against `database_url`.
    #[instrument(skip(database_url), err)]
    pub async fn connect(
        database_url: &str,
        table: &str,
        max_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Self::with_table(pool, table)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the products table and its status index if they do not exist.
    #[instrument(skip(self), fields(table = %self.table), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(&self.queries.create_table)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_table", e))?;
        sqlx::query(&self.queries.create_status_index)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_status_index", e))?;
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    #[instrument(skip(self, product), fields(product_id = tracing::field::Empty), err)]
    async fn create(&self, product: NewProduct) -> Result<ProductId, StoreError> {
        let id = ProductId::new();
        Span::current().record("product_id", tracing::field::display(id));
        let record = product.into_product(id, Utc::now());

        sqlx::query(&self.queries.insert)
            .bind(record.id.as_uuid())
            .bind(record.category.as_str())
            .bind(&record.title)
            .bind(&record.description)
            .bind(record.starting_price)
            .bind(record.status.as_str())
            .bind(record.created_at)
            .bind(&record.seller_id)
            .bind(Option::<Uuid>::None)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_product", e))?;

        Ok(id)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&self.queries.select_one)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("select_product", e))?;

        row.map(|row| decode_product(&row)).transpose()
    }

    #[instrument(skip(self), fields(count = tracing::field::Empty), err)]
    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(&self.queries.select_filtered)
            .bind(filter.category.map(|c| c.as_str()))
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;

        let products = rows
            .iter()
            .map(decode_product)
            .collect::<Result<Vec<_>, _>>()?;
        Span::current().record("count", products.len());
        Ok(products)
    }

    #[instrument(
        skip(self, product),
        fields(product_id = %product.id, status = %product.status),
        err
    )]
    async fn replace(&self, product: &Product) -> Result<u64, StoreError> {
        let result = sqlx::query(&self.queries.replace)
            .bind(product.id.as_uuid())
            .bind(product.category.as_str())
            .bind(&product.title)
            .bind(&product.description)
            .bind(product.starting_price)
            .bind(product.status.as_str())
            .bind(product.current_auction_id.map(Uuid::from))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("replace_product", e))?;

        Ok(result.rows_affected())
    }

    #[instrument(
        skip(self, update),
        fields(product_id = %id, new_status = %update.new_status, matched = tracing::field::Empty),
        err
    )]
    async fn conditional_transition(
        &self,
        id: ProductId,
        update: &ConditionalUpdate,
    ) -> Result<u64, StoreError> {
        let expected: Vec<&str> = update.expected.iter().map(|s| s.as_str()).collect();

        let result = sqlx::query(&self.queries.transition)
            .bind(id.as_uuid())
            .bind(expected)
            .bind(update.new_status.as_str())
            .bind(update.auction.resulting_auction_id().map(Uuid::from))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("conditional_transition", e))?;

        let matched = result.rows_affected();
        Span::current().record("matched", matched);
        Ok(matched)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> Result<u64, StoreError> {
        let result = sqlx::query(&self.queries.delete)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;

        Ok(result.rows_affected())
    }
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.starts_with("23") => StoreError::Rejected(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::TypeNotFound { .. } => {
            StoreError::Corrupt(format!("failed to decode row in {}: {}", operation, err))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("timed out acquiring connection in {}", operation))
        }
        _ => StoreError::Unavailable(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn decode_product(row: &PgRow) -> Result<Product, StoreError> {
    let row = ProductRow::from_row(row)
        .map_err(|e| StoreError::Corrupt(format!("failed to deserialize product row: {}", e)))?;
    Product::try_from(row)
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    id: Uuid,
    category: String,
    title: String,
    description: String,
    starting_price: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    seller_id: String,
    current_auction_id: Option<Uuid>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            category: row.try_get("category")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            starting_price: row.try_get("starting_price")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            seller_id: row.try_get("seller_id")?,
            current_auction_id: row.try_get("current_auction_id")?,
        })
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let corrupt = |e: catalog_core::DomainError| {
            StoreError::Corrupt(format!("product {}: {}", row.id, e))
        };
        let category = row.category.parse::<ProductCategory>().map_err(corrupt)?;
        let status = row.status.parse::<ProductStatus>().map_err(corrupt)?;

        Ok(Product {
            id: ProductId::from_uuid(row.id),
            category,
            title: row.title,
            description: row.description,
            starting_price: row.starting_price,
            status,
            created_at: row.created_at,
            seller_id: row.seller_id,
            current_auction_id: row.current_auction_id.map(AuctionId::from_uuid),
        })
    }
}
