use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info, instrument};

use super::ProductRepository;
use crate::domain::{NewProduct, Product, ProductId};
use crate::error::StoreError;

const MEMORY_URL: &str = "sqlite::memory:";

/// Repository backed by a SQLite database through `sqlx`.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: Pool<Sqlite>,
}

impl SqliteRepository {
    /// Opens (creating if needed) the database at `database_url` and makes sure
    /// the `products` table exists.
    #[instrument]
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool_options = if database_url == MEMORY_URL {
            // Every connection to :memory: is its own database; keep exactly one alive.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(connect_options).await?;

        let repository = Self { pool };
        repository.ensure_products_table().await?;
        info!("Product database ready");
        Ok(repository)
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        let _: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn ensure_products_table(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                name     TEXT NOT NULL,
                quantity INTEGER NOT NULL CHECK (quantity >= 1)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn product_from_row(row: &SqliteRow) -> Result<Product, StoreError> {
    let id: i64 = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let quantity: i64 = row.try_get("quantity")?;
    let quantity = u32::try_from(quantity)
        .map_err(|_| StoreError::Database(format!("product {id} has invalid quantity {quantity}")))?;
    Ok(Product::new(ProductId(id), name, quantity))
}

#[async_trait]
impl ProductRepository for SqliteRepository {
    async fn get_all_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query("SELECT id, name, quantity FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(product_from_row).collect()
    }

    async fn insert_product(&self, product: NewProduct) -> Result<ProductId, StoreError> {
        product.validate()?;
        let result = sqlx::query("INSERT INTO products (name, quantity) VALUES (?, ?)")
            .bind(&product.name)
            .bind(i64::from(product.quantity))
            .execute(&self.pool)
            .await?;
        let id = ProductId(result.last_insert_rowid());
        debug!(product_id = %id, "Inserted product row");
        Ok(id)
    }

    async fn delete_product(&self, product: &Product) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(product.id.0)
            .execute(&self.pool)
            .await?;
        debug!(product_id = %product.id, rows = result.rows_affected(), "Deleted product row");
        Ok(())
    }

    async fn delete_all_products(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM products").execute(&self.pool).await?;
        Ok(())
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<(), StoreError> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    fs::create_dir_all(parent).map_err(|e| {
        StoreError::Database(format!(
            "failed to create parent directory '{}' for database url '{database_url}': {e}",
            parent.display()
        ))
    })
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == MEMORY_URL || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_repository() -> SqliteRepository {
        SqliteRepository::connect(MEMORY_URL).await.expect("db")
    }

    #[tokio::test]
    async fn health_check_succeeds_for_live_pool() {
        memory_repository().await.health_check().await.expect("health check");
    }

    #[tokio::test]
    async fn inserted_product_is_listed() {
        let repo = memory_repository().await;
        let id = repo.insert_product(NewProduct::new("Milk", 2)).await.unwrap();

        let products = repo.get_all_products().await.unwrap();
        assert_eq!(products, vec![Product::new(id, "Milk", 2)]);
    }

    #[tokio::test]
    async fn rejects_invalid_product_before_writing() {
        let repo = memory_repository().await;
        let err = repo.insert_product(NewProduct::new("   ", 3)).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(repo.get_all_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_product_is_a_no_op() {
        let repo = memory_repository().await;
        let id = repo.insert_product(NewProduct::new("Milk", 2)).await.unwrap();
        let ghost = Product::new(ProductId(id.0 + 100), "Ghost", 1);

        repo.delete_product(&ghost).await.unwrap();
        assert_eq!(repo.get_all_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_all_empties_the_table() {
        let repo = memory_repository().await;
        repo.insert_product(NewProduct::new("Milk", 2)).await.unwrap();
        repo.insert_product(NewProduct::new("Bread", 1)).await.unwrap();

        repo.delete_all_products().await.unwrap();
        assert!(repo.get_all_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn products_survive_reconnect() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("nested").join("shopping.db");
        let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

        let repo = SqliteRepository::connect(&database_url).await.expect("db");
        let id = repo.insert_product(NewProduct::new("Bread", 1)).await.unwrap();
        drop(repo);

        assert!(db_path.exists(), "database file should exist: {}", db_path.display());

        let reopened = SqliteRepository::connect(&database_url).await.expect("db");
        assert_eq!(
            reopened.get_all_products().await.unwrap(),
            vec![Product::new(id, "Bread", 1)]
        );
    }

    #[test]
    fn sqlite_path_ignores_memory_urls() {
        assert_eq!(sqlite_path(MEMORY_URL), None);
        assert_eq!(
            sqlite_path("sqlite://./data/shopping_list.db?mode=rwc"),
            Some(PathBuf::from("./data/shopping_list.db"))
        );
    }
}
