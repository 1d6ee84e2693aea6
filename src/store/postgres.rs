//! PostgreSQL-backed store plus the DDL for the four managed tables.

use super::{Fetched, Filter, Row, Select, Store, StoreError};
use crate::schema::Table;
use crate::sql::{self, PgBindValue, QueryBuf};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<Row>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(&self.pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn select(&self, query: &Select) -> Result<Fetched, StoreError> {
        let mut query = query.clone();
        // Ties on a non-unique sort column would make pages overlap.
        if !query.order.is_empty() && query.order.iter().all(|o| o.column != Table::PRIMARY_KEY) {
            let dir = query.order[0].direction;
            query = query.order(Table::PRIMARY_KEY, dir);
        }
        let rows = self.fetch_all(&sql::select(&query)).await?;
        let total = if query.count {
            Some(self.count(query.table, &query.filters).await?)
        } else {
            None
        };
        Ok(Fetched { rows, total })
    }

    async fn count(&self, table: Table, filters: &[Filter]) -> Result<u64, StoreError> {
        let q = sql::count(table, filters);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let n = query.fetch_one(&self.pool).await?;
        Ok(n.max(0) as u64)
    }

    async fn insert(&self, table: Table, values: Row) -> Result<Row, StoreError> {
        self.fetch_optional(&sql::insert(table, &values))
            .await?
            .ok_or_else(|| StoreError::new(format!("insert into {} returned no row", table)))
    }

    async fn update(&self, table: Table, id: i64, values: Row) -> Result<Option<Row>, StoreError> {
        self.fetch_optional(&sql::update(table, id, &values)).await
    }

    async fn delete(&self, table: Table, id: i64) -> Result<Option<Row>, StoreError> {
        self.fetch_optional(&sql::delete(table, id)).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create the managed tables when they do not exist. Only run when bootstrapping is enabled.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), StoreError> {
    const DDL: &[&str] = &[
        r#"
        CREATE TABLE IF NOT EXISTS "tb_product_type" (
            id BIGSERIAL PRIMARY KEY,
            type_key TEXT NOT NULL UNIQUE,
            type_label TEXT NOT NULL,
            sort INTEGER NOT NULL DEFAULT 0
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS "tb_product" (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            sku TEXT NOT NULL,
            price NUMERIC NOT NULL,
            type TEXT NOT NULL,
            main_image TEXT,
            images JSONB,
            image_path TEXT,
            image_keywords TEXT,
            href TEXT,
            describe TEXT,
            fqa TEXT,
            video_url TEXT,
            seo_name TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        r#"CREATE INDEX IF NOT EXISTS tb_product_type_idx ON "tb_product" (type)"#,
        r#"
        CREATE TABLE IF NOT EXISTS "user_leave" (
            id BIGSERIAL PRIMARY KEY,
            email TEXT,
            first_name TEXT,
            last_name TEXT,
            content TEXT,
            topic TEXT,
            phone TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS "tb_eclub" (
            id BIGSERIAL PRIMARY KEY,
            email TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ];
    for ddl in DDL {
        sqlx::query(ddl).execute(pool).await?;
    }
    tracing::info!("managed tables ensured");
    Ok(())
}

fn row_to_json(row: &PgRow) -> Row {
    use sqlx::Column;
    use sqlx::Row as _;
    let mut map = Row::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    map
}

/// Decode one cell by trying the column types the managed tables use.
fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row as _;
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339_opts(chrono::SecondsFormat::Micros, false));
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}
