//! PostgreSQL store: one parameterized statement per operation, executed on a shared pool.

use super::{resolve_fields, resolve_update_fields, Record, Store};
use crate::case::row_keys_to_camel_case;
use crate::error::StoreError;
use crate::resource::Resource;
use crate::sql::{self, to_bind_text, QueryBuf};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{ConnectOptions, Row};
use std::str::FromStr;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<PgRow>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(to_bind_text(p));
        }
        Ok(query.fetch_optional(&self.pool).await?)
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<PgRow>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(to_bind_text(p));
        }
        Ok(query.fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_all(&self, resource: Resource) -> Result<Vec<Record>, StoreError> {
        let rows = self.fetch_all(&sql::select_all(resource)).await?;
        rows.iter().map(row_to_record).collect()
    }

    async fn find_by_id(&self, resource: Resource, id: &str) -> Result<Option<Record>, StoreError> {
        let row = self.fetch_optional(&sql::select_by_id(resource, id)).await?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn insert(&self, resource: Resource, payload: Value) -> Result<Record, StoreError> {
        let fields = resolve_fields(resource, payload)?;
        let row = self
            .fetch_optional(&sql::insert(resource, fields))
            .await?
            .ok_or(StoreError::Db(sqlx::Error::RowNotFound))?;
        row_to_record(&row)
    }

    async fn update(&self, resource: Resource, id: &str, payload: Value) -> Result<Record, StoreError> {
        let fields = resolve_update_fields(resource, id, payload)?;
        let row = self
            .fetch_optional(&sql::update(resource, id, fields))
            .await?
            .ok_or_else(|| StoreError::NotFound {
                resource,
                id: id.to_string(),
            })?;
        row_to_record(&row)
    }

    async fn delete(&self, resource: Resource, id: &str) -> Result<(), StoreError> {
        self.fetch_optional(&sql::delete(resource, id))
            .await?
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                resource,
                id: id.to_string(),
            })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

fn row_to_record(row: &PgRow) -> Result<Record, StoreError> {
    match row.try_get::<Value, _>("row")? {
        Value::Object(map) => Ok(row_keys_to_camel_case(map)),
        other => Err(StoreError::Db(sqlx::Error::Decode(
            format!("expected a JSON object row, got {}", other).into(),
        ))),
    }
}

/// Create the target database when it does not exist yet, connecting through the `postgres` maintenance database.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url)?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), StoreError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| StoreError::Db(sqlx::Error::Configuration("DATABASE_URL: no path".into())))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}
