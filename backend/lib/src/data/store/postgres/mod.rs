//! PostgreSQL document store
//!
//! Shops live as JSONB documents in a single table, one row per `id`. The
//! table's serial primary key records insertion order, which every listing
//! follows. Filters are compiled to parameterized SQL by [`sql`].

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use diesel::{
    pg::Pg,
    sql_types::{BigInt, Bool, Jsonb, Text},
    OptionalExtension, QueryableByName,
};
use diesel_async::RunQueryDsl;
use tracing::{debug, info};

use super::{
    error::{StoreError, StoreResult},
    filter::Filter,
    ShopOps, ShopOpsMut, UpsertOutcome,
};
use crate::{
    config::{is_sql_identifier, StoreConfig},
    constants::store::UNSET_GROUP_KEY,
    models::{shop::Shop, stats::GroupCounts},
};

pub mod pool;
pub mod sql;

use pool::ConnectionPool;

#[derive(QueryableByName)]
struct DocumentRow {
    #[diesel(sql_type = Jsonb)]
    doc: serde_json::Value,
}

impl DocumentRow {
    fn into_shop(self) -> StoreResult<Shop> {
        serde_json::from_value(self.doc).map_err(StoreError::from)
    }
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    total: i64,
}

#[derive(QueryableByName)]
struct GroupRow {
    #[diesel(sql_type = Text)]
    key: String,
    #[diesel(sql_type = BigInt)]
    total: i64,
}

#[derive(QueryableByName)]
struct UpsertRow {
    #[diesel(sql_type = Bool)]
    inserted: bool,
}

/// Shop collection stored in a PostgreSQL table
pub struct PostgresStore {
    pool: ConnectionPool,
    table: String,
    timeout: Duration,
}

impl PostgresStore {
    /// Connect to the database named by `config`.
    ///
    /// Fails if the collection name is not a plain identifier or if the
    /// database cannot be reached.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        if !is_sql_identifier(&config.collection) {
            return Err(StoreError::invalid_input(format!(
                "collection name must be a plain identifier: {}",
                config.collection
            )));
        }

        let pool = ConnectionPool::new(config).await?;
        info!(collection = %config.collection, "Connected to PostgreSQL document store");

        Ok(Self {
            pool,
            table: config.collection.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Create the collection table and its indexes if they do not exist yet
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        self.timed(async {
            let mut conn = self.pool.get().await?;

            diesel::sql_query(sql::create_table(&self.table))
                .execute(&mut conn)
                .await?;
            for statement in sql::create_indexes(&self.table) {
                diesel::sql_query(statement).execute(&mut conn).await?;
            }

            debug!(table = %self.table, "Schema ready");
            Ok(())
        })
        .await
    }

    /// Run `operation`, failing with [`StoreError::Timeout`] if it outlives the configured timeout
    async fn timed<T>(&self, operation: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        tokio::time::timeout(self.timeout, operation)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout.as_secs()))?
    }

    async fn load_documents(
        &self,
        query: String,
        binds: Vec<String>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Shop>> {
        let mut conn = self.pool.get().await?;

        let mut statement = diesel::sql_query(query).into_boxed::<Pg>();
        for value in binds {
            statement = statement.bind::<Text, _>(value);
        }
        if let Some(limit) = limit {
            statement = statement.bind::<BigInt, _>(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        statement
            .load::<DocumentRow>(&mut conn)
            .await?
            .into_iter()
            .map(DocumentRow::into_shop)
            .collect()
    }
}

#[async_trait]
impl ShopOps for PostgresStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn list_all(&self) -> StoreResult<Vec<Shop>> {
        self.timed(self.load_documents(sql::select_all(&self.table), Vec::new(), None))
            .await
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Shop>> {
        // no stored id can hold such a value
        if !sql::is_text_value(id) {
            return Ok(None);
        }

        self.timed(async {
            let mut conn = self.pool.get().await?;

            diesel::sql_query(sql::select_by_id(&self.table))
                .bind::<Text, _>(id)
                .get_result::<DocumentRow>(&mut conn)
                .await
                .optional()?
                .map(DocumentRow::into_shop)
                .transpose()
        })
        .await
    }

    async fn find(&self, filter: &Filter, limit: Option<usize>) -> StoreResult<Vec<Shop>> {
        let compiled = sql::compile(filter);
        if !compiled.can_match() {
            return Ok(Vec::new());
        }
        let query = sql::select_matching(&self.table, &compiled, limit.is_some());

        self.timed(self.load_documents(query, compiled.binds, limit))
            .await
    }

    async fn count(&self, filter: Option<&Filter>) -> StoreResult<u64> {
        let compiled = sql::compile(filter.unwrap_or(&Filter::All));
        if !compiled.can_match() {
            return Ok(0);
        }
        let query = sql::count_matching(&self.table, &compiled);

        self.timed(async {
            let mut conn = self.pool.get().await?;

            let mut statement = diesel::sql_query(query).into_boxed::<Pg>();
            for value in compiled.binds {
                statement = statement.bind::<Text, _>(value);
            }
            let row = statement.get_result::<CountRow>(&mut conn).await?;

            Ok(row.total.max(0) as u64)
        })
        .await
    }

    async fn count_grouped_by(&self, field: &str) -> StoreResult<GroupCounts> {
        self.timed(async {
            let mut conn = self.pool.get().await?;

            let rows = diesel::sql_query(sql::count_grouped(&self.table))
                .bind::<Text, _>(field)
                .bind::<Text, _>(UNSET_GROUP_KEY)
                .load::<GroupRow>(&mut conn)
                .await?;

            Ok(GroupCounts::from_ordered(
                rows.into_iter()
                    .map(|row| (row.key, row.total.max(0) as u64))
                    .collect(),
            ))
        })
        .await
    }
}

#[async_trait]
impl ShopOpsMut for PostgresStore {
    async fn upsert(&self, shop: Shop) -> StoreResult<UpsertOutcome> {
        let id = shop.id.clone();
        let doc = serde_json::to_value(&shop)?;

        self.timed(async {
            let mut conn = self.pool.get().await?;

            let row = diesel::sql_query(sql::upsert(&self.table))
                .bind::<Text, _>(id)
                .bind::<Jsonb, _>(doc)
                .get_result::<UpsertRow>(&mut conn)
                .await
                .optional()?;

            Ok(match row {
                Some(UpsertRow { inserted: true }) => UpsertOutcome::Inserted,
                Some(UpsertRow { inserted: false }) => UpsertOutcome::Updated,
                None => UpsertOutcome::Unchanged,
            })
        })
        .await
    }

    async fn clear(&self) -> StoreResult<u64> {
        self.timed(async {
            let mut conn = self.pool.get().await?;
            let removed = diesel::sql_query(sql::delete_all(&self.table))
                .execute(&mut conn)
                .await?;
            Ok(removed as u64)
        })
        .await
    }
}
