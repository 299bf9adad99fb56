use std::str::FromStr;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{ConfigError, QueryError};
use crate::lookup::StudentLookup;
use crate::models::{columns, GradeRow, StudentRecord};

pub async fn connect(config: &Config) -> Result<PgPool, ConfigError> {
    let options = PgConnectOptions::from_str(&config.store_url)
        .map_err(ConfigError::InvalidUrl)?
        .password(&config.store_key);

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(ConfigError::Connect)?;

    info!("Connected to grade store");
    Ok(pool)
}

pub struct PgLookup {
    pool: PgPool,
    by_id: String,
    by_email: String,
}

impl PgLookup {
    pub fn new(pool: PgPool, table: &str) -> Self {
        Self {
            pool,
            by_id: select_where(table, &id_predicate()),
            by_email: select_where(table, &email_predicate()),
        }
    }

    async fn fetch(&self, sql: &str, value: &str) -> Result<Vec<StudentRecord>, QueryError> {
        debug!("Running lookup: {sql}");
        let rows = sqlx::query_as::<_, GradeRow>(sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(GradeRow::into_record).collect())
    }
}

#[async_trait]
impl StudentLookup for PgLookup {
    async fn find_by_id(&self, id: &str) -> Result<Vec<StudentRecord>, QueryError> {
        self.fetch(&self.by_id, id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<StudentRecord>, QueryError> {
        self.fetch(&self.by_email, email).await
    }
}

// Numeric ID columns compare by value so `007` matches 7. The input is digits
// only, and CASE keeps the numeric cast away from text-typed columns.
fn id_predicate() -> String {
    let column = quote_ident(columns::ID);
    format!(
        "CASE WHEN pg_typeof({column}) IN \
         ('smallint'::regtype, 'integer'::regtype, 'bigint'::regtype, 'numeric'::regtype) \
         THEN {column}::text::numeric = $1::numeric \
         ELSE {column}::text = $1 END"
    )
}

fn email_predicate() -> String {
    format!("lower({}::text) = $1", quote_ident(columns::EMAIL))
}

// Every cell comes back as text and is parsed in `GradeRow::into_record`, so
// blank or decimal-comma cells in a text-typed import never fail the query.
fn select_where(table: &str, predicate: &str) -> String {
    format!(
        "SELECT {}::text AS name, {}::text AS id, {}::text AS email, \
         {}::text AS approved_activities, {}::text AS concept_grade, \
         {}::text AS partial_grade, {}::text AS final_grade, {}::text AS condition \
         FROM {} WHERE {}",
        quote_ident(columns::NAME),
        quote_ident(columns::ID),
        quote_ident(columns::EMAIL),
        quote_ident(columns::APPROVED),
        quote_ident(columns::CONCEPT),
        quote_ident(columns::PARTIAL),
        quote_ident(columns::FINAL),
        quote_ident(columns::CONDITION),
        quote_table(table),
        predicate
    )
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_table(table: &str) -> String {
    match table.split_once('.') {
        Some((schema, name)) => format!("{}.{}", quote_ident(schema), quote_ident(name)),
        None => quote_ident(table),
    }
}
