use anyhow::{Context, Result};
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::query::Query;
use sqlx::Postgres;
use tracing::info;

use crate::config::DbConfig;
use crate::models::{Cell, CleanTable, Column, ColumnKind};

/// Rows per INSERT statement; keeps the bind-parameter count bounded.
const INSERT_CHUNK: usize = 100;

/// Full-replace writer: the destination table is dropped and recreated
/// from the dataset's shape on every save.
pub struct PostgresSink {
    config: DbConfig,
    table_name: String,
}

impl PostgresSink {
    pub fn new(config: DbConfig, table_name: impl Into<String>) -> Self {
        Self {
            config,
            table_name: table_name.into(),
        }
    }

    pub async fn save(&self, table: &CleanTable) -> Result<()> {
        if table.is_empty() {
            return Ok(());
        }

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&self.config.connection_url())
            .await
            .context("Database connection failed")?;
        info!("Successfully connected to PostgreSQL database");

        sqlx::query("SET client_encoding TO 'UTF8'")
            .execute(&pool)
            .await?;

        let drop_sql = format!("DROP TABLE IF EXISTS {}", quote_ident(&self.table_name));
        sqlx::query(&drop_sql).execute(&pool).await?;

        let create_sql = create_table_sql(&self.table_name, &table.columns);
        sqlx::query(&create_sql)
            .execute(&pool)
            .await
            .context("Failed to create destination table")?;

        for chunk in table.rows.chunks(INSERT_CHUNK) {
            let insert = insert_sql(&self.table_name, &table.columns, chunk.len());
            let mut query = sqlx::query(&insert);
            for row in chunk {
                for cell in row {
                    query = bind_cell(query, cell);
                }
            }
            query
                .execute(&pool)
                .await
                .context("Failed to insert rows")?;
        }

        pool.close().await;
        info!(
            "Data successfully saved to PostgreSQL ({} rows into '{}')",
            table.rows.len(),
            self.table_name
        );
        Ok(())
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn create_table_sql(table_name: &str, columns: &[Column]) -> String {
    let cols = columns
        .iter()
        .map(|c| {
            let sql_type = match c.kind {
                ColumnKind::Real => "DOUBLE PRECISION",
                ColumnKind::Text => "TEXT",
            };
            format!("{} {}", quote_ident(&c.name), sql_type)
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!("CREATE TABLE {} ({})", quote_ident(table_name), cols)
}

fn insert_sql(table_name: &str, columns: &[Column], row_count: usize) -> String {
    let col_list = columns
        .iter()
        .map(|c| quote_ident(&c.name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut placeholder = 0usize;
    let tuples = (0..row_count)
        .map(|_| {
            let params = (0..columns.len())
                .map(|_| {
                    placeholder += 1;
                    format!("${}", placeholder)
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("({})", params)
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote_ident(table_name),
        col_list,
        tuples
    )
}

fn bind_cell<'q>(
    query: Query<'q, Postgres, PgArguments>,
    cell: &'q Cell,
) -> Query<'q, Postgres, PgArguments> {
    match cell {
        Cell::Text(s) => query.bind(s.as_str()),
        Cell::Number(v) => query.bind(*v),
        Cell::Missing => query.bind(Option::<f64>::None),
    }
}
