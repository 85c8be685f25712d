//! Schema introspection through the read-only executor.
//!
//! Every catalog lookup is a fixed statement with bound parameters. The one
//! place that has to splice identifiers into SQL, [`CatalogInspector::sample_rows`],
//! escapes them with the server's own `quote_ident` first.

use crate::db::executor::QueryExecutor;
use crate::error::{DbError, DbResult};
use crate::models::{ConnectionId, QueryParam, ResultRow};
use tracing::debug;

/// Rows returned by `sample_rows` when no limit is given.
pub const DEFAULT_SAMPLE_LIMIT: u32 = 10;

/// Upper bound for `sample_rows`.
pub const MAX_SAMPLE_LIMIT: u32 = 100;

mod queries {
    /// Catalog columns are cast to `text` so every value decodes as a plain string.
    pub const LIST_SCHEMAS: &str = r#"
        SELECT
            n.nspname::text AS schema_name,
            pg_get_userbyid(n.nspowner)::text AS owner,
            obj_description(n.oid, 'pg_namespace') AS description
        FROM pg_namespace n
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema')
          AND n.nspname NOT LIKE 'pg_toast%'
          AND n.nspname NOT LIKE 'pg_temp_%'
        ORDER BY n.nspname
    "#;

    pub const LIST_TABLES: &str = r#"
        SELECT
            n.nspname::text AS table_schema,
            c.relname::text AS table_name,
            CASE c.relkind
                WHEN 'r' THEN 'table'
                WHEN 'p' THEN 'partitioned table'
                WHEN 'v' THEN 'view'
                WHEN 'm' THEN 'materialized view'
                WHEN 'f' THEN 'foreign table'
            END AS table_type,
            obj_description(c.oid, 'pg_class') AS description
        FROM pg_class c
        JOIN pg_namespace n ON n.oid = c.relnamespace
        WHERE n.nspname::text = $1
          AND c.relkind IN ('r', 'p', 'v', 'm', 'f')
        ORDER BY c.relname
    "#;

    pub const LIST_COLUMNS: &str = r#"
        SELECT
            a.attname::text AS column_name,
            format_type(a.atttypid, a.atttypmod) AS data_type,
            NOT a.attnotnull AS is_nullable,
            pg_get_expr(d.adbin, d.adrelid) AS column_default,
            col_description(c.oid, a.attnum) AS description,
            a.attnum::int4 AS ordinal_position
        FROM pg_attribute a
        JOIN pg_class c ON c.oid = a.attrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        LEFT JOIN pg_attrdef d ON d.adrelid = a.attrelid AND d.adnum = a.attnum
        WHERE n.nspname::text = $1
          AND c.relname::text = $2
          AND a.attnum > 0
          AND NOT a.attisdropped
        ORDER BY a.attnum
    "#;

    pub const LIST_INDEXES: &str = r#"
        SELECT
            i.relname::text AS index_name,
            ix.indisunique AS is_unique,
            ix.indisprimary AS is_primary,
            am.amname::text AS method,
            pg_get_indexdef(ix.indexrelid) AS definition
        FROM pg_index ix
        JOIN pg_class t ON t.oid = ix.indrelid
        JOIN pg_class i ON i.oid = ix.indexrelid
        JOIN pg_namespace n ON n.oid = t.relnamespace
        JOIN pg_am am ON am.oid = i.relam
        WHERE n.nspname::text = $1
          AND t.relname::text = $2
        ORDER BY i.relname
    "#;

    pub const LIST_CONSTRAINTS: &str = r#"
        SELECT
            con.conname::text AS constraint_name,
            CASE con.contype
                WHEN 'p' THEN 'PRIMARY KEY'
                WHEN 'f' THEN 'FOREIGN KEY'
                WHEN 'u' THEN 'UNIQUE'
                WHEN 'c' THEN 'CHECK'
                WHEN 'x' THEN 'EXCLUDE'
                ELSE con.contype::text
            END AS constraint_type,
            pg_get_constraintdef(con.oid) AS definition,
            CASE WHEN con.confrelid <> 0 THEN con.confrelid::regclass::text END AS referenced_table
        FROM pg_constraint con
        JOIN pg_class c ON c.oid = con.conrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        WHERE n.nspname::text = $1
          AND c.relname::text = $2
        ORDER BY con.contype, con.conname
    "#;

    pub const LIST_EXTENSIONS: &str = r#"
        SELECT
            e.extname::text AS name,
            e.extversion AS version,
            n.nspname::text AS schema,
            e.extrelocatable AS relocatable,
            obj_description(e.oid, 'pg_extension') AS description
        FROM pg_extension e
        JOIN pg_namespace n ON n.oid = e.extnamespace
        WHERE $1::text IS NULL OR n.nspname::text = $1
        ORDER BY e.extname
    "#;

    /// One installed extension with the objects it owns.
    pub const GET_EXTENSION: &str = r#"
        SELECT
            e.extname::text AS name,
            e.extversion AS version,
            n.nspname::text AS schema,
            e.extrelocatable AS relocatable,
            obj_description(e.oid, 'pg_extension') AS description,
            a.default_version AS default_version,
            a.default_version IS DISTINCT FROM e.extversion AS update_available,
            ARRAY(
                SELECT pg_describe_object(d.classid, d.objid, d.objsubid)
                FROM pg_depend d
                WHERE d.refclassid = 'pg_extension'::regclass
                  AND d.refobjid = e.oid
                  AND d.deptype = 'e'
                ORDER BY 1
            ) AS members
        FROM pg_extension e
        JOIN pg_namespace n ON n.oid = e.extnamespace
        LEFT JOIN pg_available_extensions a ON a.name = e.extname
        WHERE e.extname::text = $1
          AND ($2::text IS NULL OR n.nspname::text = $2)
    "#;

    /// `reltuples` is -1 for relations that were never analyzed.
    pub const APPROXIMATE_ROW_COUNT: &str = r#"
        SELECT
            n.nspname::text AS table_schema,
            c.relname::text AS table_name,
            CASE WHEN c.reltuples < 0 THEN NULL ELSE c.reltuples::int8 END AS approximate_rows,
            pg_total_relation_size(c.oid) AS total_bytes
        FROM pg_class c
        JOIN pg_namespace n ON n.oid = c.relnamespace
        WHERE n.nspname::text = $1
          AND c.relname::text = $2
    "#;

    pub const QUOTE_IDENTIFIERS: &str =
        "SELECT quote_ident($1) AS schema_ident, quote_ident($2) AS table_ident";
}

/// Catalog lookups for one registered connection at a time.
#[derive(Clone)]
pub struct CatalogInspector {
    executor: QueryExecutor,
}

impl CatalogInspector {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    /// List user schemas.
    pub async fn list_schemas(&self, conn_id: &ConnectionId) -> DbResult<Vec<ResultRow>> {
        self.executor
            .execute(conn_id, queries::LIST_SCHEMAS, &[])
            .await
    }

    /// List tables, views and materialized views in a schema.
    pub async fn list_tables(
        &self,
        conn_id: &ConnectionId,
        schema: &str,
    ) -> DbResult<Vec<ResultRow>> {
        self.executor
            .execute(conn_id, queries::LIST_TABLES, &[text(schema)])
            .await
    }

    /// Columns with type, nullability, default and comment, in ordinal order.
    pub async fn list_columns(
        &self,
        conn_id: &ConnectionId,
        schema: &str,
        table: &str,
    ) -> DbResult<Vec<ResultRow>> {
        self.executor
            .execute(conn_id, queries::LIST_COLUMNS, &[text(schema), text(table)])
            .await
    }

    pub async fn list_indexes(
        &self,
        conn_id: &ConnectionId,
        schema: &str,
        table: &str,
    ) -> DbResult<Vec<ResultRow>> {
        self.executor
            .execute(conn_id, queries::LIST_INDEXES, &[text(schema), text(table)])
            .await
    }

    pub async fn list_constraints(
        &self,
        conn_id: &ConnectionId,
        schema: &str,
        table: &str,
    ) -> DbResult<Vec<ResultRow>> {
        self.executor
            .execute(
                conn_id,
                queries::LIST_CONSTRAINTS,
                &[text(schema), text(table)],
            )
            .await
    }

    /// Installed extensions, optionally restricted to one schema.
    pub async fn list_extensions(
        &self,
        conn_id: &ConnectionId,
        schema: Option<&str>,
    ) -> DbResult<Vec<ResultRow>> {
        let param = schema.map(text).unwrap_or(QueryParam::Null);
        self.executor
            .execute(conn_id, queries::LIST_EXTENSIONS, &[param])
            .await
    }

    /// Details of one installed extension, including its member objects.
    ///
    /// Returns `None` when the extension is not installed (in `schema`, if given).
    pub async fn get_extension(
        &self,
        conn_id: &ConnectionId,
        name: &str,
        schema: Option<&str>,
    ) -> DbResult<Option<ResultRow>> {
        let schema = schema.map(text).unwrap_or(QueryParam::Null);
        let mut rows = self
            .executor
            .execute(conn_id, queries::GET_EXTENSION, &[text(name), schema])
            .await?;
        Ok(rows.pop())
    }

    /// Planner estimate of the row count; cheap, never scans the table.
    ///
    /// Returns `None` when the table does not exist.
    pub async fn approximate_row_count(
        &self,
        conn_id: &ConnectionId,
        schema: &str,
        table: &str,
    ) -> DbResult<Option<ResultRow>> {
        let mut rows = self
            .executor
            .execute(
                conn_id,
                queries::APPROXIMATE_ROW_COUNT,
                &[text(schema), text(table)],
            )
            .await?;
        Ok(rows.pop())
    }

    /// Escape a schema and table name with the server's `quote_ident`.
    pub async fn quote_identifiers(
        &self,
        conn_id: &ConnectionId,
        schema: &str,
        table: &str,
    ) -> DbResult<(String, String)> {
        let rows = self
            .executor
            .execute(
                conn_id,
                queries::QUOTE_IDENTIFIERS,
                &[text(schema), text(table)],
            )
            .await?;

        let row = rows
            .first()
            .ok_or_else(|| DbError::internal("quote_ident returned no rows"))?;
        let field = |name: &str| {
            row.get(name)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| DbError::internal(format!("quote_ident returned no {name}")))
        };
        Ok((field("schema_ident")?, field("table_ident")?))
    }

    /// First `limit` rows of a table (default 10, at most 100).
    pub async fn sample_rows(
        &self,
        conn_id: &ConnectionId,
        schema: &str,
        table: &str,
        limit: Option<u32>,
    ) -> DbResult<Vec<ResultRow>> {
        let (schema_ident, table_ident) = self.quote_identifiers(conn_id, schema, table).await?;
        let limit = clamp_sample_limit(limit);
        debug!(conn_id = %conn_id, schema = %schema_ident, table = %table_ident, limit, "Sampling rows");

        let sql = sample_query(&schema_ident, &table_ident);
        self.executor
            .execute(conn_id, &sql, &[QueryParam::Int(limit as i64)])
            .await
    }
}

fn text(value: &str) -> QueryParam {
    QueryParam::String(value.to_string())
}

fn clamp_sample_limit(limit: Option<u32>) -> u32 {
    limit
        .map(|l| l.clamp(1, MAX_SAMPLE_LIMIT))
        .unwrap_or(DEFAULT_SAMPLE_LIMIT)
}

/// Identifiers must already be quoted.
fn sample_query(schema_ident: &str, table_ident: &str) -> String {
    format!("SELECT * FROM {schema_ident}.{table_ident} LIMIT $1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_sample_limit() {
        assert_eq!(clamp_sample_limit(None), DEFAULT_SAMPLE_LIMIT);
        assert_eq!(clamp_sample_limit(Some(0)), 1);
        assert_eq!(clamp_sample_limit(Some(25)), 25);
        assert_eq!(clamp_sample_limit(Some(10_000)), MAX_SAMPLE_LIMIT);
    }

    #[test]
    fn test_sample_query_uses_bound_limit() {
        assert_eq!(
            sample_query("public", "\"Order Items\""),
            "SELECT * FROM public.\"Order Items\" LIMIT $1"
        );
    }

    #[test]
    fn test_table_queries_are_parameterized() {
        for sql in [
            queries::LIST_TABLES,
            queries::LIST_COLUMNS,
            queries::LIST_INDEXES,
            queries::LIST_CONSTRAINTS,
            queries::LIST_EXTENSIONS,
            queries::GET_EXTENSION,
            queries::APPROXIMATE_ROW_COUNT,
        ] {
            assert!(sql.contains("$1"));
            assert!(!sql.contains('{'));
        }
        assert!(!queries::LIST_SCHEMAS.contains('$'));
    }
}
