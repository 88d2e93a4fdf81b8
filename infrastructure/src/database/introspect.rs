//! Schema introspection queries per database kind.

use dbchat_domain::{ColumnDescriptor, SchemaCache};
use sqlx::{MySqlPool, PgPool, Row, SqlitePool};
use std::collections::HashSet;

pub(crate) async fn sqlite(pool: &SqlitePool) -> Result<SchemaCache, sqlx::Error> {
    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master \
         WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    let mut schema = SchemaCache::new();
    for table in tables {
        let rows = sqlx::query(
            "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?) ORDER BY cid",
        )
        .bind(&table)
        .fetch_all(pool)
        .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("name")?;
            let data_type: String = row.try_get("type")?;
            let not_null: i64 = row.try_get("notnull")?;
            let pk: i64 = row.try_get("pk")?;

            let mut column = ColumnDescriptor::new(name, data_type);
            if pk > 0 {
                column = column.primary_key();
            } else if not_null != 0 {
                column = column.not_null();
            }
            columns.push(column);
        }
        schema.insert_table(table, columns);
    }
    Ok(schema)
}

pub(crate) async fn postgres(pool: &PgPool) -> Result<SchemaCache, sqlx::Error> {
    let keys: HashSet<(String, String)> = sqlx::query(
        "SELECT kcu.table_name::text AS table_name, kcu.column_name::text AS column_name \
         FROM information_schema.table_constraints tc \
         JOIN information_schema.key_column_usage kcu \
           ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema \
         WHERE tc.constraint_type = 'PRIMARY KEY' AND tc.table_schema = current_schema()",
    )
    .fetch_all(pool)
    .await?
    .iter()
    .map(|row| Ok((row.try_get("table_name")?, row.try_get("column_name")?)))
    .collect::<Result<_, sqlx::Error>>()?;

    let rows = sqlx::query(
        "SELECT table_name::text AS table_name, column_name::text AS column_name, \
                data_type::text AS data_type, is_nullable::text AS is_nullable \
         FROM information_schema.columns \
         WHERE table_schema = current_schema() \
         ORDER BY table_name, ordinal_position",
    )
    .fetch_all(pool)
    .await?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        columns.push((
            row.try_get::<String, _>("table_name")?,
            row.try_get::<String, _>("column_name")?,
            row.try_get::<String, _>("data_type")?,
            row.try_get::<String, _>("is_nullable")? == "YES",
        ));
    }
    Ok(group(columns, |table, column| {
        keys.contains(&(table.to_string(), column.to_string()))
    }))
}

pub(crate) async fn mysql(pool: &MySqlPool) -> Result<SchemaCache, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT CAST(TABLE_NAME AS CHAR) AS table_name, CAST(COLUMN_NAME AS CHAR) AS column_name, \
                CAST(DATA_TYPE AS CHAR) AS data_type, CAST(IS_NULLABLE AS CHAR) AS is_nullable, \
                CAST(COLUMN_KEY AS CHAR) AS column_key \
         FROM information_schema.COLUMNS \
         WHERE TABLE_SCHEMA = DATABASE() \
         ORDER BY TABLE_NAME, ORDINAL_POSITION",
    )
    .fetch_all(pool)
    .await?;

    let mut columns = Vec::with_capacity(rows.len());
    let mut keys = HashSet::new();
    for row in &rows {
        let table: String = row.try_get("table_name")?;
        let column: String = row.try_get("column_name")?;
        if row.try_get::<String, _>("column_key")? == "PRI" {
            keys.insert((table.clone(), column.clone()));
        }
        columns.push((
            table,
            column,
            row.try_get::<String, _>("data_type")?,
            row.try_get::<String, _>("is_nullable")? == "YES",
        ));
    }
    Ok(group(columns, |table, column| {
        keys.contains(&(table.to_string(), column.to_string()))
    }))
}

/// Build a schema from `(table, column, type, nullable)` rows in table order.
fn group(
    rows: Vec<(String, String, String, bool)>,
    is_key: impl Fn(&str, &str) -> bool,
) -> SchemaCache {
    let mut schema = SchemaCache::new();
    let mut current: Option<(String, Vec<ColumnDescriptor>)> = None;

    for (table, column, data_type, nullable) in rows {
        let mut descriptor = ColumnDescriptor::new(column.as_str(), data_type);
        if is_key(&table, &column) {
            descriptor = descriptor.primary_key();
        } else if !nullable {
            descriptor = descriptor.not_null();
        }

        match current.as_mut() {
            Some((name, columns)) if *name == table => columns.push(descriptor),
            _ => {
                if let Some((name, columns)) = current.take() {
                    schema.insert_table(name, columns);
                }
                current = Some((table, vec![descriptor]));
            }
        }
    }
    if let Some((name, columns)) = current {
        schema.insert_table(name, columns);
    }
    schema
}
