use super::{Column, SchemaError, SchemaSync, TableSchema};
use crate::db::Database;
use log::info;
use rusqlite::{Connection, OptionalExtension};
use std::time::Instant;

struct ExistingColumn {
    name: String,
    declared_type: String,
}

/// Creates `schema`'s table or adds its missing columns, in one transaction.
pub fn register_table(database: &Database, schema: &TableSchema) -> Result<SchemaSync, SchemaError> {
    schema.validate()?;
    let started_at = Instant::now();

    let sync = database.transaction(|tx| reconcile(tx, schema))?;
    info!(
        "event=table_register module=schema status=ok table={} created={} added_columns={} duration_ms={}",
        sync.table,
        sync.created,
        sync.added_columns.len(),
        started_at.elapsed().as_millis()
    );
    Ok(sync)
}

fn reconcile(conn: &Connection, schema: &TableSchema) -> Result<SchemaSync, SchemaError> {
    let mut sync = SchemaSync {
        table: schema.name().to_string(),
        created: false,
        added_columns: Vec::new(),
    };

    if !table_exists(conn, schema.name())? {
        conn.execute_batch(&schema.create_sql())?;
        sync.created = true;
        return Ok(sync);
    }

    let existing = existing_columns(conn, schema.name())?;
    for column in schema.columns() {
        match existing
            .iter()
            .find(|found| found.name.eq_ignore_ascii_case(&column.name))
        {
            Some(found) => check_type(schema, column, found)?,
            None => {
                check_addable(schema, column)?;
                conn.execute_batch(&schema.add_column_sql(column))?;
                sync.added_columns.push(column.name.clone());
            }
        }
    }
    Ok(sync)
}

/// Table names in SQLite are case-insensitive; so is this check.
fn table_exists(conn: &Connection, name: &str) -> Result<bool, SchemaError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE;",
            [name],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn existing_columns(conn: &Connection, table: &str) -> Result<Vec<ExistingColumn>, SchemaError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{table}\");"))?;
    let rows = stmt.query_map([], |row| {
        Ok(ExistingColumn {
            name: row.get("name")?,
            declared_type: row.get("type")?,
        })
    })?;
    let mut columns = Vec::new();
    for row in rows {
        columns.push(row?);
    }
    Ok(columns)
}

fn check_type(
    schema: &TableSchema,
    column: &Column,
    found: &ExistingColumn,
) -> Result<(), SchemaError> {
    if found.declared_type.eq_ignore_ascii_case(column.kind.as_sql()) {
        return Ok(());
    }
    Err(SchemaError::ColumnTypeMismatch {
        table: schema.name().to_string(),
        column: column.name.clone(),
        existing: found.declared_type.clone(),
        declared: column.kind.as_sql(),
    })
}

fn check_addable(schema: &TableSchema, column: &Column) -> Result<(), SchemaError> {
    let reason = if column.primary_key {
        "primary key columns cannot be added to an existing table"
    } else if !column.nullable && column.default.is_none() {
        "NOT NULL column needs a default to be added to an existing table"
    } else {
        return Ok(());
    };
    Err(SchemaError::ColumnNotAddable {
        table: schema.name().to_string(),
        column: column.name.clone(),
        reason,
    })
}
