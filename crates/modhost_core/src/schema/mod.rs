//! Declared table shapes and their reconciliation against SQLite.
//!
//! # Responsibility
//! - Describe a table as an ordered list of typed columns.
//! - Create missing tables and add missing columns, nothing more.
//!
//! # Invariants
//! - Reconciliation never drops or rewrites existing data.
//! - Columns present in the database but absent from the schema are left alone.
//! - One `register_table` call is one transaction.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod sync;

pub use sync::register_table;

/// SQLite storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
}

impl ColumnType {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    /// SQL literal used as `DEFAULT`, e.g. `0` or `'spawn'`.
    pub default: Option<String>,
}

impl Column {
    /// Non-null column without default.
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            primary_key: false,
            default: None,
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Integer)
    }

    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Real)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub fn blob(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Blob)
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn default_sql(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    fn definition(&self, inline_primary_key: bool) -> String {
        let mut sql = format!("\"{}\" {}", self.name, self.kind.as_sql());
        if inline_primary_key && self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(literal) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(literal);
        }
        sql
    }
}

/// Declared shape of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    name: String,
    columns: Vec<Column>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Checks identifiers and column uniqueness before touching the database.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if !is_valid_identifier(&self.name) {
            return Err(SchemaError::InvalidIdentifier(self.name.clone()));
        }
        if self.columns.is_empty() {
            return Err(SchemaError::NoColumns(self.name.clone()));
        }
        for (index, column) in self.columns.iter().enumerate() {
            if !is_valid_identifier(&column.name) {
                return Err(SchemaError::InvalidIdentifier(column.name.clone()));
            }
            let duplicated = self.columns[..index]
                .iter()
                .any(|earlier| earlier.name.eq_ignore_ascii_case(&column.name));
            if duplicated {
                return Err(SchemaError::DuplicateColumn {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn create_sql(&self) -> String {
        let key_columns: Vec<&Column> = self.columns.iter().filter(|c| c.primary_key).collect();
        let inline_key = key_columns.len() == 1;
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|column| column.definition(inline_key))
            .collect();
        if key_columns.len() > 1 {
            let names: Vec<String> = key_columns
                .iter()
                .map(|column| format!("\"{}\"", column.name))
                .collect();
            parts.push(format!("PRIMARY KEY ({})", names.join(", ")));
        }
        format!("CREATE TABLE \"{}\" ({});", self.name, parts.join(", "))
    }

    pub(crate) fn add_column_sql(&self, column: &Column) -> String {
        format!(
            "ALTER TABLE \"{}\" ADD COLUMN {};",
            self.name,
            column.definition(false)
        )
    }
}

/// What one reconciliation changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSync {
    pub table: String,
    pub created: bool,
    pub added_columns: Vec<String>,
}

impl SchemaSync {
    pub fn is_noop(&self) -> bool {
        !self.created && self.added_columns.is_empty()
    }
}

#[derive(Debug)]
pub enum SchemaError {
    InvalidIdentifier(String),
    NoColumns(String),
    DuplicateColumn {
        table: String,
        column: String,
    },
    ColumnTypeMismatch {
        table: String,
        column: String,
        existing: String,
        declared: &'static str,
    },
    /// The column is missing and SQLite cannot add it without a rebuild.
    ColumnNotAddable {
        table: String,
        column: String,
        reason: &'static str,
    },
    Sqlite(rusqlite::Error),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier(value) => write!(f, "schema identifier is invalid: {value}"),
            Self::NoColumns(table) => write!(f, "table `{table}` declares no columns"),
            Self::DuplicateColumn { table, column } => {
                write!(f, "table `{table}` declares column `{column}` twice")
            }
            Self::ColumnTypeMismatch {
                table,
                column,
                existing,
                declared,
            } => write!(
                f,
                "column `{table}.{column}` has type `{existing}` but `{declared}` is declared"
            ),
            Self::ColumnNotAddable {
                table,
                column,
                reason,
            } => write!(f, "cannot add column `{table}.{column}`: {reason}"),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SchemaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for SchemaError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

fn is_valid_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::{Column, SchemaError, TableSchema};

    fn homes() -> TableSchema {
        TableSchema::new("homes")
            .column(Column::integer("id").primary_key())
            .column(Column::text("owner"))
            .column(Column::text("name").default_sql("'home'"))
            .column(Column::real("x").nullable())
    }

    #[test]
    fn renders_create_statement_with_inline_key() {
        assert_eq!(
            homes().create_sql(),
            "CREATE TABLE \"homes\" (\"id\" INTEGER PRIMARY KEY NOT NULL, \"owner\" TEXT NOT NULL, \
             \"name\" TEXT NOT NULL DEFAULT 'home', \"x\" REAL);"
        );
    }

    #[test]
    fn renders_composite_primary_key_as_constraint() {
        let sql = TableSchema::new("grants")
            .column(Column::text("player").primary_key())
            .column(Column::text("perm").primary_key())
            .create_sql();
        assert!(sql.ends_with("PRIMARY KEY (\"player\", \"perm\"));"));
        assert!(!sql.contains("TEXT PRIMARY KEY"));
    }

    #[test]
    fn validate_rejects_bad_identifiers() {
        let err = TableSchema::new("bad name")
            .column(Column::integer("id"))
            .validate()
            .expect_err("space in table name");
        assert!(matches!(err, SchemaError::InvalidIdentifier(_)));

        let err = TableSchema::new("homes")
            .column(Column::integer("1id"))
            .validate()
            .expect_err("leading digit");
        assert!(matches!(err, SchemaError::InvalidIdentifier(_)));
    }

    #[test]
    fn validate_rejects_empty_and_duplicate_columns() {
        let err = TableSchema::new("homes").validate().expect_err("no columns");
        assert!(matches!(err, SchemaError::NoColumns(_)));

        let err = homes()
            .column(Column::text("OWNER"))
            .validate()
            .expect_err("duplicate column");
        assert!(matches!(err, SchemaError::DuplicateColumn { .. }));
    }
}
