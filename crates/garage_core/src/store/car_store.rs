//! The garage store: a CRUD router over the cars table.
//!
//! # Responsibility
//! - Translate a resource path plus optional filter into one table
//!   operation.
//! - Enforce the write invariants of the cars contract.
//! - Announce effective mutations through the change notifier.
//!
//! # Invariants
//! - Required fields are validated before any SQL mutation; a failed
//!   validation performs no partial write.
//! - Item paths force `_id = ?`, overriding caller-supplied filters.
//! - Zero affected rows on update/delete is a valid result, not an error.

use crate::contract;
use crate::contract::CarColor;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::notify::{ChangeNotifier, ChangeSubscription};
use crate::store::resource::{Resource, ResourceRouter};
use crate::store::values::{FieldMap, RowSet, Value};
use log::{error, info};
use rusqlite::{params_from_iter, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store call failures. All are terminal for the single call; nothing is
/// retried internally.
#[derive(Debug)]
pub enum StoreError {
    /// Path matched neither the collection nor `cars/{numeric-id}`.
    InvalidResource(String),
    /// The operation is not defined for the resolved resource.
    UnsupportedOperation {
        operation: &'static str,
        uri: String,
    },
    /// A write field map violated the contract (missing, null or blank
    /// required field, or a column that is not writable).
    InvalidArgument(String),
    /// The underlying engine rejected the operation.
    Storage(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidResource(path) => write!(f, "cannot route unknown resource `{path}`"),
            Self::UnsupportedOperation { operation, uri } => {
                write!(f, "{operation} is not supported for {uri}")
            }
            Self::InvalidArgument(message) => write!(f, "{message}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

/// Query options for `list`.
#[derive(Debug, Clone, Default)]
pub struct CarQuery {
    /// Columns to project; `None` selects every contract column.
    pub columns: Option<Vec<String>>,
    /// SQL filter fragment with `?` placeholders. Ignored for item paths.
    pub filter: Option<String>,
    /// Arguments bound to the filter placeholders, in order.
    pub filter_args: Vec<Value>,
    /// SQL `ORDER BY` fragment, e.g. `make ASC`.
    pub sort_order: Option<String>,
}

/// CRUD router for the cars table.
///
/// Owns one open, migrated connection for its lifetime, an instance-owned
/// route table, and the change notifier shared with observers. All calls
/// run synchronously on the caller's thread; embeddings that need
/// off-thread storage access wrap the store in their own task model.
pub struct GarageStore {
    conn: Connection,
    router: ResourceRouter,
    notifier: Arc<ChangeNotifier>,
}

impl GarageStore {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::with_connection(open_db(path)?))
    }

    /// Opens an in-memory database, mainly for tests and smoke probes.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::with_connection(open_db_in_memory()?))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            router: ResourceRouter::new(),
            notifier: Arc::new(ChangeNotifier::new()),
        }
    }

    /// The notifier observers subscribe through.
    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    /// Registers an observer of `resource`; dropping the subscription
    /// unregisters it.
    pub fn watch(
        &self,
        resource: Resource,
        callback: impl Fn(&Resource) + Send + Sync + 'static,
    ) -> ChangeSubscription {
        self.notifier.watch(resource, callback)
    }

    /// Resolves a path to its routing target.
    pub fn resolve(&self, path: &str) -> StoreResult<Resource> {
        self.router.resolve(path)
    }

    /// Runs a query against the resolved resource.
    ///
    /// Collection paths run the caller's filter and sort as given over the
    /// whole table. Item paths ignore the caller's filter and force
    /// `_id = ?`, returning at most one row. The returned row set is
    /// tagged with the resolved resource.
    pub fn list(&self, path: &str, query: &CarQuery) -> StoreResult<RowSet> {
        let resource = self.router.resolve(path)?;
        let projection = projection_sql(query.columns.as_deref())?;

        let mut sql = format!("SELECT {projection} FROM {}", contract::TABLE_CARS);
        let (filter, args) = forced_filter(resource, query.filter.as_deref(), &query.filter_args);
        if let Some(filter) = filter {
            sql.push_str(" WHERE ");
            sql.push_str(&filter);
        }
        if let Some(sort_order) = query.sort_order.as_deref() {
            sql.push_str(" ORDER BY ");
            sql.push_str(sort_order);
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let column_names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt.query(params_from_iter(args))?;
        let mut out: Vec<Vec<Value>> = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Vec::with_capacity(column_names.len());
            for index in 0..column_names.len() {
                record.push(row.get::<_, Value>(index)?);
            }
            out.push(record);
        }

        Ok(RowSet::new(resource, column_names, out))
    }

    /// Inserts one car into the collection and returns its assigned id.
    ///
    /// Only valid against the collection path. The four required fields
    /// must be present and non-blank; a missing `color` defaults to white.
    /// On success the collection is notified.
    pub fn insert(&self, path: &str, values: &FieldMap) -> StoreResult<i64> {
        let resource = self.router.resolve(path)?;
        if let Resource::Item(_) = resource {
            return Err(StoreError::UnsupportedOperation {
                operation: "insert",
                uri: resource.uri(),
            });
        }

        check_writable_columns(values)?;
        for column in contract::REQUIRED_COLUMNS {
            check_required_field(values, column)?;
        }

        let mut columns: Vec<&str> = Vec::with_capacity(values.len() + 1);
        let mut args: Vec<Value> = Vec::with_capacity(values.len() + 1);
        for (column, value) in values.iter() {
            columns.push(column);
            args.push(value.clone());
        }
        if !values.contains(contract::COL_COLOR) {
            columns.push(contract::COL_COLOR);
            args.push(Value::Integer(CarColor::default().code()));
        }

        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({});",
            contract::TABLE_CARS,
            columns.join(", "),
            placeholders
        );

        if let Err(err) = self.conn.execute(&sql, params_from_iter(args)) {
            error!("event=store_insert module=store status=error error={err}");
            return Err(err.into());
        }

        let id = self.conn.last_insert_rowid();
        info!("event=store_insert module=store status=ok id={id}");
        self.notifier.notify(&Resource::Collection);
        Ok(id)
    }

    /// Updates rows matching the (possibly forced) filter.
    ///
    /// An empty field map is a no-op returning 0. Required fields present
    /// in the map are re-validated with the insert rule. Returns the
    /// affected row count; a count above zero notifies the resource.
    pub fn update(
        &self,
        path: &str,
        values: &FieldMap,
        filter: Option<&str>,
        filter_args: &[Value],
    ) -> StoreResult<usize> {
        let resource = self.router.resolve(path)?;
        if values.is_empty() {
            return Ok(0);
        }

        check_writable_columns(values)?;
        for column in contract::REQUIRED_COLUMNS {
            if values.contains(column) {
                check_required_field(values, column)?;
            }
        }

        let mut assignments: Vec<String> = Vec::with_capacity(values.len());
        let mut args: Vec<Value> = Vec::with_capacity(values.len() + filter_args.len());
        for (column, value) in values.iter() {
            assignments.push(format!("{column} = ?"));
            args.push(value.clone());
        }

        let mut sql = format!(
            "UPDATE {} SET {}",
            contract::TABLE_CARS,
            assignments.join(", ")
        );
        let (filter, filter_args) = forced_filter(resource, filter, filter_args);
        if let Some(filter) = filter {
            sql.push_str(" WHERE ");
            sql.push_str(&filter);
        }
        args.extend(filter_args);

        let changed = match self.conn.execute(&sql, params_from_iter(args)) {
            Ok(changed) => changed,
            Err(err) => {
                error!("event=store_update module=store status=error error={err}");
                return Err(err.into());
            }
        };

        info!(
            "event=store_update module=store status=ok resource={} rows={changed}",
            resource.uri()
        );
        if changed > 0 {
            self.notifier.notify(&resource);
        }
        Ok(changed)
    }

    /// Deletes rows matching the (possibly forced) filter.
    ///
    /// Collection paths delete every row matching the filter, or all rows
    /// when it is absent. Returns the affected row count; a count above
    /// zero notifies the resource.
    pub fn delete(
        &self,
        path: &str,
        filter: Option<&str>,
        filter_args: &[Value],
    ) -> StoreResult<usize> {
        let resource = self.router.resolve(path)?;

        let mut sql = format!("DELETE FROM {}", contract::TABLE_CARS);
        let (filter, args) = forced_filter(resource, filter, filter_args);
        if let Some(filter) = filter {
            sql.push_str(" WHERE ");
            sql.push_str(&filter);
        }

        let deleted = match self.conn.execute(&sql, params_from_iter(args)) {
            Ok(deleted) => deleted,
            Err(err) => {
                error!("event=store_delete module=store status=error error={err}");
                return Err(err.into());
            }
        };

        info!(
            "event=store_delete module=store status=ok resource={} rows={deleted}",
            resource.uri()
        );
        if deleted > 0 {
            self.notifier.notify(&resource);
        }
        Ok(deleted)
    }
}

/// Resolves the effective filter for a resource: item paths force
/// `_id = ?` regardless of caller input.
fn forced_filter(
    resource: Resource,
    filter: Option<&str>,
    filter_args: &[Value],
) -> (Option<String>, Vec<Value>) {
    match resource {
        Resource::Collection => (filter.map(str::to_string), filter_args.to_vec()),
        Resource::Item(id) => (
            Some(format!("{} = ?", contract::COL_ID)),
            vec![Value::Integer(id)],
        ),
    }
}

/// Renders the SELECT projection, validating requested columns against the
/// contract. Column names become SQL identifiers, so unknown ones are
/// rejected rather than interpolated.
fn projection_sql(columns: Option<&[String]>) -> StoreResult<String> {
    let Some(columns) = columns else {
        return Ok(contract::COLUMNS.join(", "));
    };
    if columns.is_empty() {
        return Ok(contract::COLUMNS.join(", "));
    }
    for column in columns {
        if !contract::COLUMNS.contains(&column.as_str()) {
            return Err(StoreError::InvalidArgument(format!(
                "unknown column `{column}` in projection"
            )));
        }
    }
    Ok(columns.join(", "))
}

/// Rejects field maps naming columns outside the writable contract set.
fn check_writable_columns(values: &FieldMap) -> StoreResult<()> {
    for (column, _) in values.iter() {
        if !contract::WRITABLE_COLUMNS.contains(&column) {
            return Err(StoreError::InvalidArgument(format!(
                "column `{column}` is not writable"
            )));
        }
    }
    Ok(())
}

/// Validates one required field: present, non-null, and for text values
/// non-blank after trimming.
fn check_required_field(values: &FieldMap, column: &str) -> StoreResult<()> {
    match values.get(column) {
        None | Some(Value::Null) => Err(StoreError::InvalidArgument(format!(
            "car {column} is required"
        ))),
        Some(Value::Text(text)) if text.trim().is_empty() => Err(StoreError::InvalidArgument(
            format!("car {column} must not be blank"),
        )),
        Some(_) => Ok(()),
    }
}
