//! Database connection and query execution.

use crate::{DbError, QueryResult, Row, Value};
use serde::de::DeserializeOwned;

/// SQLite database connection.
///
/// Provides typed query execution with automatic result deserialization.
/// Opening is a cheap handle acquisition in the Spin runtime, so handlers
/// open per request rather than pooling.
pub struct Db {
    #[cfg(target_arch = "wasm32")]
    conn: spin_sdk::sqlite::Connection,
    #[cfg(not(target_arch = "wasm32"))]
    _phantom: std::marker::PhantomData<()>,
}

impl Db {
    /// Open the default SQLite database.
    #[cfg(target_arch = "wasm32")]
    pub fn open_default() -> Result<Self, DbError> {
        let conn = spin_sdk::sqlite::Connection::open_default()
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Open a named SQLite database.
    #[cfg(target_arch = "wasm32")]
    pub fn open(name: &str) -> Result<Self, DbError> {
        let conn = spin_sdk::sqlite::Connection::open(name)
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Execute a SQL statement that doesn't return rows.
    ///
    /// Use this for INSERT, UPDATE, DELETE, CREATE TABLE, etc.
    #[cfg(target_arch = "wasm32")]
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<(), DbError> {
        let spin_params: Vec<spin_sdk::sqlite::Value> =
            params.iter().map(Value::to_spin).collect();

        self.conn
            .execute(sql, spin_params.as_slice())
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(())
    }

    /// Execute a SQL query and return raw results.
    #[cfg(target_arch = "wasm32")]
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        let spin_params: Vec<spin_sdk::sqlite::Value> =
            params.iter().map(Value::to_spin).collect();

        let result = self
            .conn
            .execute(sql, spin_params.as_slice())
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        let columns: Vec<String> = result.columns.iter().map(|c| c.to_string()).collect();

        let rows: Vec<Row> = result
            .rows
            .iter()
            .map(|row| {
                let values: Vec<Value> = row.values.iter().map(Value::from_spin).collect();
                Row::new(columns.clone(), values)
            })
            .collect();

        Ok(QueryResult::new(columns, rows))
    }

    /// Execute a SQL query and deserialize all rows into a vector.
    #[cfg(target_arch = "wasm32")]
    pub fn query_as<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<T>, DbError> {
        let result = self.query(sql, params)?;
        result.deserialize_all()
    }

    /// Execute a SQL query and return a single row.
    ///
    /// Returns `DbError::NotFound` if no rows are returned.
    #[cfg(target_arch = "wasm32")]
    pub fn query_one<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<T, DbError> {
        let result = self.query(sql, params)?;
        result.first().ok_or(DbError::NotFound)?.deserialize()
    }

    /// Execute a SQL query and return an optional single row.
    #[cfg(target_arch = "wasm32")]
    pub fn query_optional<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<T>, DbError> {
        let result = self.query(sql, params)?;
        match result.first() {
            Some(row) => Ok(Some(row.deserialize()?)),
            None => Ok(None),
        }
    }

    // Non-WASM stubs for development/testing
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_default() -> Result<Self, DbError> {
        Ok(Self {
            _phantom: std::marker::PhantomData,
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn open(_name: &str) -> Result<Self, DbError> {
        Ok(Self {
            _phantom: std::marker::PhantomData,
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn execute(&self, _sql: &str, _params: &[Value]) -> Result<(), DbError> {
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn query(&self, _sql: &str, _params: &[Value]) -> Result<QueryResult, DbError> {
        Ok(QueryResult::new(vec![], vec![]))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn query_as<T: DeserializeOwned>(
        &self,
        _sql: &str,
        _params: &[Value],
    ) -> Result<Vec<T>, DbError> {
        Ok(vec![])
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn query_one<T: DeserializeOwned>(
        &self,
        _sql: &str,
        _params: &[Value],
    ) -> Result<T, DbError> {
        Err(DbError::NotFound)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn query_optional<T: DeserializeOwned>(
        &self,
        _sql: &str,
        _params: &[Value],
    ) -> Result<Option<T>, DbError> {
        Ok(None)
    }

    /// Run a closure inside an explicit transaction.
    ///
    /// Issues `BEGIN IMMEDIATE` before the closure and `COMMIT` after it;
    /// any error rolls back. Multi-statement writes (order header plus its
    /// items) must go through this so a failure cannot leave a partial
    /// record behind.
    pub fn transaction<T, F>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Self) -> Result<T, DbError>,
    {
        self.execute("BEGIN IMMEDIATE", &[])?;
        match f(self) {
            Ok(value) => {
                self.execute("COMMIT", &[])?;
                Ok(value)
            }
            Err(e) => {
                // Best-effort rollback; the original error is what matters.
                let _ = self.execute("ROLLBACK", &[]);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_returns_closure_value() {
        let db = Db::open_default().unwrap();
        let n = db.transaction(|_tx| Ok(7)).unwrap();
        assert_eq!(n, 7);
    }

    #[test]
    fn transaction_propagates_closure_error() {
        let db = Db::open_default().unwrap();
        let result: Result<(), DbError> = db.transaction(|_tx| Err(DbError::NotFound));
        assert!(matches!(result, Err(DbError::NotFound)));
    }
}
