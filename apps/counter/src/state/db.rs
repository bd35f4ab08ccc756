//! # Database State
//!
//! Wraps the `Database` handle for use in commands. The pool inside is
//! shared, so commands run queries without extra locking.

use sari_db::Database;

#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let products = db_state.inner().inventory().search("rice").await?;
    /// ```
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
