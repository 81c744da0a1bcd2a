use crate::{
    CBox, SqliteDriver, error_message_from_ptr,
    extract::{extract_name, extract_value},
};
use libsqlite3_sys::{
    SQLITE_DONE, SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_READWRITE, SQLITE_OPEN_URI,
    SQLITE_ROW, sqlite3, sqlite3_busy_timeout, sqlite3_close, sqlite3_column_count,
    sqlite3_errmsg, sqlite3_finalize, sqlite3_last_insert_rowid, sqlite3_open_v2,
    sqlite3_prepare_v2, sqlite3_step, sqlite3_stmt, sqlite3_total_changes64,
};
use std::{
    ffi::{CStr, CString, c_char},
    ptr,
};
use tablequery_core::{
    Connection, Context, Driver, Error, Result, Row, RowNames, RowsAffected, SqlWriter, Value,
    truncate_long,
};

/// Milliseconds a statement waits on a locked database before failing.
pub const BUSY_TIMEOUT: i32 = 5_000;

/// Blocking connection to a sqlite database.
///
/// Closed when dropped.
pub struct SqliteConnection {
    pub(crate) connection: CBox<sqlite3>,
    /// Foreign key enforcement in place before `begin_schema_change`.
    pub(crate) foreign_keys: Option<bool>,
}

impl SqliteConnection {
    /// Open a database from a url `sqlite://<path or :memory:>[?<uri parameters>]`.
    ///
    /// A url with parameters is handed to sqlite as a `file:` uri, otherwise
    /// the percent encoded path is decoded first.
    pub fn connect(url: &str) -> Result<SqliteConnection> {
        let prefix = format!("{}://", SqliteDriver::NAME);
        let Some(location) = url.strip_prefix(&prefix) else {
            let error = Error::msg(format!(
                "Expected sqlite connection url to start with `{}`",
                &prefix
            ));
            log::error!("{:#}", error);
            return Err(error);
        };
        let context = || format!("Error while decoding connection URL: `{}`", url);
        let location = if location.contains('?') {
            format!("file:{}", location)
        } else {
            urlencoding::decode(location)
                .with_context(context)?
                .into_owned()
        };
        let location = CString::new(location).with_context(context)?;
        let mut connection = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_close(p);
        });
        let rc = unsafe {
            sqlite3_open_v2(
                location.as_ptr(),
                &mut *connection,
                SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE | SQLITE_OPEN_URI,
                ptr::null(),
            )
        };
        if rc != SQLITE_OK {
            let error = Error::msg(error_message_from_ptr(unsafe { sqlite3_errmsg(*connection) }))
                .context(format!("Could not open the sqlite database `{}`", url));
            log::error!("{:#}", error);
            return Err(error);
        }
        unsafe {
            sqlite3_busy_timeout(*connection, BUSY_TIMEOUT);
        }
        log::debug!("Connected to `{}`", url);
        Ok(Self {
            connection,
            foreign_keys: None,
        })
    }

    /// Run every statement in `sql`, in order, collecting the rows they produce.
    pub(crate) fn run(&mut self, sql: &str) -> Result<(Vec<Row>, RowsAffected)> {
        log::debug!("Running on sqlite:\n{}", truncate_long(sql));
        let context = || format!("While executing the query:\n{}", truncate_long(sql));
        let sql = CString::new(sql).with_context(context)?;
        let mut rows = Vec::new();
        let mut affected = RowsAffected::default();
        let mut tail: *const c_char = sql.as_ptr();
        while !unsafe { CStr::from_ptr(tail) }
            .to_bytes()
            .iter()
            .all(u8::is_ascii_whitespace)
        {
            let mut statement = CBox::new(ptr::null_mut(), |p| unsafe {
                sqlite3_finalize(p);
            });
            let mut next = ptr::null();
            let rc = unsafe {
                sqlite3_prepare_v2(*self.connection, tail, -1, &mut *statement, &mut next)
            };
            if rc != SQLITE_OK {
                let error = self.last_error().context(context());
                log::error!("{:#}", error);
                return Err(error);
            }
            tail = next;
            if statement.is_null() {
                // Comment only
                continue;
            }
            let result = self.run_prepared(&statement).map(|(fetched, count)| {
                rows.extend(fetched);
                affected.extend([count]);
            });
            if let Err(error) = result {
                let error = error.context(context());
                log::error!("{:#}", error);
                return Err(error);
            }
        }
        Ok((rows, affected))
    }

    fn run_prepared(
        &mut self,
        statement: &CBox<sqlite3_stmt>,
    ) -> Result<(Vec<Row>, RowsAffected)> {
        let statement = **statement;
        let (changes, last_id) = self.counters();
        let count = unsafe { sqlite3_column_count(statement) };
        let labels = (0..count)
            .map(|i| extract_name(statement, i))
            .collect::<Result<RowNames>>()?;
        let mut rows = Vec::new();
        loop {
            match unsafe { sqlite3_step(statement) } {
                SQLITE_DONE => break,
                SQLITE_ROW => rows.push(Row::new(
                    labels.clone(),
                    (0..count)
                        .map(|i| extract_value(statement, i))
                        .collect::<Result<_>>()?,
                )),
                _ => return Err(self.last_error()),
            }
        }
        let (total_changes, total_last_id) = self.counters();
        Ok((
            rows,
            RowsAffected {
                rows_affected: (total_changes - changes).max(0) as u64,
                last_affected_id: (total_last_id != last_id).then_some(total_last_id),
            },
        ))
    }

    fn counters(&self) -> (i64, i64) {
        unsafe {
            (
                sqlite3_total_changes64(*self.connection),
                sqlite3_last_insert_rowid(*self.connection),
            )
        }
    }

    fn last_error(&self) -> Error {
        Error::msg(error_message_from_ptr(unsafe {
            sqlite3_errmsg(*self.connection)
        }))
    }
}

impl Connection for SqliteConnection {
    type Driver = SqliteDriver;

    fn driver(&self) -> &SqliteDriver {
        &SqliteDriver {}
    }

    fn execute(&mut self, sql: &str) -> Result<RowsAffected> {
        self.run(sql).map(|(_, affected)| affected)
    }

    fn fetch(&mut self, sql: &str) -> Result<Vec<Row>> {
        self.run(sql).map(|(rows, _)| rows)
    }

    fn table_exists(&mut self, table: &str) -> Result<bool> {
        let mut sql =
            String::from("SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ");
        self.driver().sql_writer().write_value_string(&mut sql, table);
        sql.push(';');
        Ok(!self.fetch(&sql)?.is_empty())
    }

    /// Turns enforcement off, remembering whether it was on.
    ///
    /// Sqlite ignores the pragma inside a transaction.
    fn begin_schema_change(&mut self) -> Result<()> {
        let enabled = self
            .fetch("PRAGMA foreign_keys;")?
            .first()
            .and_then(|row| row.values().first())
            .and_then(Value::to_integer)
            .is_some_and(|v| v != 0);
        let mut sql = String::new();
        self.driver()
            .sql_writer()
            .write_schema_change_begin(&mut sql);
        self.execute(&sql)?;
        self.foreign_keys = Some(enabled);
        Ok(())
    }

    fn end_schema_change(&mut self) -> Result<()> {
        if self.foreign_keys.take() != Some(true) {
            return Ok(());
        }
        let mut sql = String::new();
        self.driver().sql_writer().write_schema_change_end(&mut sql);
        self.execute(&sql).map(|_| ())
    }
}
