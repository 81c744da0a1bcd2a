use crate::{Driver, Result, Row, Rows, RowsAffected, Select, SqlWriter, Value};
use std::collections::{HashMap, hash_map::Entry};

/// Blocking access to a relational store.
///
/// Implementors provide statement execution, row fetching and the table
/// existence check, everything else is composed on top of them with the
/// driver's [`SqlWriter`]. Every call is a full round trip that returns only
/// once the store answered.
pub trait Connection {
    type Driver: Driver;

    fn driver(&self) -> &Self::Driver;

    /// Run one or more statements, returning the total number of rows affected.
    fn execute(&mut self, sql: &str) -> Result<RowsAffected>;

    /// Run a query and collect every row it produces.
    fn fetch(&mut self, sql: &str) -> Result<Vec<Row>>;

    fn table_exists(&mut self, table: &str) -> Result<bool>;

    fn select(&self) -> Select {
        Select::new()
    }

    fn insert_many(&mut self, table: &str, columns: &[String], rows: &Rows) -> Result<RowsAffected> {
        if rows.is_empty() || columns.is_empty() {
            return Ok(RowsAffected::default());
        }
        let mut sql = String::with_capacity(128 * rows.len());
        self.driver()
            .sql_writer()
            .write_insert(&mut sql, table, columns, rows);
        self.execute(&sql)
    }

    fn delete_where(&mut self, table: &str, predicate: &str) -> Result<RowsAffected> {
        let mut sql = String::with_capacity(64 + predicate.len());
        self.driver()
            .sql_writer()
            .write_delete(&mut sql, table, predicate);
        self.execute(&sql)
    }

    fn update_where(&mut self, table: &str, bind: &Row, predicate: &str) -> Result<RowsAffected> {
        let mut sql = String::with_capacity(128 + predicate.len());
        self.driver()
            .sql_writer()
            .write_update(&mut sql, table, bind, predicate);
        self.execute(&sql)
    }

    fn truncate(&mut self, table: &str) -> Result<()> {
        let mut sql = String::with_capacity(64);
        self.driver().sql_writer().write_truncate(&mut sql, table);
        self.execute(&sql).map(|_| ())
    }

    /// Suspend foreign key enforcement until [`Connection::end_schema_change`].
    fn begin_schema_change(&mut self) -> Result<()> {
        let mut sql = String::new();
        self.driver()
            .sql_writer()
            .write_schema_change_begin(&mut sql);
        self.execute(&sql).map(|_| ())
    }

    /// Restore the foreign key enforcement saved by [`Connection::begin_schema_change`].
    fn end_schema_change(&mut self) -> Result<()> {
        let mut sql = String::new();
        self.driver()
            .sql_writer()
            .write_schema_change_end(&mut sql);
        self.execute(&sql).map(|_| ())
    }

    fn fetch_all(&mut self, select: &Select) -> Result<Vec<Row>> {
        let mut sql = String::with_capacity(256);
        self.driver().sql_writer().write_select(&mut sql, select);
        self.fetch(&sql)
    }

    /// First row of the result, or an empty row when nothing matched.
    fn fetch_row(&mut self, select: &Select) -> Result<Row> {
        let rows = if select.limit.is_none() {
            self.fetch_all(&select.clone().limit(1))?
        } else {
            self.fetch_all(select)?
        };
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    /// First column of the first row, or [`Value::Null`] when nothing matched.
    fn fetch_scalar(&mut self, select: &Select) -> Result<Value> {
        let row = self.fetch_row(select)?;
        Ok(row.values.into_vec().into_iter().next().unwrap_or_default())
    }

    /// First column of every row.
    fn fetch_column(&mut self, select: &Select) -> Result<Vec<Value>> {
        Ok(self
            .fetch_all(select)?
            .into_iter()
            .map(|row| row.values.into_vec().into_iter().next().unwrap_or_default())
            .collect())
    }

    /// Rows keyed by the text of their first column, in result order.
    ///
    /// A later row with the same key replaces the earlier one in place.
    fn fetch_assoc(&mut self, select: &Select) -> Result<Vec<(String, Row)>> {
        let rows = self.fetch_all(select)?;
        let mut result: Vec<(String, Row)> = Vec::with_capacity(rows.len());
        let mut index = HashMap::<String, usize>::with_capacity(rows.len());
        for row in rows {
            let key = row.values().first().map(Value::to_string).unwrap_or_default();
            match index.entry(key) {
                Entry::Occupied(entry) => result[*entry.get()].1 = row,
                Entry::Vacant(entry) => {
                    result.push((entry.key().clone(), row));
                    entry.insert(result.len() - 1);
                }
            }
        }
        Ok(result)
    }
}

impl<C: Connection> Connection for &mut C {
    type Driver = C::Driver;

    fn driver(&self) -> &Self::Driver {
        (**self).driver()
    }
    fn execute(&mut self, sql: &str) -> Result<RowsAffected> {
        (**self).execute(sql)
    }
    fn fetch(&mut self, sql: &str) -> Result<Vec<Row>> {
        (**self).fetch(sql)
    }
    fn table_exists(&mut self, table: &str) -> Result<bool> {
        (**self).table_exists(table)
    }
    fn select(&self) -> Select {
        (**self).select()
    }
    fn insert_many(&mut self, table: &str, columns: &[String], rows: &Rows) -> Result<RowsAffected> {
        (**self).insert_many(table, columns, rows)
    }
    fn delete_where(&mut self, table: &str, predicate: &str) -> Result<RowsAffected> {
        (**self).delete_where(table, predicate)
    }
    fn update_where(&mut self, table: &str, bind: &Row, predicate: &str) -> Result<RowsAffected> {
        (**self).update_where(table, bind, predicate)
    }
    fn truncate(&mut self, table: &str) -> Result<()> {
        (**self).truncate(table)
    }
    fn begin_schema_change(&mut self) -> Result<()> {
        (**self).begin_schema_change()
    }
    fn end_schema_change(&mut self) -> Result<()> {
        (**self).end_schema_change()
    }
    fn fetch_all(&mut self, select: &Select) -> Result<Vec<Row>> {
        (**self).fetch_all(select)
    }
    fn fetch_row(&mut self, select: &Select) -> Result<Row> {
        (**self).fetch_row(select)
    }
    fn fetch_scalar(&mut self, select: &Select) -> Result<Value> {
        (**self).fetch_scalar(select)
    }
    fn fetch_column(&mut self, select: &Select) -> Result<Vec<Value>> {
        (**self).fetch_column(select)
    }
    fn fetch_assoc(&mut self, select: &Select) -> Result<Vec<(String, Row)>> {
        (**self).fetch_assoc(select)
    }
}
