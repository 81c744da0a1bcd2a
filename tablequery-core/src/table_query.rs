use crate::{
    Connection, Error, Order, PagedRowIterator, Result, Row, Rows, RowsAffected, Select,
    TableQueryError, Value,
};

/// Query and mutation access to a single table.
///
/// The connection is taken as given and never opened or closed here. Passing
/// `&mut connection` keeps ownership with the caller:
///
/// ```rust,ignore
/// let mut query = TableQuery::new(&mut connection, "jobs", "id")?;
/// query.put(Row::from([("id", 1), ("attempts", 0)]), &[])?;
/// let job = query.poll()?;
/// ```
pub struct TableQuery<C: Connection> {
    connection: C,
    table: String,
    primary_key: String,
}

impl<C: Connection> TableQuery<C> {
    /// Bind to `table`, failing with [`TableQueryError::TableNotFound`] if the
    /// store does not have it.
    pub fn new(
        mut connection: C,
        table: impl Into<String>,
        primary_key: impl Into<String>,
    ) -> Result<Self> {
        let table = table.into();
        if !connection.table_exists(&table)? {
            let error = Error::new(TableQueryError::TableNotFound { table });
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(Self {
            connection,
            table,
            primary_key: primary_key.into(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn connection(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn into_connection(self) -> C {
        self.connection
    }

    /// Insert one or more rows.
    ///
    /// When `columns` is empty the column list comes from the first row. A
    /// first row without columns inserts nothing.
    pub fn put(&mut self, rows: impl Into<Rows>, columns: &[&str]) -> Result<RowsAffected> {
        let rows = rows.into();
        let Some(first) = rows.first() else {
            log::warn!("Nothing to insert into `{}`", self.table);
            return Ok(RowsAffected::default());
        };
        let columns: Vec<String> = if columns.is_empty() {
            first.names().to_vec()
        } else {
            columns.iter().map(|v| v.to_string()).collect()
        };
        if columns.is_empty() {
            log::warn!(
                "Nothing inserted into `{}`: the first of {} rows has no columns",
                self.table,
                rows.len()
            );
            return Ok(RowsAffected::default());
        }
        self.connection.insert_many(&self.table, &columns, &rows)
    }

    /// Delete every row matching `condition`, no match is not an error.
    pub fn delete(&mut self, condition: &str) -> Result<RowsAffected> {
        self.connection.delete_where(&self.table, condition)
    }

    /// Value of `field` in the first matching row, [`Value::Null`] if none.
    pub fn fetch_one(&mut self, field: &str, condition: &str) -> Result<Value> {
        let select = self
            .connection
            .select()
            .from(&self.table, [field])
            .filter(condition);
        self.connection.fetch_scalar(&select)
    }

    /// First matching row, empty if none matched. Empty `fields` selects every column.
    pub fn fetch_row(&mut self, condition: &str, fields: &[&str]) -> Result<Row> {
        let select = self
            .connection
            .select()
            .from(&self.table, fields.iter().copied())
            .filter(condition);
        self.connection.fetch_row(&select)
    }

    /// Matching rows keyed by their first column.
    pub fn fetch_assoc(
        &mut self,
        condition: Option<&str>,
        fields: &[&str],
        page: u64,
        row_count: u64,
        columns: &[&str],
    ) -> Result<Vec<(String, Row)>> {
        let select = self.prepare_select(condition, fields, page, row_count, columns);
        self.connection.fetch_assoc(&select)
    }

    /// Matching rows in result order.
    ///
    /// Pagination is applied only when both `page` (1-based) and `row_count`
    /// are positive, otherwise the full result is returned.
    pub fn fetch_all(
        &mut self,
        condition: Option<&str>,
        fields: &[&str],
        page: u64,
        row_count: u64,
        columns: &[&str],
    ) -> Result<Vec<Row>> {
        let select = self.prepare_select(condition, fields, page, row_count, columns);
        self.connection.fetch_all(&select)
    }

    /// First column of the matching rows.
    pub fn fetch_col(
        &mut self,
        condition: Option<&str>,
        fields: &[&str],
        page: u64,
        row_count: u64,
        columns: &[&str],
    ) -> Result<Vec<Value>> {
        let select = self.prepare_select(condition, fields, page, row_count, columns);
        self.connection.fetch_column(&select)
    }

    /// Fetch the first matching row and delete it.
    pub fn pull(&mut self, condition: &str, fields: &[&str]) -> Result<Row> {
        let row = self.fetch_row(condition, fields)?;
        self.remove(row)
    }

    /// Remove and return the row with the lowest primary key.
    pub fn poll(&mut self) -> Result<Row> {
        let row = self.fetch_edge(Order::Asc)?;
        self.remove(row)
    }

    /// Remove and return the row with the highest primary key.
    pub fn pop(&mut self) -> Result<Row> {
        let row = self.fetch_edge(Order::Desc)?;
        self.remove(row)
    }

    /// Empty the table.
    ///
    /// With `disable_foreign_key_check` the truncation runs with foreign key
    /// enforcement suspended, which is restored even if truncation fails.
    pub fn purge(&mut self, disable_foreign_key_check: bool) -> Result<()> {
        if !disable_foreign_key_check {
            return self.connection.truncate(&self.table);
        }
        self.connection.begin_schema_change()?;
        let result = self.connection.truncate(&self.table);
        let restored = self.connection.end_schema_change();
        if let (Err(truncate), Err(restore)) = (&result, &restored) {
            log::error!(
                "Could not restore foreign key checks after the failed truncation of `{}`: {:#}\nTruncation error: {:#}",
                self.table,
                restore,
                truncate,
            );
        }
        result.and(restored)
    }

    /// Apply `bind` to every row matching `condition` (all rows when empty).
    pub fn update(&mut self, bind: &Row, condition: &str) -> Result<RowsAffected> {
        if bind.is_empty() {
            log::warn!("Nothing to update in `{}`", self.table);
            return Ok(RowsAffected::default());
        }
        self.connection.update_where(&self.table, bind, condition)
    }

    /// Lazy paged iterator over every row, refilled 20 rows at a time.
    pub fn iterator(&mut self) -> Result<PagedRowIterator<'_, C>> {
        PagedRowIterator::new(self)
    }

    fn fetch_edge(&mut self, order: Order) -> Result<Row> {
        let select = self
            .connection
            .select()
            .from(&self.table, [] as [&str; 0])
            .order_by(format!("{}.{}", self.table, self.primary_key), order)
            .limit(1);
        self.connection.fetch_row(&select)
    }

    /// Delete a fetched row through its primary key and give it back.
    fn remove(&mut self, row: Row) -> Result<Row> {
        let id = match row.get(&self.primary_key) {
            Some(value) if !value.is_null() => value.to_integer().ok_or_else(|| {
                Error::new(TableQueryError::NonNumericPrimaryKey {
                    table: self.table.clone(),
                    primary_key: self.primary_key.clone(),
                    value: value.to_string(),
                })
            })?,
            _ => {
                return Err(Error::new(TableQueryError::PrimaryKeyMissing {
                    table: self.table.clone(),
                    primary_key: self.primary_key.clone(),
                }));
            }
        };
        self.delete(&format!("{} = {}", self.primary_key, id))?;
        Ok(row)
    }

    fn prepare_select(
        &self,
        condition: Option<&str>,
        fields: &[&str],
        page: u64,
        row_count: u64,
        columns: &[&str],
    ) -> Select {
        let mut select = self
            .connection
            .select()
            .from(&self.table, fields.iter().copied())
            .columns(columns.iter().copied());
        if let Some(condition) = condition {
            select = select.filter(condition);
        }
        if page > 0 && row_count > 0 {
            select = select.limit_page(page, row_count);
        }
        select
    }
}
