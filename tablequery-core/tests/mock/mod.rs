#![allow(dead_code)]

use tablequery_core::{
    Connection, Driver, Error, GenericSqlWriter, Result, Row, RowsAffected, Value,
};

pub struct MockDriver;

impl Driver for MockDriver {
    type Connection = MockConnection;
    type SqlWriter = GenericSqlWriter;

    const NAME: &'static str = "mock";

    fn sql_writer(&self) -> GenericSqlWriter {
        GenericSqlWriter::new()
    }

    fn connect(&self, _url: &str) -> Result<MockConnection> {
        Ok(MockConnection::default())
    }
}

/// Records every statement and serves a fixed set of rows.
///
/// Queries honor the projection, `DESC` ordering and `LIMIT`/`OFFSET` of the
/// generated SQL, predicates are ignored.
#[derive(Default)]
pub struct MockConnection {
    pub tables: Vec<String>,
    pub rows: Vec<Row>,
    pub statements: Vec<String>,
    pub fetches: usize,
    /// Statements starting with one of these fail.
    pub failing: Vec<&'static str>,
    /// Queries fail once this many were served.
    pub max_fetches: Option<usize>,
    /// Rows added to the table once this many queries were served.
    pub late_rows: Option<(usize, Vec<Row>)>,
}

impl MockConnection {
    pub fn with_table(table: &str) -> Self {
        Self {
            tables: vec![table.into()],
            ..Default::default()
        }
    }

    pub fn with_rows(table: &str, count: i64) -> Self {
        let mut result = Self::with_table(table);
        result.rows = (1..=count)
            .map(|i| {
                Row::from_iter([
                    ("id", Value::Int64(Some(i))),
                    ("name", Value::Varchar(Some(format!("row {i}")))),
                ])
            })
            .collect();
        result
    }

    /// Statements that are not queries.
    pub fn executed(&self) -> Vec<&str> {
        self.statements
            .iter()
            .map(String::as_str)
            .filter(|v| !v.starts_with("SELECT"))
            .collect()
    }

    fn check(&mut self, sql: &str) -> Result<()> {
        self.statements.push(sql.to_owned());
        if let Some(prefix) = self.failing.iter().find(|v| sql.starts_with(**v)) {
            return Err(Error::msg(format!("Mock failure on `{prefix}`")));
        }
        Ok(())
    }
}

fn number_after(sql: &str, keyword: &str) -> Option<usize> {
    let start = sql.find(keyword)? + keyword.len();
    sql[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .ok()
}

impl Connection for MockConnection {
    type Driver = MockDriver;

    fn driver(&self) -> &MockDriver {
        &MockDriver
    }

    fn execute(&mut self, sql: &str) -> Result<RowsAffected> {
        self.check(sql)?;
        Ok(RowsAffected {
            rows_affected: 1,
            last_affected_id: None,
        })
    }

    fn fetch(&mut self, sql: &str) -> Result<Vec<Row>> {
        self.check(sql)?;
        if self.max_fetches.is_some_and(|v| self.fetches >= v) {
            return Err(Error::msg("Mock connection lost"));
        }
        if self.late_rows.as_ref().is_some_and(|(after, _)| self.fetches >= *after) {
            if let Some((_, late)) = self.late_rows.take() {
                self.rows.extend(late);
            }
        }
        self.fetches += 1;
        let mut rows = self.rows.clone();
        if sql.contains(" DESC") {
            rows.reverse();
        }
        let offset = number_after(sql, " OFFSET ").unwrap_or(0);
        let limit = number_after(sql, "\nLIMIT ").unwrap_or(usize::MAX);
        let fields = &sql["SELECT ".len()..sql.find("\nFROM").unwrap_or(sql.len())];
        let fields = fields
            .split(", ")
            .map(|v| v.trim_matches('`').to_owned())
            .collect::<Vec<_>>();
        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| {
                if fields.iter().any(|v| v == "*") {
                    row
                } else {
                    fields
                        .iter()
                        .filter_map(|v| row.get(v).map(|value| (v.clone(), value.clone())))
                        .collect()
                }
            })
            .collect())
    }

    fn table_exists(&mut self, table: &str) -> Result<bool> {
        Ok(self.tables.iter().any(|v| v == table))
    }
}
