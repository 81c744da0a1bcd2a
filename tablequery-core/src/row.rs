use crate::{AsValue, Error, Result, Value};
use std::{slice, sync::Arc, vec};

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;

/// A row with its column labels.
///
/// Labels and values are aligned by index and keep the order the store
/// returned them in. Rows fetched by the same query share their labels.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Row {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Box<[Value]>,
}

impl Row {
    pub fn new(labels: RowNames, values: Box<[Value]>) -> Self {
        debug_assert_eq!(labels.len(), values.len());
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    /// An empty row is what the fetch operations return when nothing matched.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn contains(&self, name: &str) -> bool {
        self.labels.iter().any(|v| v == name)
    }
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values[i])
    }
    /// Converts the value of the column `name`.
    pub fn try_get<T: AsValue>(&self, name: &str) -> Result<T> {
        let value = self
            .get(name)
            .ok_or_else(|| Error::msg(format!("Column `{}` is not present in the row", name)))?;
        T::try_from_value(value.clone())
    }
    /// Sets the column, appending it when not already present.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.labels.iter().position(|v| *v == name) {
            Some(i) => self.values[i] = value,
            None => {
                let mut labels = self.labels.to_vec();
                labels.push(name);
                self.labels = labels.into();
                let mut values = std::mem::take(&mut self.values).into_vec();
                values.push(value);
                self.values = values.into_boxed_slice();
            }
        }
        self
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let (labels, values): (Vec<String>, Vec<Value>) = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            labels: labels.into(),
            values: values.into_boxed_slice(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Row {
    fn from(value: [(K, V); N]) -> Self {
        value.into_iter().collect()
    }
}

/// One or more rows handed to an insert.
///
/// A single [`Row`] converts into a one element sequence, so `put(row)` and
/// `put(vec![row])` are the same call.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Rows(pub Vec<Row>);

impl Rows {
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn first(&self) -> Option<&Row> {
        self.0.first()
    }
    pub fn iter(&self) -> slice::Iter<'_, Row> {
        self.0.iter()
    }
}

impl From<Row> for Rows {
    fn from(value: Row) -> Self {
        Rows(vec![value])
    }
}

impl From<Vec<Row>> for Rows {
    fn from(value: Vec<Row>) -> Self {
        Rows(value)
    }
}

impl From<&[Row]> for Rows {
    fn from(value: &[Row]) -> Self {
        Rows(value.to_vec())
    }
}

impl<const N: usize> From<[Row; N]> for Rows {
    fn from(value: [Row; N]) -> Self {
        Rows(value.into())
    }
}

impl FromIterator<Row> for Rows {
    fn from_iter<T: IntoIterator<Item = Row>>(iter: T) -> Self {
        Rows(iter.into_iter().collect())
    }
}

impl IntoIterator for Rows {
    type Item = Row;
    type IntoIter = vec::IntoIter<Row>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Rows {
    type Item = &'a Row;
    type IntoIter = slice::Iter<'a, Row>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted identifier when available.
    pub last_affected_id: Option<i64>,
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            if elem.last_affected_id.is_some() {
                self.last_affected_id = elem.last_affected_id;
            }
        }
    }
}
