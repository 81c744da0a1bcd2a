use crate::SqlWriter;

/// Sort direction of an `ORDER BY` term.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

/// Builder for a `SELECT` over a single table.
///
/// Fields, extra columns and the order column are written as quoted
/// identifiers when they are plain (optionally dotted) names, anything else
/// is treated as an expression and written verbatim. Predicates are always
/// written verbatim.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Select {
    pub table: String,
    /// Selected fields, empty means every column.
    pub fields: Vec<String>,
    /// Additional select expressions appended after `fields`.
    pub columns: Vec<String>,
    /// Predicates, joined with `AND`.
    pub condition: Vec<String>,
    pub order: Vec<(String, Order)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Select {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from<I, S>(mut self, table: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table = table.into();
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, predicate: impl Into<String>) -> Self {
        let predicate = predicate.into();
        if !predicate.trim().is_empty() {
            self.condition.push(predicate);
        }
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order.push((column.into(), order));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Restricts the result to the 1-based `page` of `size` rows.
    ///
    /// Limit and offset are capped at `i64::MAX`, the largest integer literal
    /// a store accepts. Pages past it come back empty.
    pub fn limit_page(mut self, page: u64, size: u64) -> Self {
        const MAX: u64 = i64::MAX as u64;
        let page = page.max(1);
        let size = size.clamp(1, MAX);
        self.limit = Some(size);
        self.offset = Some((page - 1).saturating_mul(size).min(MAX));
        self
    }

    pub fn write_query(&self, writer: &dyn SqlWriter, out: &mut String) {
        writer.write_select(out, self);
    }
}
