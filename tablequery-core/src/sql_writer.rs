use crate::{Order, Row, Rows, Select, Value, separated_by};
use std::fmt::Write;

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}

/// Renders the statements a [`Connection`](crate::Connection) sends to the
/// store.
///
/// The provided methods write MySQL. Drivers override the pieces where their
/// dialect differs.
pub trait SqlWriter {
    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(out, value, '`', "``");
        out.push('`');
    }

    /// Writes a name, quoting each dotted part, or an expression verbatim.
    fn write_field(&self, out: &mut String, value: &str) {
        let is_identifier = !value.is_empty()
            && value.split('.').all(|part| {
                !part.is_empty()
                    && !part.starts_with(|c: char| c.is_ascii_digit())
                    && part.chars().all(|c| c.is_alphanumeric() || c == '_')
            });
        if is_identifier {
            separated_by(
                out,
                value.split('.'),
                |out, part| self.write_identifier_quoted(out, part),
                ".",
            );
        } else {
            out.push_str(value);
        }
    }

    fn write_table_ref(&self, out: &mut String, table: &str) {
        self.write_field(out, table);
    }

    fn write_value(&self, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(out),
            Value::Boolean(Some(v)) => self.write_value_bool(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::Float64(Some(v)) => self.write_value_float(out, *v),
            Value::Varchar(Some(v)) => self.write_value_string(out, v),
            Value::Blob(Some(v)) => self.write_value_blob(out, v),
            _ => unreachable!(),
        }
    }

    fn write_value_none(&self, out: &mut String) {
        out.push_str("NULL")
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize])
    }

    fn write_value_float(&self, out: &mut String, value: f64) {
        if value.is_nan() {
            self.write_value_none(out);
        } else if value.is_infinite() {
            self.write_value_infinity(out, value.is_sign_negative());
        } else {
            let mut buffer = ryu::Buffer::new();
            out.push_str(buffer.format_finite(value));
        }
    }

    /// MySQL doubles are finite, infinity is written as NULL like NaN.
    fn write_value_infinity(&self, out: &mut String, _negative: bool) {
        self.write_value_none(out);
    }

    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(out, value, '\'', "''");
        out.push('\'');
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        for b in value {
            let _ = write!(out, "{:02X}", b);
        }
        out.push('\'');
    }

    fn write_order(&self, out: &mut String, order: Order) {
        out.push_str(match order {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        });
    }

    fn write_select(&self, out: &mut String, select: &Select) {
        out.push_str("SELECT ");
        let mut fields = select
            .fields
            .iter()
            .chain(select.columns.iter())
            .map(String::as_str)
            .peekable();
        if select.fields.is_empty() {
            out.push('*');
            if fields.peek().is_some() {
                out.push_str(", ");
            }
        }
        separated_by(out, fields, |out, v| self.write_field(out, v), ", ");
        out.push_str("\nFROM ");
        self.write_table_ref(out, &select.table);
        if !select.condition.is_empty() {
            out.push_str("\nWHERE ");
            let parenthesized = select.condition.len() > 1;
            separated_by(
                out,
                select.condition.iter(),
                |out, v| {
                    if parenthesized {
                        out.push('(');
                        out.push_str(v);
                        out.push(')');
                    } else {
                        out.push_str(v);
                    }
                },
                " AND ",
            );
        }
        if !select.order.is_empty() {
            out.push_str("\nORDER BY ");
            separated_by(
                out,
                select.order.iter(),
                |out, (column, order)| {
                    self.write_field(out, column);
                    out.push(' ');
                    self.write_order(out, *order);
                },
                ", ",
            );
        }
        if let Some(limit) = select.limit {
            out.push_str("\nLIMIT ");
            write_integer!(out, limit);
        }
        if let Some(offset) = select.offset.filter(|v| *v > 0) {
            out.push_str(" OFFSET ");
            write_integer!(out, offset);
        }
        out.push(';');
    }

    /// Multi row insert, columns missing from a row are written as NULL.
    fn write_insert(&self, out: &mut String, table: &str, columns: &[String], rows: &Rows) {
        out.push_str("INSERT INTO ");
        self.write_table_ref(out, table);
        out.push_str(" (");
        separated_by(
            out,
            columns.iter(),
            |out, v| self.write_identifier_quoted(out, v),
            ", ",
        );
        out.push_str(")\nVALUES\n");
        separated_by(
            out,
            rows.iter(),
            |out, row| {
                out.push('(');
                separated_by(
                    out,
                    columns.iter(),
                    |out, column| match row.get(column) {
                        Some(value) => self.write_value(out, value),
                        None => self.write_value_none(out),
                    },
                    ", ",
                );
                out.push(')');
            },
            ",\n",
        );
        out.push(';');
    }

    fn write_delete(&self, out: &mut String, table: &str, predicate: &str) {
        out.push_str("DELETE FROM ");
        self.write_table_ref(out, table);
        if !predicate.trim().is_empty() {
            out.push_str("\nWHERE ");
            out.push_str(predicate);
        }
        out.push(';');
    }

    fn write_update(&self, out: &mut String, table: &str, bind: &Row, predicate: &str) {
        out.push_str("UPDATE ");
        self.write_table_ref(out, table);
        out.push_str(" SET\n");
        separated_by(
            out,
            bind.iter(),
            |out, (column, value)| {
                self.write_identifier_quoted(out, column);
                out.push_str(" = ");
                self.write_value(out, value);
            },
            ",\n",
        );
        if !predicate.trim().is_empty() {
            out.push_str("\nWHERE ");
            out.push_str(predicate);
        }
        out.push(';');
    }

    fn write_truncate(&self, out: &mut String, table: &str) {
        out.push_str("TRUNCATE TABLE ");
        self.write_table_ref(out, table);
        out.push(';');
    }

    /// Suspends foreign key enforcement, remembering the previous setting.
    fn write_schema_change_begin(&self, out: &mut String) {
        out.push_str(
            "SET @OLD_FOREIGN_KEY_CHECKS = @@FOREIGN_KEY_CHECKS, FOREIGN_KEY_CHECKS = 0;",
        );
    }

    fn write_schema_change_end(&self, out: &mut String) {
        out.push_str("SET FOREIGN_KEY_CHECKS = IF(@OLD_FOREIGN_KEY_CHECKS = 0, 0, 1);");
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for GenericSqlWriter {}
