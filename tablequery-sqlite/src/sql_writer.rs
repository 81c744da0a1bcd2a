use tablequery_core::SqlWriter;

/// Sqlite dialect.
///
/// Sqlite has no `TRUNCATE` and keeps foreign key enforcement in a pragma,
/// the previous state of which is saved by the connection. Identifiers take
/// the standard double quotes.
#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteSqlWriter {}

impl SqliteSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for SqliteSqlWriter {
    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(out, value, '"', r#""""#);
        out.push('"');
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push(['0', '1'][value as usize]);
    }

    fn write_value_infinity(&self, out: &mut String, negative: bool) {
        if negative {
            out.push('-');
        }
        out.push_str("1.0e+10000");
    }

    fn write_truncate(&self, out: &mut String, table: &str) {
        out.push_str("DELETE FROM ");
        self.write_table_ref(out, table);
        out.push(';');
    }

    fn write_schema_change_begin(&self, out: &mut String) {
        out.push_str("PRAGMA foreign_keys = OFF;");
    }

    fn write_schema_change_end(&self, out: &mut String) {
        out.push_str("PRAGMA foreign_keys = ON;");
    }
}
