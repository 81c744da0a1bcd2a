use crate::{Connection, Result, SqlWriter};

pub trait Driver {
    type Connection: Connection<Driver = Self>;
    type SqlWriter: SqlWriter;

    /// Scheme expected at the start of a connection URL.
    const NAME: &'static str;

    fn sql_writer(&self) -> Self::SqlWriter;

    /// Open a new connection from a URL in the form `<NAME>://<location>`.
    fn connect(&self, url: &str) -> Result<Self::Connection>;
}
