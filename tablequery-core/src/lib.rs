mod as_value;
mod connection;
mod driver;
mod error;
mod iterator;
mod row;
mod select;
mod sql_writer;
mod table_query;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use connection::*;
pub use driver::*;
pub use error::*;
pub use iterator::*;
pub use row::*;
pub use select::*;
pub use sql_writer::*;
pub use table_query::*;
pub use util::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
