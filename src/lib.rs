//! Paginated query and mutation access to a single relational table.
//!
//! A [`TableQuery`] binds a [`Connection`] to one table and its integer
//! primary key. Besides the usual fetch and mutation operations it offers
//! `poll`, `pop` and `pull` (fetch a row, then delete it) and a lazy
//! [`PagedRowIterator`] that walks the whole table one page at a time.
//!
//! Drivers implement [`Connection`] and [`Driver`], see `tablequery-sqlite`.
pub use tablequery_core::*;
