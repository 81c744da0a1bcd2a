mod paging;
mod purge;
mod queue;
mod simple;

use crate::{paging::paging, purge::purge, queue::queue, simple::simple};
use log::LevelFilter;
use std::env;
use tablequery::{Connection, Row, Value};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs the whole suite, each scenario on its own table.
pub fn execute_tests<C: Connection>(mut connection: C) {
    simple(&mut connection);
    paging(&mut connection);
    queue(&mut connection);
    purge(&mut connection);
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}

/// Drop and create a `(id, name, attempts)` table.
pub(crate) fn recreate_jobs<C: Connection>(connection: &mut C, table: &str) {
    connection
        .execute(&format!("DROP TABLE IF EXISTS {};", table))
        .unwrap_or_else(|e| panic!("Failed to drop {}: {:#}", table, e));
    connection
        .execute(&format!(
            "CREATE TABLE {} (\nid INTEGER PRIMARY KEY,\nname VARCHAR(64) NOT NULL,\nattempts INTEGER\n);",
            table
        ))
        .unwrap_or_else(|e| panic!("Failed to create {}: {:#}", table, e));
}

pub(crate) fn job(id: i64, name: &str, attempts: Option<i64>) -> Row {
    Row::from([
        ("id", Value::from(id)),
        ("name", Value::from(name.to_string())),
        ("attempts", Value::from(attempts)),
    ])
}

pub(crate) fn ids(rows: &[Row]) -> Vec<i64> {
    rows.iter()
        .map(|row| row.try_get::<i64>("id").expect("Row without an integer id"))
        .collect()
}
