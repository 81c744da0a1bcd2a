use crate::{job, recreate_jobs};
use tablequery::{Connection, Error, TableQuery, TableQueryError, Value};

fn is_primary_key_missing(error: &Error) -> bool {
    matches!(
        error.downcast_ref::<TableQueryError>(),
        Some(TableQueryError::PrimaryKeyMissing { .. })
    )
}

pub fn queue<C: Connection>(connection: &mut C) {
    recreate_jobs(connection, "queue_jobs");
    let mut query =
        TableQuery::new(&mut *connection, "queue_jobs", "id").expect("Failed to bind queue_jobs");
    query
        .put(
            (1..=5)
                .map(|i| job(i, &format!("job {}", i), Some(0)))
                .collect::<Vec<_>>(),
            &[],
        )
        .expect("Failed to put the jobs");

    // Poll takes the lowest key, pop the highest
    let row = query.poll().expect("Failed to poll");
    assert_eq!(row.try_get::<i64>("id").unwrap(), 1);
    assert_eq!(row.names(), ["id", "name", "attempts"]);
    let row = query.pop().expect("Failed to pop");
    assert_eq!(row.try_get::<i64>("id").unwrap(), 5);

    // Pull deletes what it returns
    let row = query.pull("name = 'job 3'", &[]).expect("Failed to pull");
    assert_eq!(row.try_get::<i64>("id").unwrap(), 3);
    assert!(query.fetch_row("id = 3", &[]).unwrap().is_empty());
    let error = query
        .pull("name = 'job 3'", &[])
        .expect_err("Pulling a missing row must fail");
    assert!(is_primary_key_missing(&error));
    let error = query
        .pull("name = 'job 2'", &["name"])
        .expect_err("Pulling without the primary key must fail");
    assert!(is_primary_key_missing(&error));
    assert_eq!(
        query.fetch_col(None, &["id"], 0, 0, &[]).unwrap(),
        [Value::Int64(Some(2)), Value::Int64(Some(4))]
    );

    // Drain
    assert_eq!(query.poll().unwrap().try_get::<i64>("id").unwrap(), 2);
    assert_eq!(query.pop().unwrap().try_get::<i64>("id").unwrap(), 4);
    assert!(is_primary_key_missing(&query.poll().unwrap_err()));
    assert!(is_primary_key_missing(&query.pop().unwrap_err()));
}
