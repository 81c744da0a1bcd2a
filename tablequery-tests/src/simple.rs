use crate::{job, recreate_jobs, silent_logs};
use tablequery::{Connection, Row, TableQuery, TableQueryError, Value};

pub fn simple<C: Connection>(connection: &mut C) {
    recreate_jobs(connection, "simple_jobs");

    // Missing table
    let result;
    silent_logs! {
        result = TableQuery::new(&mut *connection, "simple_missing", "id");
    }
    let Err(error) = result else {
        panic!("Binding a missing table must fail");
    };
    assert!(matches!(
        error.downcast_ref::<TableQueryError>(),
        Some(TableQueryError::TableNotFound { table }) if table == "simple_missing"
    ));

    let mut query =
        TableQuery::new(&mut *connection, "simple_jobs", "id").expect("Failed to bind simple_jobs");
    assert_eq!(query.table(), "simple_jobs");
    assert_eq!(query.primary_key(), "id");

    // Put
    let affected = query
        .put(job(1, "first", Some(0)), &[])
        .expect("Failed to put a single row");
    assert_eq!(affected.rows_affected, 1);
    let affected = query
        .put(vec![job(2, "second", Some(0)), job(3, "third", Some(1))], &[])
        .expect("Failed to put two rows");
    assert_eq!(affected.rows_affected, 2);
    query
        .put(job(4, "fourth", Some(7)), &["id", "name"])
        .expect("Failed to put a row with explicit columns");
    query
        .put(Vec::<Row>::new(), &[])
        .expect("Putting nothing must succeed");

    // Fetch one
    assert_eq!(
        query.fetch_one("name", "id = 2").unwrap(),
        Value::Varchar(Some("second".into()))
    );
    assert!(query.fetch_one("attempts", "id = 4").unwrap().is_null());
    assert!(query.fetch_one("name", "id = 99").unwrap().is_null());
    assert_eq!(
        query.fetch_one("COUNT(*)", "").unwrap().to_integer(),
        Some(4)
    );

    // Fetch row
    let row = query.fetch_row("id = 1", &[]).expect("Failed to fetch row 1");
    assert_eq!(row.names(), ["id", "name", "attempts"]);
    assert_eq!(row.try_get::<String>("name").unwrap(), "first");
    let row = query.fetch_row("name = 'third'", &["id"]).unwrap();
    assert_eq!(row.names(), ["id"]);
    assert_eq!(row.try_get::<i64>("id").unwrap(), 3);
    assert!(query.fetch_row("id = 99", &[]).unwrap().is_empty());

    // Update
    let affected = query
        .update(&Row::from([("attempts", Value::from(5))]), "id = 1")
        .expect("Failed to update row 1");
    assert_eq!(affected.rows_affected, 1);
    assert_eq!(
        query.fetch_one("attempts", "id = 1").unwrap(),
        Value::Int64(Some(5))
    );
    let affected = query
        .update(&Row::from([("attempts", Value::from(9))]), "")
        .expect("Failed to update every row");
    assert_eq!(affected.rows_affected, 4);
    assert_eq!(
        query
            .fetch_one("COUNT(*)", "attempts = 9")
            .unwrap()
            .to_integer(),
        Some(4)
    );

    // Delete
    let affected = query.delete("id = 3").expect("Failed to delete row 3");
    assert_eq!(affected.rows_affected, 1);
    let affected = query.delete("id = 99").expect("Deleting nothing must succeed");
    assert_eq!(affected.rows_affected, 0);
    assert_eq!(
        query.fetch_one("COUNT(*)", "").unwrap().to_integer(),
        Some(3)
    );
}
