use crate::{job, recreate_jobs};
use tablequery::{Connection, TableQuery};

fn count<C: Connection>(query: &mut TableQuery<C>) -> Option<i64> {
    query
        .fetch_one("COUNT(*)", "")
        .expect("Failed to count the rows")
        .to_integer()
}

pub fn purge<C: Connection>(connection: &mut C) {
    recreate_jobs(connection, "purge_jobs");
    let mut query =
        TableQuery::new(&mut *connection, "purge_jobs", "id").expect("Failed to bind purge_jobs");

    query
        .put((1..=10).map(|i| job(i, "purge", None)).collect::<Vec<_>>(), &[])
        .expect("Failed to put the rows");
    query.purge(false).expect("Failed to purge");
    assert_eq!(count(&mut query), Some(0));

    query
        .put((1..=3).map(|i| job(i, "purge", None)).collect::<Vec<_>>(), &[])
        .expect("Failed to put the rows after purging");
    query
        .purge(true)
        .expect("Failed to purge without foreign key checks");
    assert_eq!(count(&mut query), Some(0));

    query
        .put(job(1, "again", None), &[])
        .expect("Failed to put after purging");
    assert_eq!(query.poll().unwrap().try_get::<String>("name").unwrap(), "again");
}
