use crate::{ids, job, recreate_jobs};
use tablequery::{Connection, PagedRowIterator, Result, Rows, TableQuery};

pub fn paging<C: Connection>(connection: &mut C) {
    recreate_jobs(connection, "paging_jobs");
    let mut query =
        TableQuery::new(&mut *connection, "paging_jobs", "id").expect("Failed to bind paging_jobs");
    let rows = (1..=45)
        .map(|i| job(i, &format!("job {}", i), None))
        .collect::<Rows>();
    let affected = query.put(rows, &[]).expect("Failed to put 45 rows");
    assert_eq!(affected.rows_affected, 45);

    // Pagination
    assert_eq!(query.fetch_all(None, &[], 0, 0, &[]).unwrap().len(), 45);
    assert_eq!(query.fetch_all(None, &[], 1, 0, &[]).unwrap().len(), 45);
    assert_eq!(query.fetch_all(None, &[], 0, 20, &[]).unwrap().len(), 45);
    assert_eq!(query.fetch_all(None, &[], 1, 20, &[]).unwrap().len(), 20);
    assert_eq!(query.fetch_all(None, &[], 3, 20, &[]).unwrap().len(), 5);
    assert!(query.fetch_all(None, &[], 4, 20, &[]).unwrap().is_empty());
    let rows = query
        .fetch_all(Some("id > 40"), &["id"], 1, 3, &[])
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert!(ids(&rows).iter().all(|v| *v > 40));
    let rows = query
        .fetch_all(Some("id = 7"), &["id"], 0, 0, &["name AS label"])
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].names(), ["id", "label"]);
    assert_eq!(rows[0].try_get::<String>("label").unwrap(), "job 7");

    // Column and association
    let column = query.fetch_col(None, &["id"], 2, 10, &[]).unwrap();
    assert_eq!(column.len(), 10);
    let assoc = query
        .fetch_assoc(Some("id <= 10"), &["name", "id"], 0, 0, &[])
        .unwrap();
    assert_eq!(assoc.len(), 10);
    let (key, row) = assoc
        .iter()
        .find(|(k, _)| k == "job 3")
        .expect("Missing `job 3` key");
    assert_eq!(key, "job 3");
    assert_eq!(row.try_get::<i64>("id").unwrap(), 3);

    // Iterator
    let mut iterator = query.iterator().expect("Failed to create the iterator");
    assert_eq!(
        iterator.page_size(),
        PagedRowIterator::<&mut C>::ROW_COUNT
    );
    let first = iterator
        .by_ref()
        .collect::<Result<Vec<_>>>()
        .expect("Failed to iterate");
    let mut seen = ids(&first);
    seen.sort();
    assert_eq!(seen, (1..=45).collect::<Vec<_>>());
    assert!(!iterator.has_more());
    assert!(!iterator.is_valid().unwrap());

    // Rewind after exhaustion
    iterator.rewind().expect("Failed to rewind");
    assert!(iterator.has_more());
    let second = iterator
        .by_ref()
        .collect::<Result<Vec<_>>>()
        .expect("Failed to iterate after rewind");
    assert_eq!(first, second);

    // Cursor protocol
    drop(iterator);
    let mut iterator = PagedRowIterator::with_page_size(&mut query, 7).unwrap();
    let mut count = 0;
    while iterator.is_valid().unwrap() {
        assert!(iterator.key() < 7);
        assert!(iterator.current().is_some());
        iterator.advance();
        count += 1;
    }
    assert_eq!(count, 45);
    assert_eq!(iterator.page(), 8);
}
