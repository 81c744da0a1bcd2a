mod mock;

#[cfg(test)]
mod tests {
    use crate::mock::MockConnection;
    use indoc::indoc;
    use tablequery_core::{Row, RowsAffected, TableQuery, TableQueryError, Value};

    fn job(id: i64, name: &str) -> Row {
        Row::from_iter([
            ("id", Value::Int64(Some(id))),
            ("name", Value::Varchar(Some(name.into()))),
        ])
    }

    fn table_error(error: &tablequery_core::Error) -> Option<&TableQueryError> {
        error.downcast_ref::<TableQueryError>()
    }

    #[test]
    fn missing_table() {
        let mut connection = MockConnection::with_table("jobs");
        let Err(error) = TableQuery::new(&mut connection, "missing", "id") else {
            panic!("Binding to a missing table must fail");
        };
        assert_eq!(
            table_error(&error),
            Some(&TableQueryError::TableNotFound {
                table: "missing".into()
            })
        );
        assert!(connection.statements.is_empty());
    }

    #[test]
    fn binding() {
        let mut connection = MockConnection::with_table("jobs");
        let query = TableQuery::new(&mut connection, "jobs", "id").expect("Failed to bind jobs");
        assert_eq!(query.table(), "jobs");
        assert_eq!(query.primary_key(), "id");
    }

    #[test]
    fn put_single_row_same_as_sequence() {
        let mut single = MockConnection::with_table("jobs");
        TableQuery::new(&mut single, "jobs", "id")
            .unwrap()
            .put(job(1, "first"), &[])
            .expect("Failed to put a single row");
        let mut many = MockConnection::with_table("jobs");
        TableQuery::new(&mut many, "jobs", "id")
            .unwrap()
            .put(vec![job(1, "first")], &[])
            .expect("Failed to put a sequence of rows");
        assert_eq!(single.statements, many.statements);
        assert_eq!(
            single.statements,
            [indoc! {r#"
                INSERT INTO `jobs` (`id`, `name`)
                VALUES
                (1, 'first');
            "#}
            .trim()]
        );
    }

    #[test]
    fn put_columns() {
        let mut connection = MockConnection::with_table("jobs");
        let mut query = TableQuery::new(&mut connection, "jobs", "id").unwrap();
        query
            .put([job(1, "first"), job(2, "it's second")], &["name"])
            .expect("Failed to put rows with explicit columns");
        query
            .put(Vec::<Row>::new(), &[])
            .expect("Putting nothing must succeed");
        assert_eq!(
            connection.executed(),
            [indoc! {r#"
                INSERT INTO `jobs` (`name`)
                VALUES
                ('first'),
                ('it''s second');
            "#}
            .trim()]
        );
    }

    #[test]
    fn put_first_row_without_columns() {
        let mut connection = MockConnection::with_table("jobs");
        let mut query = TableQuery::new(&mut connection, "jobs", "id").unwrap();
        let affected = query
            .put(vec![Row::default(), job(1, "first")], &[])
            .expect("Putting rows without columns must not fail");
        assert_eq!(affected, RowsAffected::default());
        query
            .put(vec![Row::default(), job(2, "second")], &["id"])
            .expect("Failed to put rows with explicit columns");
        assert_eq!(
            connection.executed(),
            ["INSERT INTO `jobs` (`id`)\nVALUES\n(NULL),\n(2);"]
        );
    }

    #[test]
    fn delete_and_update() {
        let mut connection = MockConnection::with_table("jobs");
        let mut query = TableQuery::new(&mut connection, "jobs", "id").unwrap();
        let affected = query.delete("name = 'done'").expect("Failed to delete");
        assert_eq!(affected.rows_affected, 1);
        query
            .update(&Row::from([("name", "renamed")]), "id > 3")
            .expect("Failed to update");
        query
            .update(&Row::from([("retries", 0)]), "")
            .expect("Failed to update every row");
        assert_eq!(
            query.update(&Row::default(), "id = 1").unwrap(),
            RowsAffected::default()
        );
        assert_eq!(
            connection.executed(),
            [
                "DELETE FROM `jobs`\nWHERE name = 'done';",
                "UPDATE `jobs` SET\n`name` = 'renamed'\nWHERE id > 3;",
                "UPDATE `jobs` SET\n`retries` = 0;",
            ]
        );
    }

    #[test]
    fn fetch_one() {
        let mut connection = MockConnection::with_rows("jobs", 3);
        let mut query = TableQuery::new(&mut connection, "jobs", "id").unwrap();
        let value = query.fetch_one("name", "id = 1").unwrap();
        assert_eq!(value, Value::Varchar(Some("row 1".into())));
        query.connection().rows.clear();
        let value = query.fetch_one("name", "id = 1").unwrap();
        assert!(value.is_null());
        assert_eq!(
            connection.statements[0],
            "SELECT `name`\nFROM `jobs`\nWHERE id = 1\nLIMIT 1;"
        );
    }

    #[test]
    fn fetch_row() {
        let mut connection = MockConnection::with_rows("jobs", 3);
        let mut query = TableQuery::new(&mut connection, "jobs", "id").unwrap();
        let row = query.fetch_row("id = 1", &[]).unwrap();
        assert_eq!(row, job(1, "row 1"));
        let row = query.fetch_row("id = 1", &["name"]).unwrap();
        assert_eq!(row.names(), ["name"]);
        query.connection().rows.clear();
        assert!(query.fetch_row("id = 1", &[]).unwrap().is_empty());
    }

    #[test]
    fn fetch_all_pagination() {
        let mut connection = MockConnection::with_rows("jobs", 25);
        let mut query = TableQuery::new(&mut connection, "jobs", "id").unwrap();
        assert_eq!(query.fetch_all(None, &[], 0, 0, &[]).unwrap().len(), 25);
        assert_eq!(query.fetch_all(None, &[], 2, 0, &[]).unwrap().len(), 25);
        assert_eq!(query.fetch_all(None, &[], 0, 10, &[]).unwrap().len(), 25);
        let page = query.fetch_all(None, &[], 2, 10, &[]).unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(page[0], job(11, "row 11"));
        let page = query.fetch_all(None, &[], 3, 10, &[]).unwrap();
        assert_eq!(page.len(), 5);
        assert!(query.fetch_all(None, &[], 4, 10, &[]).unwrap().is_empty());
        query
            .fetch_all(Some("id > 2"), &["id", "name"], 1, 10, &["LENGTH(name) AS size"])
            .unwrap();
        assert_eq!(
            connection.statements,
            [
                "SELECT *\nFROM `jobs`;",
                "SELECT *\nFROM `jobs`;",
                "SELECT *\nFROM `jobs`;",
                "SELECT *\nFROM `jobs`\nLIMIT 10 OFFSET 10;",
                "SELECT *\nFROM `jobs`\nLIMIT 10 OFFSET 20;",
                "SELECT *\nFROM `jobs`\nLIMIT 10 OFFSET 30;",
                "SELECT `id`, `name`, LENGTH(name) AS size\nFROM `jobs`\nWHERE id > 2\nLIMIT 10;",
            ]
        );
    }

    #[test]
    fn fetch_far_pages() {
        let mut connection = MockConnection::with_rows("jobs", 3);
        let mut query = TableQuery::new(&mut connection, "jobs", "id").unwrap();
        assert!(query.fetch_all(None, &[], u64::MAX, 20, &[]).unwrap().is_empty());
        assert!(query.fetch_col(None, &["id"], u64::MAX, 20, &[]).unwrap().is_empty());
        assert!(query.fetch_assoc(None, &[], u64::MAX, 20, &[]).unwrap().is_empty());
        assert_eq!(query.fetch_all(None, &[], 1, u64::MAX, &[]).unwrap().len(), 3);
        assert_eq!(
            connection.statements[0],
            "SELECT *\nFROM `jobs`\nLIMIT 20 OFFSET 9223372036854775807;"
        );
        assert_eq!(
            connection.statements[3],
            "SELECT *\nFROM `jobs`\nLIMIT 9223372036854775807;"
        );
    }

    #[test]
    fn fetch_col_and_assoc() {
        let mut connection = MockConnection::with_rows("jobs", 3);
        connection.rows.push(job(2, "duplicate"));
        let mut query = TableQuery::new(&mut connection, "jobs", "id").unwrap();
        let ids = query.fetch_col(None, &["id"], 0, 0, &[]).unwrap();
        assert_eq!(
            ids,
            [1, 2, 3, 2].map(|v| Value::Int64(Some(v))).to_vec()
        );
        let assoc = query.fetch_assoc(None, &[], 0, 0, &[]).unwrap();
        let keys = assoc.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, ["1", "2", "3"]);
        assert_eq!(assoc[1].1, job(2, "duplicate"));
    }

    #[test]
    fn pull() {
        let mut connection = MockConnection::with_rows("jobs", 3);
        let mut query = TableQuery::new(&mut connection, "jobs", "id").unwrap();
        let row = query.pull("name = 'row 1'", &[]).expect("Failed to pull");
        assert_eq!(row, job(1, "row 1"));
        let error = query
            .pull("name = 'row 1'", &["name"])
            .expect_err("Pulling without the primary key must fail");
        assert!(matches!(
            table_error(&error),
            Some(TableQueryError::PrimaryKeyMissing { .. })
        ));
        assert_eq!(connection.executed(), ["DELETE FROM `jobs`\nWHERE id = 1;"]);
    }

    #[test]
    fn poll_and_pop() {
        let mut connection = MockConnection::with_rows("jobs", 5);
        let mut query = TableQuery::new(&mut connection, "jobs", "id").unwrap();
        assert_eq!(query.poll().unwrap(), job(1, "row 1"));
        assert_eq!(query.pop().unwrap(), job(5, "row 5"));
        assert_eq!(
            connection.statements,
            [
                "SELECT *\nFROM `jobs`\nORDER BY `jobs`.`id` ASC\nLIMIT 1;",
                "DELETE FROM `jobs`\nWHERE id = 1;",
                "SELECT *\nFROM `jobs`\nORDER BY `jobs`.`id` DESC\nLIMIT 1;",
                "DELETE FROM `jobs`\nWHERE id = 5;",
            ]
        );
    }

    #[test]
    fn poll_and_pop_empty() {
        let mut connection = MockConnection::with_table("jobs");
        let mut query = TableQuery::new(&mut connection, "jobs", "id").unwrap();
        for error in [query.poll().unwrap_err(), query.pop().unwrap_err()] {
            assert_eq!(
                table_error(&error),
                Some(&TableQueryError::PrimaryKeyMissing {
                    table: "jobs".into(),
                    primary_key: "id".into(),
                })
            );
        }
        assert!(connection.executed().is_empty());
    }

    #[test]
    fn primary_key_coercion() {
        let mut connection = MockConnection::with_table("jobs");
        connection.rows = vec![
            Row::from([("id", "42")]),
            Row::from([("id", "abc")]),
        ];
        let mut query = TableQuery::new(&mut connection, "jobs", "id").unwrap();
        query.poll().expect("Numeric text keys are coerced");
        let error = query.pop().unwrap_err();
        assert!(matches!(
            table_error(&error),
            Some(TableQueryError::NonNumericPrimaryKey { value, .. }) if value == "abc"
        ));
        assert_eq!(connection.executed(), ["DELETE FROM `jobs`\nWHERE id = 42;"]);
    }

    #[test]
    fn primary_key_out_of_range() {
        let mut connection = MockConnection::with_table("jobs");
        connection.rows = vec![
            Row::from([("id", Value::Float64(Some(1e30)))]),
            Row::from([("id", Value::Varchar(Some("-1e19".into())))]),
        ];
        let mut query = TableQuery::new(&mut connection, "jobs", "id").unwrap();
        for error in [query.poll().unwrap_err(), query.pop().unwrap_err()] {
            assert!(matches!(
                table_error(&error),
                Some(TableQueryError::NonNumericPrimaryKey { .. })
            ));
        }
        assert!(connection.executed().is_empty());
    }

    #[test]
    fn purge() {
        let mut connection = MockConnection::with_table("jobs");
        let mut query = TableQuery::new(&mut connection, "jobs", "id").unwrap();
        query.purge(false).expect("Failed to purge");
        query.purge(true).expect("Failed to purge without foreign keys");
        assert_eq!(
            connection.executed(),
            [
                "TRUNCATE TABLE `jobs`;",
                "SET @OLD_FOREIGN_KEY_CHECKS = @@FOREIGN_KEY_CHECKS, FOREIGN_KEY_CHECKS = 0;",
                "TRUNCATE TABLE `jobs`;",
                "SET FOREIGN_KEY_CHECKS = IF(@OLD_FOREIGN_KEY_CHECKS = 0, 0, 1);",
            ]
        );
    }

    #[test]
    fn purge_failure_restores_foreign_keys() {
        let mut connection = MockConnection::with_table("jobs");
        connection.failing.push("TRUNCATE");
        let mut query = TableQuery::new(&mut connection, "jobs", "id").unwrap();
        let error = query.purge(true).expect_err("Truncation is expected to fail");
        assert!(error.to_string().contains("TRUNCATE"));
        assert_eq!(
            connection.executed().last(),
            Some(&"SET FOREIGN_KEY_CHECKS = IF(@OLD_FOREIGN_KEY_CHECKS = 0, 0, 1);")
        );
    }

    #[test]
    fn connection_errors_are_not_wrapped() {
        let mut connection = MockConnection::with_rows("jobs", 3);
        connection.failing.push("DELETE");
        let mut query = TableQuery::new(&mut connection, "jobs", "id").unwrap();
        let error = query.poll().unwrap_err();
        assert!(table_error(&error).is_none());
        assert_eq!(error.to_string(), "Mock failure on `DELETE`");
    }
}
