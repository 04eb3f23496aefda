//! End-to-end integration tests for primdb.
//!
//! These tests drive a session through the command language, from text to
//! JSON files on disk and back.

use std::fs;

use primdb_common::error::{DbError, SchemaError, ValidationError};
use primdb_common::types::{ScalarType, Value};
use primdb_sql::storage::{ColumnDef, Persistence};
use primdb_sql::StatementResult;
use primdb_test::{run_all, select, TestDb};

/// Full create / insert / select / update / delete workflow.
#[test]
fn test_full_crud_workflow() {
    let db = TestDb::new().unwrap();
    let mut session = db.open().unwrap();

    // Supplying ID is rejected and registers nothing.
    let err = session
        .execute("create_table users ID:int name:str active:bool")
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Schema(SchemaError::InvalidColumnSpec { .. })
    ));
    assert!(!session.catalog().contains("users"));

    let result = session
        .execute("create_table users name:str active:bool")
        .unwrap();
    match result {
        StatementResult::Created { schema, .. } => assert_eq!(
            schema.columns(),
            &[
                ColumnDef::new("ID", ScalarType::Integer),
                ColumnDef::new("name", ScalarType::Text),
                ColumnDef::new("active", ScalarType::Boolean),
            ]
        ),
        other => panic!("unexpected result {other:?}"),
    }

    let result = session
        .execute(r#"insert into users values ("Ann", true)"#)
        .unwrap();
    assert_eq!(result.message(), "Record with ID=1 added to table \"users\".");

    let rows = select(&mut session, r#"select from users where name = "Ann""#);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id(), Some(1));
    assert_eq!(rows[0].get("active"), Some(&Value::Boolean(true)));

    let result = session
        .execute("update users set active=false where ID=1")
        .unwrap();
    assert_eq!(result.rows_affected(), Some(1));
    assert_eq!(
        result.message(),
        "Record with ID=1 in table \"users\" updated."
    );
    let rows = select(&mut session, "select from users");
    assert_eq!(rows[0].get("active"), Some(&Value::Boolean(false)));

    let result = session.execute("delete from users where ID=1").unwrap();
    assert_eq!(result.rows_affected(), Some(1));
    assert!(select(&mut session, "select from users").is_empty());
}

/// A type error leaves the row set untouched.
#[test]
fn test_type_violation_leaves_rows_unchanged() {
    let db = TestDb::new().unwrap();
    let mut session = db.open().unwrap();
    run_all(
        &mut session,
        &[
            "create_table users name:str active:bool",
            r#"insert into users values ("Ann", true)"#,
        ],
    )
    .unwrap();

    let err = session
        .execute("insert into users values (42, true)")
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Validation(ValidationError::TypeMismatch { .. })
    ));
    assert!(err.is_recoverable());

    assert_eq!(select(&mut session, "select from users").len(), 1);
    assert_eq!(session.store().load_rows("users").unwrap().len(), 1);
}

/// IDs keep growing from the largest one present.
#[test]
fn test_insert_assigns_max_plus_one() {
    let db = TestDb::new().unwrap();
    let mut session = db.open().unwrap();
    run_all(
        &mut session,
        &[
            "create_table t n:int",
            "insert into t values (10)",
            "insert into t values (20)",
            "insert into t values (30)",
            "delete from t where ID = 2",
        ],
    )
    .unwrap();

    match session.execute("insert into t values (40)").unwrap() {
        StatementResult::Inserted { id, .. } => assert_eq!(id, 4),
        other => panic!("unexpected result {other:?}"),
    }

    let ids: Vec<_> = select(&mut session, "select from t")
        .iter()
        .filter_map(|row| row.id())
        .collect();
    assert_eq!(ids, vec![1, 3, 4]);
}

/// Everything written is there after reopening.
#[test]
fn test_persistence_round_trip() {
    let db = TestDb::new().unwrap();
    {
        let mut session = db.open().unwrap();
        run_all(
            &mut session,
            &[
                "create_table users name:str active:bool",
                "create_table orders total:int",
                r#"insert into users values ("Ann", true)"#,
                r#"insert into users values ('Bob, the "builder"', false)"#,
                "insert into orders values (-15)",
            ],
        )
        .unwrap();
    }

    let mut session = db.open().unwrap();
    assert_eq!(session.catalog().list_tables(), vec!["users", "orders"]);

    let rows = select(&mut session, "select from users where active = false");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("name"),
        Some(&Value::Text("Bob, the \"builder\"".to_string()))
    );
    let rows = select(&mut session, "select from orders");
    assert_eq!(rows[0].get("total"), Some(&Value::Integer(-15)));

    let meta = fs::read_to_string(db.config().metadata_path()).unwrap();
    assert!(meta.contains("\"structure\""));
    assert!(db.config().tables_dir().join("users.json").exists());
}

/// Writes through the session invalidate cached selects.
#[test]
fn test_cache_invalidation_through_session() {
    let db = TestDb::new().unwrap();
    let mut session = db.open().unwrap();
    run_all(
        &mut session,
        &[
            "create_table users name:str active:bool",
            r#"insert into users values ("Ann", true)"#,
        ],
    )
    .unwrap();

    let query = "select from users where active = true";
    assert_eq!(select(&mut session, query).len(), 1);
    assert_eq!(select(&mut session, query).len(), 1);
    assert_eq!(session.cache_stats().hits(), 1);

    session
        .execute(r#"insert into users values ("Bob", true)"#)
        .unwrap();
    assert_eq!(select(&mut session, query).len(), 2);

    session
        .execute("update users set active = false where name = \"Ann\"")
        .unwrap();
    assert_eq!(select(&mut session, query).len(), 1);

    session.execute("delete from users where active = true").unwrap();
    assert!(select(&mut session, query).is_empty());

    assert_eq!(session.cache_stats().hits(), 1);
    assert_eq!(session.cache_stats().invalidations(), 4);
}

/// An update that matches nothing reports zero and writes nothing.
#[test]
fn test_update_zero_matches() {
    let db = TestDb::new().unwrap();
    let mut session = db.open().unwrap();
    run_all(
        &mut session,
        &[
            "create_table users name:str active:bool",
            r#"insert into users values ("Ann", true)"#,
        ],
    )
    .unwrap();
    let before = session.store().load_rows("users").unwrap();

    let result = session
        .execute("update users set active=false where ID=7")
        .unwrap();
    assert_eq!(result.rows_affected(), Some(0));
    assert_eq!(result.message(), "Rows updated: 0.");
    assert_eq!(session.store().load_rows("users").unwrap(), before);
}

/// `info` reports the schema and the row count.
#[test]
fn test_create_then_info() {
    let db = TestDb::new().unwrap();
    let mut session = db.open().unwrap();
    run_all(
        &mut session,
        &[
            "create_table books title:str pages:int in_stock:bool",
            r#"insert into books values ("Dune", 412, true)"#,
        ],
    )
    .unwrap();

    match session.execute("info books").unwrap() {
        StatementResult::Info {
            schema, row_count, ..
        } => {
            assert_eq!(schema.to_string(), "ID:int, title:str, pages:int, in_stock:bool");
            assert_eq!(row_count, 1);
        }
        other => panic!("unexpected result {other:?}"),
    }
}

/// Conflicting DDL is reported, not raised.
#[test]
fn test_tolerated_conflicts() {
    let db = TestDb::new().unwrap();
    let mut session = db.open().unwrap();
    session.execute("create_table t n:int").unwrap();

    let result = session.execute("create_table t other:str").unwrap();
    assert!(result.is_conflict());
    let schema = session.catalog().schema("t").unwrap().to_string();
    assert_eq!(schema, "ID:int, n:int");

    session.execute("drop_table t").unwrap();
    let result = session.execute("drop_table t").unwrap();
    assert!(result.is_conflict());
    assert!(!db.config().tables_dir().join("t.json").exists());
}

/// Unknown commands and malformed lines are errors that change nothing.
#[test]
fn test_parse_errors() {
    let db = TestDb::new().unwrap();
    let mut session = db.open().unwrap();
    session.execute("create_table t n:int").unwrap();

    for line in [
        "show tables",
        "insert into t values 1",
        "select from t where n",
        "update t set n=1",
        "insert into t values (abc)",
    ] {
        let err = session.execute(line).unwrap_err();
        assert!(err.is_recoverable(), "{line}: {err}");
    }
    assert!(select(&mut session, "select from t").is_empty());
}
