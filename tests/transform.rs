//! Tests for column canonicalization.

use chrono::{NaiveDate, NaiveDateTime};
use ironsieve::testing::*;
use ironsieve::*;

fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

fn single_column(name: &str, values: Vec<Value>) -> Table {
    Table::new(vec![Column::utf8(name, values)]).unwrap()
}

fn values(table: &Table, name: &str) -> Vec<Value> {
    table.column(name).unwrap().values.clone()
}

#[test]
fn test_lowercase_column() {
    let mut t = single_column(
        "data",
        vec![
            Value::Int(12),
            "NoN".into(),
            "".into(),
            "OUI".into(),
            "peut-etre".into(),
            Value::Null,
            "   ".into(),
        ],
    );
    apply_rule(&mut t, "data", ColumnRule::Lowercase).unwrap();

    assert_eq!(
        values(&t, "data"),
        vec![
            "12".into(),
            "non".into(),
            Value::Null,
            "oui".into(),
            "peut-etre".into(),
            Value::Null,
            Value::Null,
        ]
    );
    assert_eq!(t.column("data").unwrap().dtype, ColumnType::Utf8);
}

#[test]
fn test_integer_column_coercion_and_rounding() {
    let mut t = single_column(
        "age",
        vec![
            Value::Int(25),
            "30".into(),
            "invalid".into(),
            Value::Int(45),
            "".into(),
            Value::Null,
            "50.5".into(),
            "40.7".into(),
            "51.5".into(),
            " 7 ".into(),
            Value::Float(-2.5),
        ],
    );
    apply_rule(&mut t, "age", ColumnRule::Integer).unwrap();

    assert_eq!(
        values(&t, "age"),
        vec![
            Value::Int(25),
            Value::Int(30),
            Value::Null,
            Value::Int(45),
            Value::Null,
            Value::Null,
            Value::Int(50),
            Value::Int(41),
            Value::Int(52),
            Value::Int(7),
            Value::Int(-2),
        ]
    );
    assert_eq!(t.column("age").unwrap().dtype, ColumnType::Int64);
}

#[test]
fn test_integer_rejects_non_finite_and_huge() {
    let mut t = single_column("n", vec!["NaN".into(), "inf".into(), "1e30".into(), "1e3".into()]);
    apply_rule(&mut t, "n", ColumnRule::Integer).unwrap();
    assert_eq!(
        values(&t, "n"),
        vec![Value::Null, Value::Null, Value::Null, Value::Int(1000)]
    );
}

#[test]
fn test_timestamp_column() {
    let mut t = single_column(
        "signup_date",
        vec![
            "2023-01-15".into(),
            "2023-02-20".into(),
            "invalid_date".into(),
            "2023-03-25 14:30:00".into(),
            "".into(),
            Value::Null,
            "2023-04-15".into(),
            "2023-05-01T08:00:00+02:00".into(),
            "06/30/2023".into(),
            Value::Timestamp(ts(2020, 1, 1, 12, 0, 0)),
            Value::Int(20230101),
        ],
    );
    apply_rule(&mut t, "signup_date", ColumnRule::Timestamp).unwrap();

    assert_eq!(
        values(&t, "signup_date"),
        vec![
            Value::Timestamp(ts(2023, 1, 15, 0, 0, 0)),
            Value::Timestamp(ts(2023, 2, 20, 0, 0, 0)),
            Value::Null,
            Value::Timestamp(ts(2023, 3, 25, 14, 30, 0)),
            Value::Null,
            Value::Null,
            Value::Timestamp(ts(2023, 4, 15, 0, 0, 0)),
            Value::Timestamp(ts(2023, 5, 1, 6, 0, 0)),
            Value::Timestamp(ts(2023, 6, 30, 0, 0, 0)),
            Value::Timestamp(ts(2020, 1, 1, 12, 0, 0)),
            Value::Null,
        ]
    );
    assert_eq!(t.column("signup_date").unwrap().dtype, ColumnType::Timestamp);
}

#[test]
fn test_missing_column_is_reported_by_name() {
    let mut t = single_column("age", vec![Value::Int(25), Value::Int(30)]);
    for rule in [ColumnRule::Lowercase, ColumnRule::Integer, ColumnRule::Timestamp] {
        let err = apply_rule(&mut t, "invalid_column", rule).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MissingColumn {
                column: "invalid_column".into()
            }
        );
        assert!(err.to_string().contains("invalid_column"));
    }
    assert_eq!(values(&t, "age"), vec![Value::Int(25), Value::Int(30)]);
}

#[test]
fn test_rules_are_idempotent() {
    let mut once = users_table(vec![
        user_row("1.5", "MiXeD", "UPPER@TEST.COM", "50.5", "2023-03-25 14:30:00"),
        user_row("x", "", "", "thirty", "not a date"),
        user_row("2", "  ", "a@b.co", "-20.5", "March 3, 2023"),
    ]);
    transform_users(&mut once).unwrap();

    let mut twice = once.clone();
    transform_users(&mut twice).unwrap();
    assert_eq!(once, twice);

    for (column, rule) in ironsieve::transform::USER_RULES {
        let mut again = once.clone();
        apply_rule(&mut again, column, rule).unwrap();
        assert_eq!(again, once, "rule for {column} changed a canonical column");
    }
}

#[test]
fn test_transform_users_expected_values() {
    let mut t = users_table(vec![
        user_row("1", "Alice", "alice@test.com", "25", "2023-01-15"),
        user_row("2", "Bob", "BOB@TEST.COM", "30", "2023-02-20"),
    ]);
    transform_users(&mut t).unwrap();

    assert_eq!(t.value(0, "user_id"), Some(&Value::Int(1)));
    assert_eq!(t.value(1, "user_id"), Some(&Value::Int(2)));
    assert_eq!(t.value(0, "username"), Some(&"alice".into()));
    assert_eq!(t.value(1, "username"), Some(&"bob".into()));
    assert_eq!(t.value(1, "email"), Some(&"bob@test.com".into()));
    assert_eq!(t.value(0, "age"), Some(&Value::Int(25)));
    assert_eq!(
        t.value(1, "signup_date"),
        Some(&Value::Timestamp(ts(2023, 2, 20, 0, 0, 0)))
    );
}

#[test]
fn test_transform_users_invalid_values_become_null() {
    let mut t = users_table(vec![
        user_row("1", "Alice", "alice@test.com", "25", "2023-01-15"),
        user_row("invalid", "Bob", "BOB@TEST.COM", "thirty", "invalid_date"),
        user_row("3", "", "", "35", "2023-03-25"),
        user_row("", "David", "david@mail.com", "40.7", ""),
    ]);
    transform_users(&mut t).unwrap();

    assert_eq!(t.value(1, "user_id"), Some(&Value::Null));
    assert_eq!(t.value(3, "user_id"), Some(&Value::Null));
    assert_eq!(t.value(2, "username"), Some(&Value::Null));
    assert_eq!(t.value(2, "email"), Some(&Value::Null));
    assert_eq!(t.value(1, "age"), Some(&Value::Null));
    assert_eq!(t.value(3, "age"), Some(&Value::Int(41)));
    assert_eq!(t.value(1, "signup_date"), Some(&Value::Null));
    assert_eq!(t.value(3, "signup_date"), Some(&Value::Null));
}

#[test]
fn test_transform_preserves_structure() {
    let mut t = sample_users();
    let names_before: Vec<String> = t.column_names().map(String::from).collect();
    let index_before = t.index().to_vec();

    transform_users(&mut t).unwrap();

    assert_eq!(t.len(), 5);
    assert_eq!(t.column_names().collect::<Vec<_>>(), names_before);
    assert_eq!(t.index(), index_before.as_slice());
}

#[test]
fn test_transform_blanks_extra_columns() {
    let mut t = Table::new(vec![
        Column::utf8("user_id", vec!["1".into(), "2".into()]),
        Column::utf8("username", vec!["A".into(), "B".into()]),
        Column::utf8("email", vec!["a@x.io".into(), "b@x.io".into()]),
        Column::utf8("age", vec!["20".into(), "21".into()]),
        Column::utf8("signup_date", vec!["2023-01-01".into(), "2023-01-02".into()]),
        Column::utf8("notes", vec!["".into(), "Keep Case".into()]),
    ])
    .unwrap();
    transform_users(&mut t).unwrap();

    assert_eq!(
        values(&t, "notes"),
        vec![Value::Null, Value::str("Keep Case")]
    );
}

#[test]
fn test_transform_users_missing_column_aborts() {
    let mut t = Table::new(vec![Column::utf8("user_id", vec!["1".into()])]).unwrap();
    let before = t.clone();
    let err = transform_users(&mut t).unwrap_err();
    assert!(matches!(err, PipelineError::MissingColumn { ref column } if column == "username"));
    assert_eq!(t, before);
}
