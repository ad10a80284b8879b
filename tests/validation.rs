//! Tests for schema validation and duplicate detection.

use ironsieve::testing::*;
use ironsieve::*;

fn canonical(rows: Vec<Vec<Value>>) -> Table {
    let mut t = users_table(rows);
    transform_users(&mut t).unwrap();
    t
}

fn validate(rows: Vec<Vec<Value>>) -> ValidationOutcome {
    Validator::new(Schema::users())
        .validate(&canonical(rows))
        .unwrap()
}

#[test]
fn test_all_valid_batch_has_empty_report() {
    let mut t = sample_users();
    transform_users(&mut t).unwrap();
    let outcome = Validator::new(Schema::users()).validate(&t).unwrap();

    assert!(outcome.is_clean());
    assert!(outcome.report.is_empty());
    assert_eq!(outcome.valid.len(), 5);
    assert_eq!(outcome.invalid.len(), 0);
}

#[test]
fn test_duplicate_key_invalidates_every_holder() {
    // Both rows are otherwise valid.
    let outcome = validate(vec![
        user_row("1", "Bob", "A@X.com", "25", "2023-01-15"),
        user_row("1", "Bob", "A@X.com", "30", "2023-01-15"),
    ]);

    assert_eq!(outcome.valid.len(), 0);
    assert_eq!(outcome.invalid.index(), &[0, 1]);
    let rules: Vec<_> = outcome
        .report
        .violations()
        .iter()
        .map(|v| (v.row, v.field.as_str(), v.rule))
        .collect();
    assert_eq!(
        rules,
        vec![(0, "user_id", Rule::DuplicateKey), (1, "user_id", Rule::DuplicateKey)]
    );
}

#[test]
fn test_duplicates_checked_independently_of_field_rules() {
    // Row 0 fails the email rule *and* shares its key with row 2. Row 2 must
    // still be flagged even though row 0 was already invalid.
    let outcome = validate(vec![
        user_row("7", "a", "broken", "25", "2023-01-15"),
        user_row("8", "b", "b@x.io", "25", "2023-01-15"),
        user_row("7", "c", "c@x.io", "25", "2023-01-15"),
    ]);

    assert_eq!(outcome.invalid.index(), &[0, 2]);
    assert_eq!(outcome.valid.index(), &[1]);
    let row0: Vec<Rule> = outcome.report.for_row(0).map(|v| v.rule).collect();
    assert_eq!(row0, vec![Rule::StrMatches, Rule::DuplicateKey]);
}

#[test]
fn test_rounding_can_create_duplicates() {
    let outcome = validate(vec![
        user_row("2.5", "a", "a@x.io", "25", "2023-01-15"),
        user_row("2", "b", "b@x.io", "25", "2023-01-15"),
        user_row("3.5", "c", "c@x.io", "25", "2023-01-15"),
    ]);
    assert_eq!(outcome.invalid.index(), &[0, 1]);
}

#[test]
fn test_invalid_email_tags_email_field() {
    let outcome = validate(vec![
        user_row("1", "alice", "alice@test.com", "30", "2023-01-15"),
        user_row("2", "bob", "not-an-email", "30", "2023-01-15"),
    ]);

    assert_eq!(outcome.valid.len(), 1);
    assert_eq!(outcome.invalid.index(), &[1]);
    let v = &outcome.report.violations()[0];
    assert_eq!(v.row, 1);
    assert_eq!(v.field, "email");
    assert_eq!(v.rule, Rule::StrMatches);
    assert!(v.message.contains("not-an-email"));
}

#[test]
fn test_age_boundaries() {
    let outcome = validate(vec![
        user_row("1", "a", "a@x.io", "-20", "2023-01-15"),
        user_row("2", "b", "b@x.io", "100", "2023-01-15"),
        user_row("3", "c", "c@x.io", "-21", "2023-01-15"),
        user_row("4", "d", "d@x.io", "101", "2023-01-15"),
    ]);

    assert_eq!(outcome.valid.index(), &[0, 1]);
    assert_eq!(outcome.invalid.index(), &[2, 3]);
    assert!(
        outcome
            .report
            .violations()
            .iter()
            .all(|v| v.field == "age" && v.rule == Rule::Between)
    );
}

#[test]
fn test_nulls_violate_required_fields() {
    let outcome = validate(vec![user_row("", "", "", "", "")]);

    let fields: Vec<&str> = outcome
        .report
        .violations()
        .iter()
        .map(|v| {
            assert_eq!(v.rule, Rule::NotNull);
            v.field.as_str()
        })
        .collect();
    assert_eq!(fields, vec!["user_id", "username", "email", "age", "signup_date"]);
    assert_eq!(outcome.invalid.len(), 1);
}

#[test]
fn test_null_keys_are_not_duplicates() {
    let outcome = validate(vec![
        user_row("", "a", "a@x.io", "25", "2023-01-15"),
        user_row("", "b", "b@x.io", "25", "2023-01-15"),
    ]);
    assert!(
        outcome
            .report
            .violations()
            .iter()
            .all(|v| v.rule == Rule::NotNull)
    );
    assert_eq!(outcome.report.len(), 2);
}

#[test]
fn test_every_violation_of_a_row_is_reported() {
    let outcome = validate(vec![user_row("1", "a", "nope", "500", "garbage")]);
    let rules: Vec<(String, Rule)> = outcome
        .report
        .violations()
        .iter()
        .map(|v| (v.field.clone(), v.rule))
        .collect();
    assert_eq!(
        rules,
        vec![
            ("email".to_string(), Rule::StrMatches),
            ("age".to_string(), Rule::Between),
            ("signup_date".to_string(), Rule::NotNull),
        ]
    );
}

#[test]
fn test_dtype_violation_on_raw_values() {
    // Validating an untransformed batch flags type mismatches instead of panicking.
    let raw = sample_users();
    let report = Validator::new(Schema::users()).evaluate(&raw).unwrap();
    assert!(report.violations().iter().any(|v| v.rule == Rule::Dtype));
}

#[test]
fn test_missing_column_is_structural() {
    let t = Table::new(vec![Column::utf8("user_id", vec![Value::Int(1)])]).unwrap();
    let err = Validator::new(Schema::users()).validate(&t).unwrap_err();
    assert!(matches!(err, PipelineError::MissingColumn { .. }));
}

#[test]
fn test_custom_schema_nullable_field() {
    let schema = Schema::new(vec![
        FieldSpec::new("code", ColumnType::Utf8).nullable(true).unique(),
        FieldSpec::new("n", ColumnType::Int64).check(Check::Between { min: 0, max: 9 }),
    ]);
    let t = Table::new(vec![
        Column::new("code", ColumnType::Utf8, vec![Value::Null, "a".into(), "a".into()]),
        Column::new("n", ColumnType::Int64, vec![Value::Int(1), Value::Int(2), Value::Int(10)]),
    ])
    .unwrap();

    let outcome = Validator::new(schema).validate(&t).unwrap();
    assert_eq!(outcome.valid.index(), &[0]);
    assert_eq!(outcome.invalid.index(), &[1, 2]);
    assert_eq!(outcome.report.for_row(2).count(), 2);
}

#[test]
fn test_report_json_and_file() -> anyhow::Result<()> {
    let outcome = validate(vec![user_row("1", "bob", "bad", "30", "2023-01-15")]);
    let json: serde_json::Value = serde_json::from_str(&outcome.report.to_json()?)?;
    assert_eq!(json[0]["row"], 0);
    assert_eq!(json[0]["field"], "email");
    assert_eq!(json[0]["rule"], "str_matches");

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("report.json");
    outcome.report.write_to_file(&path)?;
    let back: FailureReport = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(back, outcome.report);
    Ok(())
}

#[test]
fn test_strict_mode_rejects_unknown_columns() {
    let t = Table::new(vec![
        Column::utf8("user_id", vec![]),
        Column::utf8("username", vec![]),
        Column::utf8("email", vec![]),
        Column::utf8("age", vec![]),
        Column::utf8("signup_date", vec![]),
        Column::utf8("extra", vec![]),
    ])
    .unwrap();

    assert!(Schema::users().check_columns(&t).is_ok());
    let err = Schema::users()
        .with_mode(ColumnMode::Strict)
        .check_columns(&t)
        .unwrap_err();
    assert_eq!(
        err,
        PipelineError::UnexpectedColumn {
            column: "extra".into()
        }
    );
}
