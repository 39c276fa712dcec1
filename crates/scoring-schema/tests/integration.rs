//! Integration tests for request validation
//!
//! Covers:
//! - Required/nullable precedence across every field kind
//! - Type checks running before format checks
//! - Birthday windows relative to the current date
//! - The full method envelope flow

use chrono::{Datelike, Local, NaiveDate};
use proptest::prelude::*;
use scoring_schema::{
    ClientsInterestsRequest, Field, FieldKind, FieldSpec, MethodRequest, OnlineScoreRequest,
    ValidationError,
};
use serde_json::{json, Map, Value};

const ALL_KINDS: [FieldKind; 8] = [
    FieldKind::Char,
    FieldKind::Arguments,
    FieldKind::Email,
    FieldKind::Phone,
    FieldKind::Date,
    FieldKind::Birthday,
    FieldKind::Gender,
    FieldKind::ClientIds,
];

fn map(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn assign(spec: &FieldSpec, value: Option<Value>) -> Result<(), ValidationError> {
    Field::new(spec).assign(value)
}

fn years_ago(years: i32) -> String {
    let today = Local::now().date_naive();
    let date = NaiveDate::from_ymd_opt(today.year() - years, 1, 1).unwrap();
    date.format("%d.%m.%Y").to_string()
}

#[test]
fn test_missing_required_wins_for_every_kind() {
    for kind in ALL_KINDS {
        for nullable in [true, false] {
            let spec = FieldSpec::new("f", kind).required(true).nullable(nullable);
            assert_eq!(assign(&spec, None), Err(ValidationError::missing("f")), "{kind:?}");
            assert_eq!(assign(&spec, Some(Value::Null)), Err(ValidationError::missing("f")), "{kind:?}");
        }
    }
}

#[test]
fn test_empty_sentinels_rejected_when_not_nullable() {
    for kind in ALL_KINDS {
        let spec = FieldSpec::new("f", kind);
        for empty in [json!(""), json!({}), json!([]), Value::Null] {
            assert_eq!(
                assign(&spec, Some(empty.clone())),
                Err(ValidationError::empty("f")),
                "{kind:?} {empty}"
            );
        }
    }
}

#[test]
fn test_wrong_type_reported_before_format() {
    let cases = vec![
        (FieldKind::Char, json!(1)),
        (FieldKind::Arguments, json!([1])),
        (FieldKind::Email, json!(["a@b.c"])),
        (FieldKind::Phone, json!({"n": 7})),
        (FieldKind::Date, json!(20201231)),
        (FieldKind::Birthday, json!(true)),
        (FieldKind::Gender, json!("1")),
        (FieldKind::ClientIds, json!("1,2")),
    ];
    for (kind, value) in cases {
        let spec = FieldSpec::new("f", kind);
        let err = assign(&spec, Some(value.clone())).unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { .. }), "{kind:?} {value}: {err}");
    }
}

#[test]
fn test_birthday_relative_to_now() {
    let spec = FieldSpec::new("birthday", FieldKind::Birthday);
    assert!(assign(&spec, Some(json!(years_ago(30)))).is_ok());
    assert!(assign(&spec, Some(json!(years_ago(69)))).is_ok());
    assert!(assign(&spec, Some(json!(years_ago(70)))).is_err());
    assert!(assign(&spec, Some(json!(years_ago(0)))).is_err());
    assert!(assign(&spec, Some(json!(years_ago(-1)))).is_err());
}

#[test]
fn test_end_to_end_online_score() {
    let body = map(json!({
        "login": "h&f",
        "token": "opaque-token",
        "method": "online_score",
        "arguments": {"phone": "79175002040", "email": "a@b.c"}
    }));

    let request = MethodRequest::from_body(&body).unwrap();
    assert!(!request.is_admin());

    let score_request = OnlineScoreRequest::from_arguments(&request.arguments).unwrap();
    assert_eq!(score_request.provided_fields(), ["email", "phone"]);
    assert_eq!(score_request.email.as_deref(), Some("a@b.c"));
}

#[test]
fn test_clients_interests_end_to_end() {
    let request = ClientsInterestsRequest::from_arguments(&map(json!({"client_ids": [0]}))).unwrap();
    assert_eq!(request.client_ids, vec![0]);
    assert_eq!(request.date, None);
    assert_eq!(request.provided_fields(), ["client_ids"]);
}

proptest! {
    #[test]
    fn prop_valid_phone_numbers_accepted(rest in "[0-9]{10}") {
        let spec = FieldSpec::new("phone", FieldKind::Phone);
        let phone = format!("7{}", rest);
        prop_assert!(assign(&spec, Some(json!(phone))).is_ok());

        let as_int: u64 = phone.parse().unwrap();
        prop_assert!(assign(&spec, Some(json!(as_int))).is_ok());
    }

    #[test]
    fn prop_phone_length_enforced(digits in "7[0-9]{0,20}") {
        prop_assume!(digits.len() != 11);
        let spec = FieldSpec::new("phone", FieldKind::Phone);
        let is_format_error = matches!(
            assign(&spec, Some(json!(digits))),
            Err(ValidationError::Format { .. })
        );
        prop_assert!(is_format_error);
    }

    #[test]
    fn prop_email_requires_at_and_dot(email in "[a-z@.]{1,20}") {
        let spec = FieldSpec::new("email", FieldKind::Email);
        let expected_ok = email.contains('@') && email.contains('.');
        prop_assert_eq!(assign(&spec, Some(json!(email))).is_ok(), expected_ok);
    }

    #[test]
    fn prop_client_ids_of_integers_accepted(ids in proptest::collection::vec(any::<i64>(), 1..20)) {
        let request = ClientsInterestsRequest::from_arguments(&map(json!({"client_ids": ids.clone()})));
        prop_assert_eq!(request.unwrap().client_ids, ids);
    }

    #[test]
    fn prop_client_ids_beyond_i64_rejected(
        ids in proptest::collection::vec(any::<i64>(), 0..5),
        big in (i64::MAX as u64 + 1)..=u64::MAX,
    ) {
        let mut values: Vec<serde_json::Value> = ids.into_iter().map(|id| json!(id)).collect();
        values.push(json!(big));
        let err = ClientsInterestsRequest::from_arguments(&map(json!({"client_ids": values}))).unwrap_err();
        prop_assert_eq!(err.kind(), "format");
    }
}
