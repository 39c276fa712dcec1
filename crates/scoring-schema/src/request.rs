//! Request types of the scoring API
//!
//! Each request type owns a static [`Schema`] and, where needed, a
//! cross-field rule that runs only after every field passed on its own.

use chrono::{Local, NaiveDate};
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::error::{Result, ValidationError};
use crate::field::{FieldKind, FieldSpec, Gender};
use crate::schema::Schema;

/// Login that grants admin privileges
pub const ADMIN_LOGIN: &str = "admin";

fn static_schema(cell: &'static OnceLock<Schema>, fields: fn() -> Vec<FieldSpec>) -> &'static Schema {
    cell.get_or_init(|| Schema::new(fields()).expect("request schema field names are unique"))
}

/// Envelope of every API call
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRequest {
    pub account: Option<String>,
    pub login: String,
    pub token: String,
    pub arguments: Map<String, Value>,
    pub method: String,
}

impl MethodRequest {
    pub fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        static_schema(&SCHEMA, || {
            vec![
                FieldSpec::new("account", FieldKind::Char).nullable(true),
                FieldSpec::new("login", FieldKind::Char).required(true).nullable(true),
                FieldSpec::new("token", FieldKind::Char).required(true).nullable(true),
                FieldSpec::new("arguments", FieldKind::Arguments).required(true).nullable(true),
                FieldSpec::new("method", FieldKind::Char).required(true),
            ]
        })
    }

    /// Validate a request body
    pub fn from_body(body: &Map<String, Value>) -> Result<Self> {
        let bound = Self::schema().bind(body)?;
        Ok(Self {
            account: bound.string("account"),
            login: bound.string("login").unwrap_or_default(),
            token: bound.string("token").unwrap_or_default(),
            arguments: bound.object("arguments").cloned().unwrap_or_default(),
            method: bound.string("method").unwrap_or_default(),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.login == ADMIN_LOGIN
    }
}

/// Arguments of the `online_score` method
#[derive(Debug, Clone, PartialEq)]
pub struct OnlineScoreRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    provided: Vec<String>,
}

impl OnlineScoreRequest {
    pub const PAIRS_REASON: &'static str =
        "any of pairs expected: 'phone/email', 'first name/last name', 'gender/birthday'";

    pub fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        static_schema(&SCHEMA, || {
            vec![
                FieldSpec::new("first_name", FieldKind::Char).nullable(true),
                FieldSpec::new("last_name", FieldKind::Char).nullable(true),
                FieldSpec::new("email", FieldKind::Email).nullable(true),
                FieldSpec::new("phone", FieldKind::Phone).nullable(true),
                FieldSpec::new("birthday", FieldKind::Birthday).nullable(true),
                FieldSpec::new("gender", FieldKind::Gender).nullable(true),
            ]
        })
    }

    pub fn from_arguments(arguments: &Map<String, Value>) -> Result<Self> {
        Self::from_arguments_at(arguments, Local::now().date_naive())
    }

    pub fn from_arguments_at(arguments: &Map<String, Value>, today: NaiveDate) -> Result<Self> {
        let schema = Self::schema();
        let bound = schema.bind_at(arguments, today)?;

        let has_pair = (bound.is_truthy("phone") && bound.is_truthy("email"))
            || (bound.is_truthy("first_name") && bound.is_truthy("last_name"))
            || (bound.is_set("gender") && bound.is_truthy("birthday"));
        if !has_pair {
            return Err(ValidationError::cross_field(Self::PAIRS_REASON));
        }

        Ok(Self {
            first_name: bound.string("first_name"),
            last_name: bound.string("last_name"),
            email: bound.string("email"),
            phone: bound.string("phone"),
            birthday: bound.date("birthday"),
            gender: bound.int("gender").and_then(Gender::from_code),
            provided: schema.provided_field_names(arguments),
        })
    }

    /// Names of the arguments that were submitted with a value
    pub fn provided_fields(&self) -> &[String] {
        &self.provided
    }
}

/// Arguments of the `clients_interests` method
#[derive(Debug, Clone, PartialEq)]
pub struct ClientsInterestsRequest {
    pub client_ids: Vec<i64>,
    pub date: Option<NaiveDate>,
    provided: Vec<String>,
}

impl ClientsInterestsRequest {
    pub fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        static_schema(&SCHEMA, || {
            vec![
                FieldSpec::new("client_ids", FieldKind::ClientIds).required(true),
                FieldSpec::new("date", FieldKind::Date).nullable(true),
            ]
        })
    }

    pub fn from_arguments(arguments: &Map<String, Value>) -> Result<Self> {
        let schema = Self::schema();
        let bound = schema.bind(arguments)?;
        Ok(Self {
            client_ids: bound.int_list("client_ids").unwrap_or_default(),
            date: bound.date("date"),
            provided: schema.provided_field_names(arguments),
        })
    }

    pub fn provided_fields(&self) -> &[String] {
        &self.provided
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_method_request_valid() {
        let request = MethodRequest::from_body(&map(json!({
            "account": "horns&hoofs",
            "login": "h&f",
            "method": "online_score",
            "token": "abc",
            "arguments": {"phone": "79175002040"}
        })))
        .unwrap();
        assert_eq!(request.account.as_deref(), Some("horns&hoofs"));
        assert_eq!(request.method, "online_score");
        assert_eq!(request.arguments.get("phone"), Some(&json!("79175002040")));
        assert!(!request.is_admin());
    }

    #[test]
    fn test_method_request_admin() {
        let request = MethodRequest::from_body(&map(json!({
            "login": "admin", "token": "", "method": "online_score", "arguments": {}
        })))
        .unwrap();
        assert!(request.is_admin());
        assert!(request.arguments.is_empty());
        assert_eq!(request.account, None);
    }

    #[test]
    fn test_method_request_invalid() {
        let cases = vec![
            (json!({}), "login"),
            (json!({"account": "a", "login": "h&f", "method": "online_score", "token": "t"}), "arguments"),
            (json!({"account": "a", "login": "h&f", "token": "t", "arguments": {}}), "method"),
            (json!({"account": "a", "method": "online_score", "token": "t", "arguments": {}}), "login"),
            (json!({"login": "h&f", "method": "", "token": "t", "arguments": {}}), "method"),
        ];
        for (body, field) in cases {
            let err = MethodRequest::from_body(&map(body.clone())).unwrap_err();
            assert_eq!(err.field(), Some(field), "{body}");
        }
    }

    #[test]
    fn test_online_score_pairs() {
        let ok = vec![
            json!({"phone": "79175002040", "email": "a@b.c"}),
            json!({"phone": 79175002040u64, "email": "a@b.c"}),
            json!({"first_name": "a", "last_name": "b"}),
            json!({"gender": 0, "birthday": "01.01.2000"}),
            json!({"gender": 2, "birthday": "01.01.2000"}),
        ];
        for arguments in ok {
            assert!(
                OnlineScoreRequest::from_arguments_at(&map(arguments.clone()), today()).is_ok(),
                "{arguments}"
            );
        }

        let not_enough = vec![
            json!({}),
            json!({"phone": "79175002040"}),
            json!({"phone": "79175002040", "birthday": "01.01.2000", "first_name": "s"}),
            json!({"birthday": "01.01.2000"}),
            json!({"gender": null, "birthday": "01.01.2000"}),
        ];
        for arguments in not_enough {
            let err = OnlineScoreRequest::from_arguments_at(&map(arguments.clone()), today()).unwrap_err();
            assert_eq!(err, ValidationError::cross_field(OnlineScoreRequest::PAIRS_REASON), "{arguments}");
        }
    }

    #[test]
    fn test_online_score_field_errors_precede_pair_rule() {
        let err = OnlineScoreRequest::from_arguments_at(
            &map(json!({"phone": "79175002040", "email": "a@b.c", "gender": -1})),
            today(),
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("gender"));
    }

    #[test]
    fn test_online_score_values() {
        let request = OnlineScoreRequest::from_arguments_at(
            &map(json!({"phone": 79175002040u64, "email": "a@b.c", "gender": 1, "birthday": "01.01.2000"})),
            today(),
        )
        .unwrap();
        assert_eq!(request.phone.as_deref(), Some("79175002040"));
        assert_eq!(request.gender, Some(Gender::Male));
        assert_eq!(request.birthday, NaiveDate::from_ymd_opt(2000, 1, 1));
        assert_eq!(request.provided_fields(), ["email", "phone", "birthday", "gender"]);
    }

    #[test]
    fn test_clients_interests() {
        let request =
            ClientsInterestsRequest::from_arguments(&map(json!({"client_ids": [1, 2, 3], "date": "19.07.2017"})))
                .unwrap();
        assert_eq!(request.client_ids, vec![1, 2, 3]);
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2017, 7, 19));

        let cases = vec![
            (json!({}), "missing_field"),
            (json!({"date": "20.07.2017"}), "missing_field"),
            (json!({"client_ids": [], "date": "20.07.2017"}), "empty_value"),
            (json!({"client_ids": {"1": 2}}), "type_mismatch"),
            (json!({"client_ids": ["1", "2"]}), "format"),
            (json!({"client_ids": [1, 2], "date": "XXX"}), "format"),
            (json!({"client_ids": [1, 18446744073709551615u64]}), "format"),
        ];
        for (arguments, kind) in cases {
            let err = ClientsInterestsRequest::from_arguments(&map(arguments.clone())).unwrap_err();
            assert_eq!(err.kind(), kind, "{arguments}");
        }
    }

    #[test]
    fn test_clients_interests_ids_keep_their_count() {
        let request =
            ClientsInterestsRequest::from_arguments(&map(json!({"client_ids": [i64::MIN, 0, i64::MAX]}))).unwrap();
        assert_eq!(request.client_ids, vec![i64::MIN, 0, i64::MAX]);

        let err = ClientsInterestsRequest::from_arguments(&map(json!({"client_ids": [1, u64::MAX]}))).unwrap_err();
        assert_eq!(err.field(), Some("client_ids"));
        assert_eq!(err.kind(), "format");
    }
}
