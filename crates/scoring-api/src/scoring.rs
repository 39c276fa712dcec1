//! Scoring and interests lookups
//!
//! `get_score` works off the local cache only and keeps answering when the
//! remote store is down. `get_interests` needs the remote store and reports
//! its failures.

use scoring_schema::{Gender, OnlineScoreRequest};
use scoring_store::{KeyedStore, StoreError};
use sha2::{Digest, Sha256};

const PHONE_WEIGHT: f64 = 1.5;
const EMAIL_WEIGHT: f64 = 1.5;
const BIRTHDAY_GENDER_WEIGHT: f64 = 1.5;
const NAME_WEIGHT: f64 = 0.5;

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Cache key identifying a person by name, phone and birthday
pub fn score_key(request: &OnlineScoreRequest) -> String {
    let birthday = request
        .birthday
        .map(|date| date.format("%Y%m%d").to_string())
        .unwrap_or_default();
    let material = format!(
        "{}{}{}{}",
        request.first_name.as_deref().unwrap_or_default(),
        request.last_name.as_deref().unwrap_or_default(),
        request.phone.as_deref().unwrap_or_default(),
        birthday
    );
    format!("uid:{}", hex::encode(Sha256::digest(material.as_bytes())))
}

/// Score computed from the submitted fields alone
pub fn compute_score(request: &OnlineScoreRequest) -> f64 {
    let mut score = 0.0;
    if filled(&request.phone) {
        score += PHONE_WEIGHT;
    }
    if filled(&request.email) {
        score += EMAIL_WEIGHT;
    }
    // unknown gender counts as not given
    if request.birthday.is_some() && matches!(request.gender, Some(g) if g != Gender::Unknown) {
        score += BIRTHDAY_GENDER_WEIGHT;
    }
    if filled(&request.first_name) && filled(&request.last_name) {
        score += NAME_WEIGHT;
    }
    score
}

pub fn get_score(store: &KeyedStore, request: &OnlineScoreRequest) -> f64 {
    let key = score_key(request);
    if let Some(cached) = store.cache_get(&key) {
        match cached.parse::<f64>() {
            Ok(score) if score > 0.0 => return score,
            Ok(_) => {}
            Err(e) => tracing::warn!(key = %key, error = %e, "Ignoring unparsable cached score"),
        }
    }

    let score = compute_score(request);
    store.cache_set(key, score.to_string());
    score
}

/// Interests stored for a client. A missing key means no interests.
pub async fn get_interests(store: &KeyedStore, client_id: i64) -> Result<Vec<String>, StoreError> {
    let key = format!("i:{}", client_id);
    let Some(raw) = store.get(&key).await? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(interests) => Ok(interests),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Stored interests are not a list of strings");
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use scoring_store::MemoryBackend;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn request(arguments: Value) -> OnlineScoreRequest {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        OnlineScoreRequest::from_arguments_at(arguments.as_object().unwrap(), today).unwrap()
    }

    fn store() -> (Arc<MemoryBackend>, KeyedStore) {
        let backend = Arc::new(MemoryBackend::new());
        (backend.clone(), KeyedStore::new(backend))
    }

    #[test]
    fn test_compute_score() {
        let cases = vec![
            (json!({"phone": "79175002040", "email": "a@b.c"}), 3.0),
            (json!({"phone": 79175002040u64, "email": "a@b.c"}), 3.0),
            (json!({"gender": 1, "birthday": "01.01.2000", "first_name": "a", "last_name": "b"}), 2.0),
            (json!({"gender": 0, "birthday": "01.01.2000"}), 0.0),
            (json!({"gender": 2, "birthday": "01.01.2000"}), 1.5),
            (json!({"first_name": "a", "last_name": "b"}), 0.5),
            (
                json!({"phone": "79175002040", "email": "a@b.c", "gender": 1, "birthday": "01.01.2000",
                       "first_name": "a", "last_name": "b"}),
                5.0,
            ),
        ];
        for (arguments, expected) in cases {
            assert_eq!(compute_score(&request(arguments.clone())), expected, "{arguments}");
        }
    }

    #[test]
    fn test_score_key_ignores_email_and_gender() {
        let a = request(json!({"phone": "79175002040", "email": "a@b.c"}));
        let b = request(json!({"phone": "79175002040", "email": "x@y.z", "gender": 1}));
        assert_eq!(score_key(&a), score_key(&b));
        assert!(score_key(&a).starts_with("uid:"));
        assert_eq!(score_key(&a).len(), 4 + 64);
    }

    #[test]
    fn test_get_score_uses_cache() {
        let (backend, store) = store();
        let request = request(json!({"phone": "79175002040", "email": "a@b.c"}));

        store.cache_set(score_key(&request), "4.5");
        assert_eq!(get_score(&store, &request), 4.5);
        assert_eq!(backend.attempts(), 0);
    }

    #[test]
    fn test_get_score_fills_cache() {
        let (_, store) = store();
        let request = request(json!({"phone": "79175002040", "email": "a@b.c"}));

        assert_eq!(get_score(&store, &request), 3.0);
        assert_eq!(store.cache_get(&score_key(&request)).as_deref(), Some("3"));
    }

    #[test]
    fn test_get_score_with_store_down() {
        let (backend, store) = store();
        backend.set_available(false);
        let request = request(json!({"first_name": "a", "last_name": "b"}));
        assert_eq!(get_score(&store, &request), 0.5);
    }

    #[tokio::test]
    async fn test_get_interests() {
        let (_, store) = store();
        store.set("i:1", Some(r#"["cars", "pets"]"#), None).await.unwrap();
        store.set("i:2", Some("not json"), None).await.unwrap();

        assert_eq!(get_interests(&store, 1).await.unwrap(), vec!["cars", "pets"]);
        assert!(get_interests(&store, 2).await.unwrap().is_empty());
        assert!(get_interests(&store, 3).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_interests_store_down() {
        let (backend, store) = store();
        backend.set_available(false);
        let err = get_interests(&store, 1).await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
