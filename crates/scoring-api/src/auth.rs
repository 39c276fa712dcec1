//! Token authentication
//!
//! Tokens are SHA-512 hex digests. Regular users hash
//! `account + login + SALT`; the admin hashes the current hour
//! (`%Y%m%d%H`) followed by `ADMIN_SALT`, so admin tokens rotate hourly.

use chrono::{DateTime, TimeZone};
use scoring_schema::MethodRequest;
use sha2::{Digest, Sha512};

pub const SALT: &str = "Otus";
pub const ADMIN_SALT: &str = "42";

fn sha512_hex(input: &str) -> String {
    hex::encode(Sha512::digest(input.as_bytes()))
}

/// Token expected for a regular user
pub fn user_token(account: &str, login: &str) -> String {
    sha512_hex(&format!("{}{}{}", account, login, SALT))
}

/// Token expected for the admin at the given time
pub fn admin_token<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    sha512_hex(&format!("{}{}", now.format("%Y%m%d%H"), ADMIN_SALT))
}

/// Token the request should carry
pub fn expected_token<Tz: TimeZone>(request: &MethodRequest, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if request.is_admin() {
        admin_token(now)
    } else {
        user_token(request.account.as_deref().unwrap_or_default(), &request.login)
    }
}

/// Whether the request carries a valid token
pub fn check_auth<Tz: TimeZone>(request: &MethodRequest, now: &DateTime<Tz>) -> bool
where
    Tz::Offset: std::fmt::Display,
{
    expected_token(request, now) == request.token
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::Map;

    fn request(account: Option<&str>, login: &str, token: String) -> MethodRequest {
        MethodRequest {
            account: account.map(str::to_string),
            login: login.to_string(),
            token,
            arguments: Map::new(),
            method: "online_score".to_string(),
        }
    }

    #[test]
    fn test_user_token() {
        let token = user_token("horns&hoofs", "h&f");
        assert_eq!(token.len(), 128);
        assert!(check_auth(&request(Some("horns&hoofs"), "h&f", token), &Utc::now()));
    }

    #[test]
    fn test_missing_account_hashes_empty_string() {
        let token = user_token("", "h&f");
        assert!(check_auth(&request(None, "h&f", token), &Utc::now()));
    }

    #[test]
    fn test_wrong_token() {
        let now = Utc::now();
        assert!(!check_auth(&request(Some("horns&hoofs"), "h&f", "sdd".into()), &now));
        assert!(!check_auth(&request(Some("horns&hoofs"), "h&f", String::new()), &now));
        assert!(!check_auth(&request(Some("horns&hoofs"), "admin", String::new()), &now));
    }

    #[test]
    fn test_admin_token_rotates_hourly() {
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 10, 5, 0).unwrap();
        let same_hour = Utc.with_ymd_and_hms(2024, 6, 15, 10, 59, 59).unwrap();
        let next_hour = Utc.with_ymd_and_hms(2024, 6, 15, 11, 0, 0).unwrap();

        let admin = request(None, "admin", admin_token(&at));
        assert!(check_auth(&admin, &same_hour));
        assert!(!check_auth(&admin, &next_hour));
        assert_eq!(admin_token(&at), sha512_hex("202406151042"));
    }
}
