use chrono::{Local, NaiveDate, NaiveTime, TimeZone};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims embedded in a branch clock-in QR code. The token is only honored
/// on the day it was issued for and expires at local midnight.
#[derive(Debug, Serialize, Deserialize)]
pub struct QrClaims {
    pub branch_id: u64,
    pub branch_code: String,
    pub date: NaiveDate,
    pub exp: usize,
    pub jti: String,
}

fn next_midnight_ts(today: NaiveDate) -> usize {
    let tomorrow = today.succ_opt().unwrap_or(today);
    Local
        .from_local_datetime(&tomorrow.and_time(NaiveTime::MIN))
        .single()
        .map(|dt| dt.timestamp() as usize)
        .unwrap_or_else(|| (Local::now().timestamp() + 86_400) as usize)
}

/// Sign the day's QR token for a branch.
pub fn issue_qr_token(branch_id: u64, branch_code: &str, secret: &str) -> (String, QrClaims) {
    let today = Local::now().date_naive();
    let claims = QrClaims {
        branch_id,
        branch_code: branch_code.to_string(),
        date: today,
        exp: next_midnight_ts(today),
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();

    (token, claims)
}

pub fn verify_qr_token(token: &str, secret: &str) -> Result<QrClaims, String> {
    decode::<QrClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    #[test]
    fn issued_token_round_trips() {
        let (token, issued) = issue_qr_token(7, "X7K2QA", "secret");
        let claims = verify_qr_token(&token, "secret").unwrap();
        assert_eq!(claims.branch_id, 7);
        assert_eq!(claims.branch_code, "X7K2QA");
        assert_eq!(claims.date, issued.date);
        assert_eq!(claims.jti, issued.jti);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let (token, _) = issue_qr_token(7, "X7K2QA", "secret");
        assert!(verify_qr_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = QrClaims {
            branch_id: 7,
            branch_code: "X7K2QA".into(),
            date: Local::now().date_naive(),
            // Past the default 60s validation leeway.
            exp: (Local::now().timestamp() - 120) as usize,
            jti: "test".into(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(verify_qr_token(&token, "secret").is_err());
    }

    #[test]
    fn token_expires_at_the_following_midnight() {
        let today = Local::now().date_naive();
        let (_, claims) = issue_qr_token(1, "AAAAAA", "secret");
        let exp_date = Local
            .timestamp_opt(claims.exp as i64, 0)
            .single()
            .unwrap()
            .date_naive();
        assert_eq!(exp_date, today.succ_opt().unwrap());
    }
}
