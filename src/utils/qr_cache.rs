use chrono::NaiveDate;
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::time::Duration;

/// Issued QR tokens keyed by (branch, day) so repeated fetches within a day
/// return the same code. Keys embed the date, so rollover at midnight is
/// automatic even before the TTL evicts the old entry.
static QR_TOKEN_CACHE: Lazy<Cache<String, String>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .time_to_live(Duration::from_secs(86400))
        .build()
});

#[inline]
fn key(branch_id: u64, date: NaiveDate) -> String {
    format!("{}:{}", branch_id, date)
}

pub async fn get(branch_id: u64, date: NaiveDate) -> Option<String> {
    QR_TOKEN_CACHE.get(&key(branch_id, date)).await
}

pub async fn put(branch_id: u64, date: NaiveDate, token: String) {
    QR_TOKEN_CACHE.insert(key(branch_id, date), token).await;
}
