use moka::future::Cache;
use once_cell::sync::Lazy;
use std::time::Duration;

/// Cached branch row for code lookups during registration and QR checks.
#[derive(Debug, Clone)]
pub struct BranchInfo {
    pub id: u64,
    pub name: String,
}

static BRANCH_CACHE: Lazy<Cache<String, BranchInfo>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

#[inline]
fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

pub async fn get(code: &str) -> Option<BranchInfo> {
    BRANCH_CACHE.get(&normalize(code)).await
}

pub async fn put(code: &str, info: BranchInfo) {
    BRANCH_CACHE.insert(normalize(code), info).await;
}
