use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Expected capacity and false-positive rate.
/// Tune these based on real branch counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static BRANCH_CODE_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// Warmup runs in the background after the server binds. Until it has
/// loaded the existing codes, a filter miss proves nothing.
static FILTER_WARMED: AtomicBool = AtomicBool::new(false);

pub fn is_warmed() -> bool {
    FILTER_WARMED.load(Ordering::Acquire)
}

fn mark_warmed() {
    FILTER_WARMED.store(true, Ordering::Release);
}

/// True only when the filter is warm and the code is definitely not in it.
/// A cold filter never rules a code out; callers fall through to the store.
pub fn definitely_absent(code: &str) -> bool {
    is_warmed() && !might_exist(code)
}

#[inline]
fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Check if a branch code might exist (false positives possible)
pub fn might_exist(code: &str) -> bool {
    let code = normalize(code);
    BRANCH_CODE_FILTER
        .read()
        .expect("branch code filter poisoned")
        .contains(&code)
}

/// Insert a single branch code into the filter
pub fn insert(code: &str) {
    let code = normalize(code);
    BRANCH_CODE_FILTER
        .write()
        .expect("branch code filter poisoned")
        .add(&code);
}

/// Warm up the branch code filter using streaming + batching
pub async fn warmup_branch_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>("SELECT branch_code FROM branches").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (code,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(normalize(&code));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    mark_warmed();
    log::info!("Branch code filter warmup complete: {} branches", total);
    Ok(())
}

/// Insert a batch of normalized branch codes
fn insert_batch(codes: &[String]) {
    let mut filter = BRANCH_CODE_FILTER
        .write()
        .expect("branch code filter poisoned");

    for code in codes {
        filter.add(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test body: the warmed flag is process-global, so the cold
    // assertions have to run before anything marks it warm.
    #[test]
    fn cold_filter_never_rules_codes_out() {
        assert!(!is_warmed());
        assert!(!definitely_absent("NOSUCH"));

        insert("warm01");
        mark_warmed();

        assert!(definitely_absent("NOSUCH"));
        // Normalization applies on both paths.
        assert!(might_exist("WARM01"));
        assert!(!definitely_absent("warm01"));
    }
}
