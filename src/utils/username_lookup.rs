//! Username availability for applicant signup.
//!
//! Three tiers: a cuckoo filter answers "definitely not taken" without any
//! I/O, a moka cache answers "definitely taken" for recently seen names,
//! and the database settles everything in between. Both structures are
//! warmed at startup and updated on every successful registration.

use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;
use std::time::Duration;

/// Expected account volume and false-positive rate; tune with real counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static USERNAME_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// value is always `true`: presence means TAKEN.
static TAKEN_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000)
        .time_to_live(Duration::from_secs(86_400)) // 24h TTL
        .build()
});

#[inline]
fn normalize(username: &str) -> String {
    username.to_lowercase()
}

/// Record a username as taken in both tiers.
pub async fn mark_taken(username: &str) {
    let username = normalize(username);
    USERNAME_FILTER
        .write()
        .expect("username filter poisoned")
        .add(&username);
    TAKEN_CACHE.insert(username, true).await;
}

/// true  => username AVAILABLE
/// false => username TAKEN
pub async fn is_username_available(username: &str, pool: &MySqlPool) -> bool {
    let username = normalize(username);

    // Fast negative: the filter has seen every registered name.
    if !USERNAME_FILTER
        .read()
        .expect("username filter poisoned")
        .contains(&username)
    {
        return true;
    }

    // Fast positive: recently seen names.
    if TAKEN_CACHE.get(&username).await.unwrap_or(false) {
        return false;
    }

    // Filter said "maybe": the database decides.
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? LIMIT 1)",
    )
    .bind(&username)
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe: treat lookup failure as taken

    !exists
}

/// Stream all usernames into the filter, and the recently active ones into
/// the cache, in batches.
pub async fn warmup(pool: &MySqlPool, recent_days: u32, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT username,
               COALESCE(last_login_at >= NOW() - INTERVAL ? DAY, 0) AS recent
        FROM users
        "#,
    )
    .bind(recent_days)
    .fetch(pool);

    let mut batch: Vec<(String, bool)> = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (username, recent) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;
        batch.push((normalize(&username), recent != 0));
        total += 1;

        if batch.len() >= batch_size {
            insert_batch(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch).await;
    }

    log::info!("Username lookup warmup complete: {} accounts", total);
    Ok(())
}

async fn insert_batch(batch: &[(String, bool)]) {
    {
        let mut filter = USERNAME_FILTER.write().expect("username filter poisoned");
        for (username, _) in batch {
            filter.add(username);
        }
    }

    let cache_inserts: Vec<_> = batch
        .iter()
        .filter(|(_, recent)| *recent)
        .map(|(username, _)| TAKEN_CACHE.insert(username.clone(), true))
        .collect();

    futures::future::join_all(cache_inserts).await;
}
