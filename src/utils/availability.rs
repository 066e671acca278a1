//! Username availability pipeline for registration: a cuckoo filter gives
//! fast negatives, a moka cache gives fast positives, the database is the
//! fallback. Both layers are warmed at startup from background tasks.

use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;
use std::time::Duration;

const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static TAKEN_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// true => username is TAKEN. Only taken names are stored.
static TAKEN_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000)
        .time_to_live(Duration::from_secs(86400))
        .build()
});

#[inline]
fn normalize(username: &str) -> String {
    username.to_lowercase()
}

/// Record a freshly registered username in both in-memory layers.
pub async fn mark_taken(username: &str) {
    let username = normalize(username);
    TAKEN_FILTER
        .write()
        .expect("username filter poisoned")
        .add(&username);
    TAKEN_CACHE.insert(username, true).await;
}

/// true  => username AVAILABLE
/// false => username TAKEN
pub async fn is_username_available(username: &str, pool: &MySqlPool) -> bool {
    let username = normalize(username);

    // Filter says "definitely never seen" -> available, no I/O needed.
    let might_exist = TAKEN_FILTER
        .read()
        .expect("username filter poisoned")
        .contains(&username);
    if !might_exist {
        return true;
    }

    // Cache gives a fast positive for recently seen names.
    if TAKEN_CACHE.get(&username).await.unwrap_or(false) {
        return false;
    }

    // Database fallback; on error assume taken rather than allow a dup.
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? LIMIT 1)",
    )
    .bind(&username)
    .fetch_one(pool)
    .await
    .unwrap_or(true);

    !exists
}

/// Stream every username into the filter, in batches to bound the time a
/// write lock is held.
pub async fn warmup_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>("SELECT username FROM users").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (username,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;
        batch.push(normalize(&username));
        total += 1;

        if batch.len() == batch_size {
            fill_filter(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        fill_filter(&batch);
    }

    log::info!("Username filter warmup complete: {} users", total);
    Ok(())
}

/// Load recently active usernames into the positive cache.
pub async fn warmup_cache(pool: &MySqlPool, days: u32, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>(
        r#"
        SELECT username
        FROM users
        WHERE last_login_at >= NOW() - INTERVAL ? DAY
        ORDER BY last_login_at DESC
        "#,
    )
    .bind(days)
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (username,) = row?;
        batch.push(username);
        total += 1;

        if batch.len() >= batch_size {
            fill_cache(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        fill_cache(&batch).await;
    }

    log::info!(
        "Username cache warmup complete: {} recent users (last {} days)",
        total,
        days
    );
    Ok(())
}

fn fill_filter(usernames: &[String]) {
    let mut filter = TAKEN_FILTER.write().expect("username filter poisoned");
    for username in usernames {
        filter.add(username);
    }
}

async fn fill_cache(usernames: &[String]) {
    let inserts: Vec<_> = usernames
        .iter()
        .map(|u| TAKEN_CACHE.insert(normalize(u), true))
        .collect();

    futures::future::join_all(inserts).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn marked_usernames_hit_both_layers() {
        mark_taken("Fresh_Name").await;

        assert!(
            TAKEN_FILTER
                .read()
                .unwrap()
                .contains(&"fresh_name".to_string())
        );
        assert!(TAKEN_CACHE.get("fresh_name").await.unwrap_or(false));
    }

    #[test]
    fn normalization_is_case_insensitive() {
        assert_eq!(normalize("JDoe"), "jdoe");
    }
}
