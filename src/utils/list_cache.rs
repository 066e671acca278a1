use moka::future::Cache;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::time::Duration;

pub const PERMISSIONS_LIST_KEY: &str = "permissions_list";
pub const ROLES_LIST_KEY: &str = "roles_list";

/// Backend default expiry, applied when no explicit TTL is requested.
const DEFAULT_TTL_SECS: u64 = 10 * 60;
/// Roles change rarely; they keep their own one-hour expiry.
const ROLES_TTL_SECS: u64 = 3600;

/// Read-through cache for the permission list endpoint. Entries are
/// serialized response payloads; writes never invalidate, stale data is
/// served until the TTL lapses.
static PERMISSIONS_CACHE: Lazy<Cache<String, Value>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(64)
        .time_to_live(Duration::from_secs(DEFAULT_TTL_SECS))
        .build()
});

static ROLES_CACHE: Lazy<Cache<String, Value>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(64)
        .time_to_live(Duration::from_secs(ROLES_TTL_SECS))
        .build()
});

fn cache_for(key: &str) -> &'static Cache<String, Value> {
    if key == ROLES_LIST_KEY {
        &ROLES_CACHE
    } else {
        &PERMISSIONS_CACHE
    }
}

pub async fn get(key: &str) -> Option<Value> {
    cache_for(key).get(key).await
}

/// Last writer wins; concurrent population races are tolerated because
/// entries are re-derivable read caches of idempotent queries.
pub async fn store(key: &str, payload: Value) {
    cache_for(key).insert(key.to_string(), payload).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[actix_web::test]
    async fn miss_then_hit() {
        assert!(get("permissions_list_test_miss").await.is_none());

        store(PERMISSIONS_LIST_KEY, json!([{"id": 1, "name": "a"}])).await;
        let cached = get(PERMISSIONS_LIST_KEY).await.unwrap();
        assert_eq!(cached[0]["name"], "a");
    }

    #[actix_web::test]
    async fn last_writer_wins() {
        store(ROLES_LIST_KEY, json!([{"id": 1}])).await;
        store(ROLES_LIST_KEY, json!([{"id": 2}])).await;

        let cached = get(ROLES_LIST_KEY).await.unwrap();
        assert_eq!(cached[0]["id"], 2);
    }
}
