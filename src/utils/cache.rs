use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Cache mémoire des réponses Scryfall.
///
/// Injecté via `web::Data` plutôt qu'en état global, pour que les tests et
/// plusieurs instances puissent avoir des caches indépendants. Clé : URL
/// complète de la requête amont.
pub struct TtlCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
    max_entries: usize,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }
}

impl TtlCache {
    pub fn new(default_ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            max_entries,
        }
    }

    /// Retourne la valeur si elle existe et n'a pas expiré.
    pub fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;
        if entry.is_expired() {
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn put(&self, key: String, value: Value) {
        self.put_with_ttl(key, value, self.default_ttl);
    }

    pub fn put_with_ttl(&self, key: String, value: Value, ttl: Duration) {
        let Ok(mut entries) = self.entries.write() else {
            return;
        };

        // Capacité bornée : on évince l'entrée la plus ancienne avant d'insérer
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                entries.remove(&k);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Supprime toutes les entrées expirées. Retourne combien ont été retirées.
    pub fn sweep(&self) -> usize {
        let Ok(mut entries) = self.entries.write() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired());
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hit_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(300), 10);
        cache.put("https://api.scryfall.com/cards/random".into(), json!({"name": "Llanowar Elves"}));

        let hit = cache.get("https://api.scryfall.com/cards/random");
        assert_eq!(hit, Some(json!({"name": "Llanowar Elves"})));
    }

    #[test]
    fn test_miss_after_expiry() {
        let cache = TtlCache::new(Duration::from_secs(300), 10);
        cache.put_with_ttl("k".into(), json!(1), Duration::from_millis(10));

        assert!(cache.get("k").is_some());
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_sweep_removes_expired_only() {
        let cache = TtlCache::new(Duration::from_secs(300), 10);
        cache.put_with_ttl("old".into(), json!(1), Duration::from_millis(5));
        cache.put("fresh".into(), json!(2));

        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("fresh").is_some());
    }

    #[test]
    fn test_bounded_capacity_evicts_oldest() {
        let cache = TtlCache::new(Duration::from_secs(300), 2);
        cache.put("a".into(), json!(1));
        std::thread::sleep(Duration::from_millis(5));
        cache.put("b".into(), json!(2));
        cache.put("c".into(), json!(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_overwrite_same_key_keeps_len() {
        let cache = TtlCache::new(Duration::from_secs(300), 2);
        cache.put("a".into(), json!(1));
        cache.put("a".into(), json!(2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a"), Some(json!(2)));
    }
}
