use crate::database::MongoDB;
use crate::models::{Card, ScryfallCard};
use crate::utils::{AppError, TtlCache};
use mongodb::bson::doc;
use serde_json::Value;

const SCRYFALL_API_BASE: &str = "https://api.scryfall.com";
const UPSTREAM_TIMEOUT_SECS: u64 = 10;
const NEGATIVE_CACHE_TTL_SECS: u64 = 60;

fn search_url(query: &str, page: Option<u32>, french: bool) -> String {
    // Requêtes localisées en français, avec repli anglais (cf. fallback below)
    let q = if french {
        format!("{} lang:fr", query)
    } else {
        query.to_string()
    };
    let mut url = format!(
        "{}/cards/search?q={}&include_multilingual=true",
        SCRYFALL_API_BASE,
        urlencoding::encode(&q)
    );
    if let Some(page) = page {
        url.push_str(&format!("&page={}", page));
    }
    url
}

fn named_url(name: &str, exact: bool) -> String {
    let param = if exact { "exact" } else { "fuzzy" };
    format!(
        "{}/cards/named?{}={}",
        SCRYFALL_API_BASE,
        param,
        urlencoding::encode(name)
    )
}

/// GET through the TTL cache: a hit within the TTL returns the cached body
/// without touching Scryfall.
async fn fetch_json(cache: &TtlCache, url: &str) -> Result<Value, AppError> {
    if let Some(cached) = cache.get(url) {
        log::debug!("📦 Scryfall cache hit: {}", url);
        return Ok(cached);
    }

    log::info!("🃏 Fetching from Scryfall: {}", url);

    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .timeout(std::time::Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to reach Scryfall: {}", e)))?;

    // Scryfall signale "aucun résultat" par un 404
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(AppError::NotFound("Card".to_string()));
    }
    if !response.status().is_success() {
        return Err(AppError::Upstream(format!("Scryfall API error: {}", response.status())));
    }

    let data: Value = response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to parse Scryfall response: {}", e)))?;

    cache.put(url.to_string(), data.clone());
    Ok(data)
}

/// Marqueur "aucun résultat" posé sur l'URL française : les requêtes sans
/// résultat localisé passent directement au repli anglais pendant le TTL
/// court, au lieu de réinterroger Scryfall deux fois à chaque appel.
fn has_negative_marker(cache: &TtlCache, url: &str) -> bool {
    cache.get(url).is_some_and(|v| v.is_null())
}

/// Card search, French first with an English fallback when the localized
/// query has no results.
pub async fn search_cards(
    cache: &TtlCache,
    query: &str,
    page: Option<u32>,
) -> Result<Value, AppError> {
    if query.trim().is_empty() {
        return Err(AppError::InvalidRequest("Search query is required".to_string()));
    }

    let french_url = search_url(query, page, true);
    if has_negative_marker(cache, &french_url) {
        return fetch_json(cache, &search_url(query, page, false)).await;
    }

    match fetch_json(cache, &french_url).await {
        Ok(data) => Ok(data),
        Err(AppError::NotFound(_)) => {
            log::info!("🔍 No French results for '{}', falling back to English", query);
            cache.put_with_ttl(
                french_url,
                Value::Null,
                std::time::Duration::from_secs(NEGATIVE_CACHE_TTL_SECS),
            );
            fetch_json(cache, &search_url(query, page, false)).await
        }
        Err(e) => Err(e),
    }
}

pub async fn get_card_named(cache: &TtlCache, name: &str, exact: bool) -> Result<Value, AppError> {
    if name.trim().is_empty() {
        return Err(AppError::InvalidRequest("Card name is required".to_string()));
    }
    fetch_json(cache, &named_url(name, exact)).await
}

/// Random card — deliberately bypasses the cache, a cached random card
/// would stay pinned for the whole TTL.
pub async fn random_card() -> Result<Value, AppError> {
    let url = format!("{}/cards/random", SCRYFALL_API_BASE);

    let client = reqwest::Client::new();
    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .timeout(std::time::Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to reach Scryfall: {}", e)))?;

    if !response.status().is_success() {
        return Err(AppError::Upstream(format!("Scryfall API error: {}", response.status())));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to parse Scryfall response: {}", e)))
}

pub async fn autocomplete(cache: &TtlCache, query: &str) -> Result<Value, AppError> {
    let url = format!(
        "{}/cards/autocomplete?q={}",
        SCRYFALL_API_BASE,
        urlencoding::encode(query)
    );
    fetch_json(cache, &url).await
}

pub async fn list_sets(cache: &TtlCache) -> Result<Value, AppError> {
    fetch_json(cache, &format!("{}/sets", SCRYFALL_API_BASE)).await
}

pub async fn symbology(cache: &TtlCache) -> Result<Value, AppError> {
    fetch_json(cache, &format!("{}/symbology", SCRYFALL_API_BASE)).await
}

/// Raw single-card proxy endpoint body; also refreshes the local card cache.
pub async fn get_card_raw(
    db: &MongoDB,
    cache: &TtlCache,
    scryfall_id: &str,
) -> Result<Value, AppError> {
    let url = format!("{}/cards/{}", SCRYFALL_API_BASE, scryfall_id);
    let data = fetch_json(cache, &url).await?;

    if let Ok(parsed) = serde_json::from_value::<ScryfallCard>(data.clone()) {
        upsert_card(db, Card::from(parsed)).await?;
    }
    Ok(data)
}

/// Denormalized card metadata, served from MongoDB when already cached,
/// fetched from Scryfall (and upserted) otherwise.
pub async fn get_card(db: &MongoDB, cache: &TtlCache, scryfall_id: &str) -> Result<Card, AppError> {
    let cards = db.collection::<Card>("cards");

    if let Some(card) = cards
        .find_one(doc! { "scryfall_id": scryfall_id })
        .await
        .map_err(AppError::database)?
    {
        return Ok(card);
    }

    let url = format!("{}/cards/{}", SCRYFALL_API_BASE, scryfall_id);
    let data = fetch_json(cache, &url).await?;

    let parsed: ScryfallCard = serde_json::from_value(data)
        .map_err(|e| AppError::Upstream(format!("Unexpected Scryfall card shape: {}", e)))?;
    let card = Card::from(parsed);
    upsert_card(db, card.clone()).await?;
    Ok(card)
}

async fn upsert_card(db: &MongoDB, card: Card) -> Result<(), AppError> {
    let cards = db.collection::<Card>("cards");
    cards
        .replace_one(doc! { "scryfall_id": &card.scryfall_id }, &card)
        .upsert(true)
        .await
        .map_err(AppError::database)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_and_localizes() {
        let url = search_url("t:creature c:g", None, true);
        assert!(url.starts_with("https://api.scryfall.com/cards/search?q="));
        assert!(url.contains("t%3Acreature%20c%3Ag%20lang%3Afr"));
        assert!(url.contains("include_multilingual=true"));
        assert!(!url.contains("page="));
    }

    #[test]
    fn test_search_url_english_fallback_has_no_lang() {
        let url = search_url("goblin", Some(2), false);
        assert!(!url.contains("lang%3Afr"));
        assert!(url.ends_with("&page=2"));
    }

    #[test]
    fn test_negative_marker_skips_french_retry() {
        let cache = TtlCache::new(std::time::Duration::from_secs(60), 10);
        let url = search_url("goblin", None, true);
        assert!(!has_negative_marker(&cache, &url));

        cache.put(url.clone(), Value::Null);
        assert!(has_negative_marker(&cache, &url));

        // un vrai résultat n'est pas un marqueur négatif
        cache.put(url.clone(), serde_json::json!({"data": []}));
        assert!(!has_negative_marker(&cache, &url));
    }

    #[test]
    fn test_named_url_fuzzy_vs_exact() {
        assert!(named_url("Llanowar Elves", false).contains("fuzzy=Llanowar%20Elves"));
        assert!(named_url("Llanowar Elves", true).contains("exact=Llanowar%20Elves"));
    }
}
