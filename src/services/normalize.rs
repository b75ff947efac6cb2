// src/services/normalize.rs

//! Response normalizer.
//!
//! Maps loosely typed upstream records into the crate's stable shapes.
//! Every function here is total over `serde_json::Value`: missing or renamed
//! fields fall back to defaults instead of failing the whole payload.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{CategoryNode, Listing, ListingsMeta, ListingsRequest, ListingsResponse, Money};
use crate::services::image::placeholder_url;

pub const UNTITLED: &str = "Untitled";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const UNCATEGORIZED: &str = "Uncategorized";
pub const DEFAULT_CONDITION: &str = "good";

fn title_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\(\d+\)\s*$").expect("title suffix pattern is valid"))
}

// --- Scalar coercion ---

/// First non-empty string among `keys`, trimmed.
fn first_str<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn first_value<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .find(|v| !v.is_null())
}

fn parse_decimal(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches(['£', '$', '€'])
                .chars()
                .filter(|c| *c != ',')
                .collect();
            cleaned.trim().parse::<f64>().ok()
        }
        _ => None,
    }
}

/// Coerce a number or numeric string into money. Malformed input yields zero.
pub fn coerce_money(value: &Value) -> Money {
    parse_decimal(value).map(Money::from_decimal).unwrap_or(Money::ZERO)
}

/// Coerce a number or numeric string into a non-negative integer.
pub fn coerce_u64(value: &Value) -> u64 {
    match parse_decimal(value) {
        Some(n) if n.is_finite() && n > 0.0 => n.floor() as u64,
        _ => 0,
    }
}

fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

fn coerce_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

// --- Text cleanup ---

/// Trim a title and strip a trailing parenthesized numeric SKU.
pub fn clean_title(raw: &str) -> String {
    let trimmed = raw.trim();
    let cleaned = title_suffix().replace(trimmed, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        UNTITLED.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Derive a URL slug from a display name.
///
/// Lowercases, turns whitespace runs into `-`, and drops anything that is
/// not an ASCII letter, digit or hyphen.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

// --- Listings ---

fn discounted_price(record: &Value) -> Option<Money> {
    if let Some(discount) = record.get("discount").filter(|d| d.is_object()) {
        let active = first_value(discount, &["active", "isActive", "enabled"]).is_some_and(coerce_bool);
        if !active {
            return None;
        }
        return first_value(discount, &["price", "discountedPrice", "amount"])
            .map(coerce_money)
            .filter(|m| !m.is_zero());
    }

    let active = first_value(record, &["isDiscounted", "discountActive", "onSale"]).is_some_and(coerce_bool);
    if !active {
        return None;
    }
    first_value(record, &["discountedPrice", "salePrice"])
        .map(coerce_money)
        .filter(|m| !m.is_zero())
}

fn image_field(record: &Value) -> Option<String> {
    if let Some(url) = first_str(record, &["imageUrl", "image", "coverImage", "thumbnail"]) {
        return Some(url.to_string());
    }
    let first = record.get("images")?.as_array()?.first()?;
    match first {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(_) => first_str(first, &["url", "src"]).map(str::to_string),
        _ => None,
    }
}

/// Normalize a single raw listing record.
pub fn normalize_listing(record: &Value) -> Listing {
    let title = first_str(record, &["title", "name"])
        .map(clean_title)
        .unwrap_or_else(|| UNTITLED.to_string());
    let isbn = first_str(record, &["isbn", "isbn13", "isbn10"]).unwrap_or("").to_string();
    let subcategory = first_str(record, &["subcategory", "subCategory"])
        .unwrap_or("")
        .to_string();
    let category = first_str(record, &["category"])
        .map(str::to_string)
        .or_else(|| (!subcategory.is_empty()).then(|| subcategory.clone()))
        .unwrap_or_else(|| UNCATEGORIZED.to_string());
    let image_url = image_field(record).unwrap_or_else(|| placeholder_url(&isbn, &title, &category));

    Listing {
        id: first_value(record, &["_id", "id", "listingId"])
            .map(|v| match v {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .unwrap_or_default(),
        author: first_str(record, &["author", "authors"])
            .unwrap_or(UNKNOWN_AUTHOR)
            .to_string(),
        price: record.get("price").map(coerce_money).unwrap_or(Money::ZERO),
        discounted_price: discounted_price(record),
        image_url,
        condition: first_str(record, &["condition"])
            .map(str::to_lowercase)
            .unwrap_or_else(|| DEFAULT_CONDITION.to_string()),
        description: first_str(record, &["description", "summary"])
            .unwrap_or("")
            .to_string(),
        stock: first_value(record, &["stock", "quantity", "inventory"])
            .map(coerce_u64)
            .map(|n| n.min(u64::from(u32::MAX)) as u32)
            .unwrap_or(0),
        views: first_value(record, &["views", "viewCount"]).map(coerce_u64).unwrap_or(0),
        purchases: first_value(record, &["purchases", "purchaseCount", "sold"])
            .map(coerce_u64)
            .unwrap_or(0),
        listed_at: first_value(record, &["listedAt", "createdAt"]).and_then(coerce_timestamp),
        updated_at: first_value(record, &["updatedAt"]).and_then(coerce_timestamp),
        title,
        category,
        subcategory,
        isbn,
    }
}

fn normalize_records(records: &[Value]) -> Vec<Listing> {
    records.iter().map(normalize_listing).collect()
}

fn parse_meta(payload: &Value, request: &ListingsRequest, listed: usize) -> ListingsMeta {
    let derived = ListingsMeta::derived(listed as u64, request.page, request.limit);
    let Some(meta) = payload.get("meta").filter(|m| m.is_object()) else {
        return derived;
    };

    let count = meta.get("count").or_else(|| meta.get("total")).map(coerce_u64).unwrap_or(derived.count);
    let page = meta.get("page").map(coerce_u64).filter(|p| *p > 0).map(|p| p as u32);
    let limit = meta.get("limit").map(coerce_u64).filter(|l| *l > 0).map(|l| l as u32);
    let page = page.unwrap_or(request.page);
    let limit = limit.unwrap_or(request.limit);
    let pages = meta
        .get("pages")
        .map(coerce_u64)
        .filter(|p| *p > 0)
        .map(|p| p as u32)
        .unwrap_or_else(|| ListingsMeta::derived(count, page, limit).pages);

    ListingsMeta {
        count,
        page,
        limit,
        pages,
        estimated: false,
    }
}

/// Validate and normalize a `POST /listings` payload.
pub fn normalize_listings_payload(
    endpoint: &str,
    payload: &Value,
    request: &ListingsRequest,
) -> Result<ListingsResponse> {
    if !payload.get("success").is_some_and(coerce_bool) {
        return Err(AppError::malformed(endpoint, "response did not report success"));
    }
    let records = payload
        .get("listings")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::malformed(endpoint, "missing listings array"))?;

    let listings = normalize_records(records);
    let meta = parse_meta(payload, request, listings.len());

    let shelves: BTreeMap<String, Vec<Listing>> = payload
        .get("shelves")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(name, v)| v.as_array().map(|r| (name.clone(), normalize_records(r))))
                .collect()
        })
        .unwrap_or_default();

    Ok(ListingsResponse {
        success: true,
        listings,
        meta,
        shelves,
    })
}

/// Validate and normalize a `GET /search` payload.
///
/// Accepts either a bare array or an object wrapping `results`.
pub fn normalize_search_payload(endpoint: &str, payload: &Value) -> Result<Vec<Listing>> {
    let records = match payload {
        Value::Array(records) => records,
        Value::Object(_) => first_value(payload, &["results", "listings"])
            .and_then(Value::as_array)
            .ok_or_else(|| AppError::malformed(endpoint, "missing results array"))?,
        _ => return Err(AppError::malformed(endpoint, "expected an array or object")),
    };
    Ok(normalize_records(records))
}

// --- Categories ---

fn normalize_category(raw: &Value, child_keys: &[&str]) -> Option<CategoryNode> {
    let name = first_str(raw, &["name"])?.to_string();
    let count = raw.get("count").map(coerce_u64).unwrap_or(0);
    if count == 0 {
        return None;
    }
    let slug = first_str(raw, &["slug"])
        .map(str::to_string)
        .unwrap_or_else(|| slugify(&name));

    let mut children: Vec<CategoryNode> = first_value(raw, child_keys)
        .and_then(Value::as_array)
        .map(|subs| subs.iter().filter_map(|s| normalize_category(s, &[])).collect())
        .unwrap_or_default();
    children.sort_by_cached_key(|c| c.name.to_lowercase());

    Some(CategoryNode {
        name,
        slug,
        count,
        children,
    })
}

/// Validate and normalize a `GET /categories` payload.
///
/// Nodes with an empty name or a non-positive count are dropped; both levels
/// are returned sorted by name.
pub fn normalize_categories_payload(endpoint: &str, payload: &Value) -> Result<Vec<CategoryNode>> {
    if payload.get("success").is_some_and(|s| !coerce_bool(s)) {
        return Err(AppError::malformed(endpoint, "response reported failure"));
    }
    let raw = payload
        .get("categories")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::malformed(endpoint, "missing categories array"))?;

    let mut categories: Vec<CategoryNode> = raw
        .iter()
        .filter_map(|c| normalize_category(c, &["subcategories", "children"]))
        .collect();
    categories.sort_by_cached_key(|c| c.name.to_lowercase());
    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_get_defaults() {
        let listing = normalize_listing(&json!({"_id": "abc"}));
        assert_eq!(listing.id, "abc");
        assert_eq!(listing.title, "Untitled");
        assert_eq!(listing.author, "Unknown Author");
        assert_eq!(listing.price, Money::ZERO);
        assert_eq!(listing.category, "Uncategorized");
        assert_eq!(listing.condition, "good");
        assert_eq!(listing.stock, 0);
        assert!(listing.discounted_price.is_none());
    }

    #[test]
    fn test_invalid_price_coerces_to_zero() {
        assert_eq!(normalize_listing(&json!({"price": "abc"})).price, Money::ZERO);
        assert_eq!(normalize_listing(&json!({"price": -4.0})).price, Money::ZERO);
        assert_eq!(normalize_listing(&json!({"price": null})).price, Money::ZERO);
        assert_eq!(normalize_listing(&json!({"price": "£1,204.50"})).price.pence(), 120_450);
        assert_eq!(normalize_listing(&json!({"price": 7})).price.pence(), 700);
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("Gone Girl (1029)"), "Gone Girl");
        assert_eq!(clean_title("  Gone Girl  "), "Gone Girl");
        assert_eq!(clean_title("Catch (22) Stories"), "Catch (22) Stories");
        assert_eq!(clean_title("(1029)"), "Untitled");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Self-Help!"), "self-help");
        assert_eq!(slugify("  Science   Fiction "), "science-fiction");
        assert_eq!(slugify("Children's Books"), "childrens-books");
    }

    #[test]
    fn test_discount_only_when_active() {
        let inactive = json!({"price": 10, "discount": {"active": false, "price": 5}});
        assert!(normalize_listing(&inactive).discounted_price.is_none());

        let active = json!({"price": 10, "discount": {"active": true, "price": 5}});
        assert_eq!(
            normalize_listing(&active).discounted_price,
            Some(Money::from_pence(500))
        );

        let flat = json!({"price": 10, "isDiscounted": true, "discountedPrice": "6.00"});
        assert_eq!(
            normalize_listing(&flat).discounted_price,
            Some(Money::from_pence(600))
        );
    }

    #[test]
    fn test_category_falls_back_to_subcategory() {
        let listing = normalize_listing(&json!({"subcategory": "Drama"}));
        assert_eq!(listing.category, "Drama");
        assert_eq!(listing.subcategory, "Drama");
    }

    #[test]
    fn test_image_synthesized_when_absent() {
        let raw = json!({"title": "Dune", "isbn": "9780441013593", "category": "Fiction"});
        let listing = normalize_listing(&raw);
        assert!(listing.image_url.contains("/300/450"));
        assert_eq!(listing.image_url, normalize_listing(&raw).image_url);

        let with_image = json!({"images": [{"url": "https://cdn.example/dune.jpg"}]});
        assert_eq!(
            normalize_listing(&with_image).image_url,
            "https://cdn.example/dune.jpg"
        );
    }

    #[test]
    fn test_condition_lowercased_and_timestamps_parsed() {
        let listing = normalize_listing(&json!({
            "condition": "Like New",
            "listedAt": "2026-01-02T03:04:05Z",
            "updatedAt": 1767225600000i64,
            "views": "12",
            "purchases": 3
        }));
        assert_eq!(listing.condition, "like new");
        assert!(listing.listed_at.is_some());
        assert!(listing.updated_at.is_some());
        assert_eq!(listing.views, 12);
        assert_eq!(listing.purchases, 3);
    }

    #[test]
    fn test_listings_payload_requires_success() {
        let req = ListingsRequest::default();
        assert!(normalize_listings_payload("/listings", &json!({"listings": []}), &req).is_err());
        assert!(
            normalize_listings_payload("/listings", &json!({"success": true}), &req).is_err()
        );
        assert!(
            normalize_listings_payload("/listings", &json!({"success": true, "listings": {}}), &req)
                .is_err()
        );
    }

    #[test]
    fn test_listings_payload_derives_meta() {
        let req = ListingsRequest::default().with_limit(2);
        let payload = json!({"success": true, "listings": [{"title": "A"}, {"title": "B"}]});
        let res = normalize_listings_payload("/listings", &payload, &req).unwrap();
        assert_eq!(res.meta, ListingsMeta { count: 2, page: 1, limit: 2, pages: 1, estimated: true });

        let payload = json!({
            "success": true,
            "listings": [],
            "meta": {"count": 95, "page": 3, "limit": 20},
            "shelves": {"staffPicks": [{"title": "C"}]}
        });
        let res = normalize_listings_payload("/listings", &payload, &req).unwrap();
        assert_eq!(res.meta.pages, 5);
        assert!(!res.meta.estimated);
        assert_eq!(res.meta.page, 3);
        assert_eq!(res.shelves["staffPicks"][0].title, "C");
    }

    #[test]
    fn test_categories_drop_zero_counts() {
        let payload = json!({
            "categories": [
                {"name": "Fiction", "count": 5, "subcategories": [{"name": "Drama", "count": 0}]}
            ]
        });
        let cats = normalize_categories_payload("/categories", &payload).unwrap();
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].name, "Fiction");
        assert_eq!(cats[0].slug, "fiction");
        assert!(cats[0].children.is_empty());
    }

    #[test]
    fn test_categories_sorted_and_blank_names_dropped() {
        let payload = json!({
            "success": true,
            "categories": [
                {"name": "Travel", "count": 2},
                {"name": "   ", "count": 9},
                {"name": "Art", "count": "4", "slug": "arts", "subcategories": [
                    {"name": "Sculpture", "count": 1},
                    {"name": "", "count": 3},
                    {"name": "Painting", "count": 2}
                ]},
                {"name": "Poetry", "count": 0}
            ]
        });
        let cats = normalize_categories_payload("/categories", &payload).unwrap();
        let names: Vec<_> = cats.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Art", "Travel"]);
        assert_eq!(cats[0].slug, "arts");
        let children: Vec<_> = cats[0].children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(children, ["Painting", "Sculpture"]);
    }

    #[test]
    fn test_categories_sort_ignores_case() {
        let payload = json!({
            "categories": [
                {"name": "Zoology", "count": 1},
                {"name": "art", "count": 1, "subcategories": [
                    {"name": "sculpture", "count": 1},
                    {"name": "Painting", "count": 1}
                ]},
                {"name": "Biography", "count": 1}
            ]
        });
        let cats = normalize_categories_payload("/categories", &payload).unwrap();
        let names: Vec<_> = cats.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["art", "Biography", "Zoology"]);
        let children: Vec<_> = cats[0].children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(children, ["Painting", "sculpture"]);
    }

    #[test]
    fn test_categories_reported_failure() {
        let payload = json!({"success": false, "categories": []});
        assert!(normalize_categories_payload("/categories", &payload).is_err());
    }

    #[test]
    fn test_search_payload_shapes() {
        let bare = json!([{"title": "A"}]);
        assert_eq!(normalize_search_payload("/search", &bare).unwrap().len(), 1);

        let wrapped = json!({"results": [{"title": "A"}, {"title": "B"}]});
        assert_eq!(normalize_search_payload("/search", &wrapped).unwrap().len(), 2);

        assert!(normalize_search_payload("/search", &json!("nope")).is_err());
    }
}
