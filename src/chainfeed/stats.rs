//! Derived display statistics for content items.
//!
//! `stats` is a pure function of a content item's raw fields. The reducer
//! recomputes it at fixed trigger points: on every bulk state receive, on
//! every feed-page upsert, and once when a recent-posts item is first
//! inserted. Nothing here reads or writes the document.

use once_cell::sync::Lazy;
use serde_json::Value as Json;

use crate::value::Value;

/// Net rshares below this marks a post gray (downvoted into the noise).
const GRAY_THRESHOLD: i64 = -9_999_999_999;
/// Net rshares below this hides the post outright.
const HIDE_THRESHOLD: i64 = -16_400_000_000;
/// Author reputation (log10 scale) above which downvotes never gray/hide.
const REP_IMMUNITY: f64 = 65.0;

/// Default field set merged under every content item arriving in a bulk
/// state snapshot, so partially-populated items still carry the fields the
/// stats computation and the rendering layer read.
pub static EMPTY_CONTENT: Lazy<Value> = Lazy::new(|| {
    Value::from_json(serde_json::json!({
        "author": "",
        "permlink": "",
        "category": "",
        "parent_author": "",
        "parent_permlink": "",
        "title": "",
        "body": "",
        "json_metadata": "{}",
        "active_votes": [],
        "replies": [],
        "children": 0,
        "depth": 0,
        "net_rshares": 0,
        "author_reputation": 0,
        "pending_payout_value": "0.000 SBD",
        "total_payout_value": "0.000 SBD",
        "stats": {},
    }))
});

/// Compute the derived `stats` record for one content item.
pub fn content_stats(item: &Value) -> Value {
    let mut total_votes: i64 = 0;
    let mut up_votes: i64 = 0;
    let mut net_rshares: i64 = 0;
    let mut neg_rshares: i64 = 0;

    if let Some(votes) = item.get("active_votes").and_then(Value::as_seq) {
        for vote in votes {
            let percent = int_field(vote, "percent").unwrap_or(0);
            if percent == 0 {
                continue;
            }
            total_votes += 1;
            if percent > 0 {
                up_votes += 1;
            }
            let rshares = int_field(vote, "rshares").unwrap_or(0);
            net_rshares = net_rshares.saturating_add(rshares);
            if percent < 0 {
                neg_rshares = neg_rshares.saturating_add(rshares);
            }
        }
    }

    let author_rep = item
        .get("author_reputation")
        .and_then(parse_int)
        .unwrap_or(0);
    let rep = rep_log10(author_rep);

    let gray = rep < 1.0 || (rep < REP_IMMUNITY && net_rshares < GRAY_THRESHOLD);
    let hide = rep < 0.0 || (rep < REP_IMMUNITY && net_rshares < HIDE_THRESHOLD);
    let is_nsfw = metadata_tags(item).iter().any(|t| t == "nsfw");
    let children = int_field(item, "children").unwrap_or(0);

    let mut stats = Value::map();
    stats.set_in(&["hide"], Value::Bool(hide));
    stats.set_in(&["gray"], Value::Bool(gray));
    stats.set_in(&["pictures"], Value::Bool(!gray));
    stats.set_in(&["is_nsfw"], Value::Bool(is_nsfw));
    stats.set_in(&["author_rep_log10"], Value::Float(rep));
    stats.set_in(&["total_votes"], Value::Int(total_votes));
    stats.set_in(&["up_votes"], Value::Int(up_votes));
    stats.set_in(&["flag_weight"], Value::Int(flag_weight(neg_rshares)));
    stats.set_in(
        &["has_pending_payout"],
        Value::Bool(has_pending_payout(item)),
    );
    stats.set_in(
        &["allow_delete"],
        Value::Bool(total_votes == 0 && children == 0),
    );
    stats
}

/// Raw chain reputation to the familiar log10 display scale (25 = neutral,
/// 9 points per order of magnitude).
fn rep_log10(raw: i64) -> f64 {
    if raw == 0 {
        return 25.0;
    }
    let magnitude = ((raw.unsigned_abs() as f64) + 1.0).log10() - 9.0;
    let signed = if raw < 0 { -magnitude } else { magnitude };
    signed * 9.0 + 25.0
}

/// Downvote severity bucket derived from accumulated negative rshares.
fn flag_weight(neg_rshares: i64) -> i64 {
    let digits = neg_rshares.unsigned_abs().to_string().len() as i64;
    (digits - 11).max(0)
}

fn has_pending_payout(item: &Value) -> bool {
    match item.get("pending_payout_value") {
        // Asset strings look like "1.234 SBD".
        Some(Value::Str(s)) => s
            .split_whitespace()
            .next()
            .and_then(|amount| amount.parse::<f64>().ok())
            .map(|amount| amount > 0.0)
            .unwrap_or(false),
        Some(Value::Int(n)) => *n > 0,
        Some(Value::Float(f)) => *f > 0.0,
        _ => false,
    }
}

/// Tags from `json_metadata`, which arrives either as a JSON-encoded string
/// or as an already-parsed object.
fn metadata_tags(item: &Value) -> Vec<String> {
    match item.get("json_metadata") {
        Some(Value::Str(raw)) => serde_json::from_str::<Json>(raw)
            .ok()
            .and_then(|meta| json_string_list(meta.get("tags")))
            .unwrap_or_default(),
        Some(Value::Map(meta)) => meta
            .get("tags")
            .and_then(Value::as_seq)
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn json_string_list(json: Option<&Json>) -> Option<Vec<String>> {
    json.and_then(Json::as_array).map(|items| {
        items
            .iter()
            .filter_map(|t| t.as_str().map(str::to_string))
            .collect()
    })
}

/// Integer field that may arrive as a number or a decimal string (the chain
/// serializes 64-bit quantities as strings).
fn int_field(value: &Value, key: &str) -> Option<i64> {
    value.get(key).and_then(parse_int)
}

fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Int(n) => Some(*n),
        Value::Float(f) => Some(*f as i64),
        Value::Str(s) => s.parse().ok(),
        _ => None,
    }
}
