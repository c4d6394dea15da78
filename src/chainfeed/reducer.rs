//! # Transition table
//!
//! `apply_at(document, action, now) -> document'` is the pure fold step.
//! Every recognized action maps to exactly one arm below; the function is
//! total and deterministic (the clock arrives as an argument, never read
//! here). No arm performs I/O and no arm leaves a half-written snapshot:
//! the input document is untouched, the returned one is complete.

use chrono::{DateTime, Utc};
use serde_json::Value as Json;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::action::Action;
use crate::document::Document;
use crate::stats::{content_stats, EMPTY_CONTENT};
use crate::value::Value;

/// Feed orders whose key lists live under the account record rather than
/// the discussion index.
const ACCOUNT_ORDERS: [&str; 4] = ["by_author", "by_feed", "by_comments", "by_replies"];

/// Apply one action using the current wall clock.
pub fn apply(doc: &Document, action: &Action) -> Document {
    apply_at(doc, action, Utc::now())
}

/// Apply one action at an explicit instant (`now` feeds `last_fetch`).
pub fn apply_at(doc: &Document, action: &Action, now: DateTime<Utc>) -> Document {
    let mut next = doc.clone();
    match action {
        Action::ReceiveState { state } => receive_state(&mut next, state),

        Action::ReceiveAccount { account } => {
            merge_account(next.root_mut(), Value::normalize_account(account.clone()));
        }

        Action::ReceiveAccounts { accounts } => {
            for account in accounts {
                merge_account(next.root_mut(), Value::normalize_account(account.clone()));
            }
        }

        Action::UpdateAccountWitnessVote {
            account,
            witness,
            approve,
        } => {
            next.root_mut().update_in(
                &["accounts", account.as_str(), "witness_votes"],
                Value::set(),
                |votes| {
                    let mut set = coerce_string_set(&votes);
                    if *approve {
                        set.insert(witness.clone());
                    } else {
                        set.remove(witness);
                    }
                    Value::Set(Arc::new(set))
                },
            );
        }

        Action::UpdateAccountWitnessProxy { account, proxy } => {
            next.root_mut()
                .set_in(&["accounts", account.as_str(), "proxy"], Value::from(proxy.clone()));
        }

        Action::FetchingData { category, order } => {
            let category = category.as_deref().unwrap_or("");
            let mut status = Value::map();
            status.set_in(&["fetching"], Value::Bool(true));
            next.root_mut().set_in(&["status", category, order.as_str()], status);
        }

        Action::ReceiveData {
            data,
            order,
            category,
            accountname,
            fetching,
            end_of_data,
        } => {
            let category = category.as_deref().unwrap_or("");
            let keys: Vec<String> = data.iter().map(content_key).collect();

            if ACCOUNT_ORDERS.contains(&order.as_str()) {
                // Account-scoped feeds key their post list under the
                // profile being viewed.
                let accountname = accountname.as_deref().unwrap_or("");
                append_absent(
                    next.root_mut(),
                    &["accounts", accountname, category],
                    &keys,
                );
            } else {
                append_absent(
                    next.root_mut(),
                    &["discussion_idx", category, order.as_str()],
                    &keys,
                );
            }

            // Unlike recent-posts, a feed page always refreshes content.
            for item in data {
                let key = content_key(item);
                let mut value = Value::from_json(item.clone());
                let stats = content_stats(&value);
                value.set_in(&["stats"], stats);
                next.root_mut().set_in(&["content", key.as_str()], value);
            }

            let mut status = Value::map();
            status.set_in(&["fetching"], Value::Bool(*fetching));
            if *end_of_data {
                status.set_in(&["last_fetch"], Value::Str(now.to_rfc3339()));
            }
            next.root_mut().set_in(&["status", category, order.as_str()], status);
        }

        Action::ReceiveRecentPosts { data } => {
            next.root_mut().update_in(
                &["discussion_idx", "", "created"],
                Value::seq(),
                |mut list| {
                    let entries = list.make_seq();
                    for item in data {
                        let key = content_key(item);
                        let present = entries.iter().any(|e| e.as_str() == Some(key.as_str()));
                        if !present {
                            entries.insert(0, Value::Str(key));
                        }
                    }
                    list
                },
            );
            // Insert-if-absent: a live feed must not clobber content the
            // user may already be reading.
            for item in data {
                let key = content_key(item);
                if next.content(&key).is_none() {
                    let mut value = Value::from_json(item.clone());
                    let stats = content_stats(&value);
                    value.set_in(&["stats"], stats);
                    next.root_mut().set_in(&["content", key.as_str()], value);
                }
            }
        }

        Action::RequestMeta { id, link } => {
            let mut record = Value::map();
            record.set_in(&["link"], Value::from(link.clone()));
            next.root_mut().set_in(&["metaLinkData", id.as_str()], record);
        }

        Action::ReceiveMeta { id, meta } => {
            let incoming = Value::from_json(meta.clone());
            next.root_mut()
                .update_in(&["metaLinkData", id.as_str()], Value::map(), |mut record| {
                    if let Some(fields) = incoming.as_map() {
                        let target = record.make_map();
                        for (k, v) in fields.iter() {
                            target.insert(k, v.clone());
                        }
                    }
                    record
                });
        }

        Action::Set { key, value } => {
            // An empty key would replace the document root; identity instead.
            if !key.is_empty() {
                next.root_mut().set_in(key, Value::from_json(value.clone()));
            }
        }

        Action::Remove { key } => {
            if !key.is_empty() {
                next.root_mut().remove_in(key);
            }
        }

        Action::Update {
            key,
            fallback,
            updater,
        } => {
            next.root_mut()
                .update_in(key, fallback.clone(), |value| updater(value));
        }

        Action::SetMetaData { id, meta } => {
            next.root_mut()
                .set_in(&["metaLinkData", id.as_str()], Value::from_json(meta.clone()));
        }

        Action::ClearMeta { id } => {
            next.root_mut().remove_in(&["metaLinkData", id.as_str()]);
        }

        Action::ClearMetaElement { form_id, element } => {
            next.root_mut().remove_in(&["metaLinkData", form_id.as_str(), element.as_str()]);
        }

        Action::FetchJson => {}

        Action::FetchJsonResult { id, result, error } => {
            // Written at a top-level key named by the caller's id. Known
            // collision hazard with reserved names like `accounts`; kept
            // for compatibility with existing consumers of the flat key.
            let mut record = Value::map();
            record.set_in(&["result"], Value::from_json(result.clone()));
            record.set_in(&["error"], Value::from_json(error.clone()));
            next.root_mut().set_in(&[id.as_str()], record);
        }

        Action::ShowDialog { name, params } => {
            let params = if params.is_null() {
                Value::map()
            } else {
                Value::from_json(params.clone())
            };
            let mut record = Value::map();
            record.set_in(&["params"], params);
            next.root_mut().set_in(&["active_dialogs", name.as_str()], record);
        }

        Action::HideDialog { name } => {
            next.root_mut().remove_in(&["active_dialogs", name.as_str()]);
        }

        Action::AddActiveWitnessVote { account, witness } => {
            let key = active_vote_key(account);
            next.root_mut()
                .update_in(&[key.as_str()], Value::set(), |votes| {
                    let mut set = coerce_string_set(&votes);
                    set.insert(witness.clone());
                    Value::Set(Arc::new(set))
                });
        }

        Action::RemoveActiveWitnessVote { account, witness } => {
            let key = active_vote_key(account);
            if next.get(&key).is_some() {
                next.root_mut()
                    .update_in(&[key.as_str()], Value::set(), |votes| {
                        let mut set = coerce_string_set(&votes);
                        set.remove(witness);
                        Value::Set(Arc::new(set))
                    });
            }
        }
    }
    next
}

/// Bulk snapshot merge. Content stats are recomputed for every incoming
/// item (over the item merged with the default template), then the whole
/// snapshot deep-merges additively, except `transfer_history`, which is
/// replaced wholesale for exactly the accounts the snapshot covers, because
/// deep-merging two partial histories would interleave them corruptly.
fn receive_state(next: &mut Document, state: &Json) {
    let mut incoming = Value::from_json(state.clone());

    let content_keys: Vec<String> = incoming
        .get("content")
        .and_then(Value::as_map)
        .map(|content| content.keys().map(str::to_string).collect())
        .unwrap_or_default();
    for key in &content_keys {
        let item = incoming
            .get_in(&["content", key.as_str()])
            .cloned()
            .unwrap_or_else(Value::map);
        let mut templated = EMPTY_CONTENT.clone();
        templated.deep_merge(item);
        let stats = content_stats(&templated);
        incoming.set_in(&["content", key.as_str(), "stats"], stats);
    }

    let histories: Vec<(String, Value)> = incoming
        .get("accounts")
        .and_then(Value::as_map)
        .map(|accounts| {
            accounts
                .iter()
                .filter_map(|(name, account)| {
                    account
                        .get("transfer_history")
                        .map(|history| (name.to_string(), history.clone()))
                })
                .collect()
        })
        .unwrap_or_default();

    next.root_mut().deep_merge(incoming);

    for (name, history) in histories {
        next.root_mut()
            .set_in(&["accounts", name.as_str(), "transfer_history"], history);
    }
}

/// Additive account merge: a partial record from a list endpoint must never
/// erase fields a prior full record already supplied.
fn merge_account(root: &mut Value, account: Value) {
    let Some(name) = account.get("name").and_then(Value::as_str).map(String::from) else {
        return;
    };
    root.update_in(&["accounts", name.as_str()], Value::map(), |mut existing| {
        existing.deep_merge(account);
        existing
    });
}

/// Idempotent back-append of content keys into an ordered list, creating
/// the list when absent. First-seen position is preserved.
fn append_absent<S: AsRef<str>>(root: &mut Value, path: &[S], keys: &[String]) {
    root.update_in(path, Value::seq(), |mut list| {
        let entries = list.make_seq();
        for key in keys {
            let present = entries.iter().any(|e| e.as_str() == Some(key.as_str()));
            if !present {
                entries.push(Value::Str(key.clone()));
            }
        }
        list
    });
}

fn content_key(item: &Json) -> String {
    let author = item.get("author").and_then(Json::as_str).unwrap_or("");
    let permlink = item.get("permlink").and_then(Json::as_str).unwrap_or("");
    format!("{author}/{permlink}")
}

fn active_vote_key(account: &str) -> String {
    format!("transaction_witness_vote_active_{account}")
}

/// Read an existing value as a string set, accepting a raw sequence (as a
/// not-yet-normalized snapshot would hold) and falling back to empty.
fn coerce_string_set(value: &Value) -> BTreeSet<String> {
    match value {
        Value::Set(set) => (**set).clone(),
        Value::Seq(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => BTreeSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apply_all(doc: Document, actions: &[Action]) -> Document {
        actions.iter().fold(doc, |doc, action| apply(&doc, action))
    }

    fn list_of(doc: &Document, path: &[&str]) -> Vec<String> {
        doc.get_in(path)
            .and_then(Value::as_seq)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn account_merge_is_additive() {
        let doc = apply_all(
            Document::new(),
            &[
                Action::ReceiveAccount {
                    account: json!({"name": "alice", "f1": "full-detail"}),
                },
                Action::ReceiveAccount {
                    account: json!({"name": "alice", "f2": "list-partial"}),
                },
            ],
        );
        let alice = doc.account("alice").unwrap();
        assert_eq!(alice.get("f1"), Some(&Value::from("full-detail")));
        assert_eq!(alice.get("f2"), Some(&Value::from("list-partial")));
    }

    #[test]
    fn accounts_batch_folds_left_to_right() {
        let doc = apply(
            &Document::new(),
            &Action::ReceiveAccounts {
                accounts: vec![
                    json!({"name": "alice", "balance": "1.000"}),
                    json!({"name": "bob", "balance": "2.000"}),
                    json!({"name": "alice", "balance": "3.000"}),
                ],
            },
        );
        assert_eq!(
            doc.account("alice").unwrap().get("balance"),
            Some(&Value::from("3.000"))
        );
        assert!(doc.account("bob").is_some());
    }

    #[test]
    fn witness_vote_toggle() {
        let mut doc = apply(
            &Document::new(),
            &Action::ReceiveAccount {
                account: json!({"name": "alice", "witness_votes": ["w1"]}),
            },
        );
        doc = apply(
            &doc,
            &Action::UpdateAccountWitnessVote {
                account: "alice".into(),
                witness: "w2".into(),
                approve: true,
            },
        );
        let votes = doc
            .get_in(&["accounts", "alice", "witness_votes"])
            .and_then(Value::as_set)
            .unwrap();
        assert!(votes.contains("w1") && votes.contains("w2"));

        doc = apply(
            &doc,
            &Action::UpdateAccountWitnessVote {
                account: "alice".into(),
                witness: "w1".into(),
                approve: false,
            },
        );
        let votes = doc
            .get_in(&["accounts", "alice", "witness_votes"])
            .and_then(Value::as_set)
            .unwrap();
        assert!(!votes.contains("w1") && votes.contains("w2"));
    }

    #[test]
    fn witness_vote_creates_set_when_absent() {
        let doc = apply(
            &Document::new(),
            &Action::UpdateAccountWitnessVote {
                account: "alice".into(),
                witness: "w1".into(),
                approve: true,
            },
        );
        let votes = doc
            .get_in(&["accounts", "alice", "witness_votes"])
            .and_then(Value::as_set)
            .unwrap();
        assert_eq!(votes.len(), 1);
    }

    #[test]
    fn proxy_update_is_full_replace() {
        let doc = apply_all(
            Document::new(),
            &[
                Action::UpdateAccountWitnessProxy {
                    account: "alice".into(),
                    proxy: "bob".into(),
                },
                Action::UpdateAccountWitnessProxy {
                    account: "alice".into(),
                    proxy: "carol".into(),
                },
            ],
        );
        assert_eq!(
            doc.get_in(&["accounts", "alice", "proxy"]),
            Some(&Value::from("carol"))
        );
    }

    #[test]
    fn feed_append_is_idempotent() {
        let page = Action::ReceiveData {
            data: vec![
                json!({"author": "alice", "permlink": "p1"}),
                json!({"author": "bob", "permlink": "p2"}),
            ],
            order: "trending".into(),
            category: Some("life".into()),
            accountname: None,
            fetching: false,
            end_of_data: false,
        };
        let once = apply(&Document::new(), &page);
        let twice = apply(&once, &page);
        let expected = vec!["alice/p1".to_string(), "bob/p2".to_string()];
        assert_eq!(list_of(&once, &["discussion_idx", "life", "trending"]), expected);
        assert_eq!(
            list_of(&twice, &["discussion_idx", "life", "trending"]),
            expected
        );
    }

    #[test]
    fn account_orders_append_under_profile() {
        let doc = apply(
            &Document::new(),
            &Action::ReceiveData {
                data: vec![json!({"author": "alice", "permlink": "post1"})],
                order: "by_author".into(),
                category: Some("blog".into()),
                accountname: Some("alice".into()),
                fetching: true,
                end_of_data: false,
            },
        );
        assert_eq!(
            list_of(&doc, &["accounts", "alice", "blog"]),
            vec!["alice/post1".to_string()]
        );
        assert!(doc.discussion_idx("blog", "by_author").is_none());
    }

    #[test]
    fn feed_page_overwrites_content_and_recomputes_stats() {
        let first = apply(
            &Document::new(),
            &Action::ReceiveData {
                data: vec![json!({"author": "alice", "permlink": "p1", "body": "v1"})],
                order: "trending".into(),
                category: None,
                accountname: None,
                fetching: false,
                end_of_data: false,
            },
        );
        let second = apply(
            &first,
            &Action::ReceiveData {
                data: vec![json!({"author": "alice", "permlink": "p1", "body": "v2"})],
                order: "trending".into(),
                category: None,
                accountname: None,
                fetching: false,
                end_of_data: false,
            },
        );
        let item = second.content("alice/p1").unwrap();
        assert_eq!(item.get("body"), Some(&Value::from("v2")));
        assert!(item.get("stats").is_some());
    }

    #[test]
    fn receive_data_sets_last_fetch_only_at_end() {
        let open = apply(
            &Document::new(),
            &Action::ReceiveData {
                data: vec![],
                order: "trending".into(),
                category: None,
                accountname: None,
                fetching: true,
                end_of_data: false,
            },
        );
        let status = open.fetch_status("", "trending").unwrap();
        assert_eq!(status.get("fetching"), Some(&Value::Bool(true)));
        assert!(status.get("last_fetch").is_none());

        let done = apply(
            &open,
            &Action::ReceiveData {
                data: vec![],
                order: "trending".into(),
                category: None,
                accountname: None,
                fetching: false,
                end_of_data: true,
            },
        );
        let status = done.fetch_status("", "trending").unwrap();
        assert_eq!(status.get("fetching"), Some(&Value::Bool(false)));
        assert!(status.get("last_fetch").is_some());
    }

    #[test]
    fn recent_posts_prepend_newest_first() {
        let doc = apply_all(
            Document::new(),
            &[
                Action::ReceiveRecentPosts {
                    data: vec![json!({"author": "a", "permlink": "old"})],
                },
                Action::ReceiveRecentPosts {
                    data: vec![json!({"author": "a", "permlink": "new"})],
                },
            ],
        );
        assert_eq!(
            list_of(&doc, &["discussion_idx", "", "created"]),
            vec!["a/new".to_string(), "a/old".to_string()]
        );
    }

    #[test]
    fn recent_posts_never_overwrite_existing_content() {
        let seeded = apply(
            &Document::new(),
            &Action::ReceiveData {
                data: vec![json!({"author": "a", "permlink": "p", "body": "fresh"})],
                order: "trending".into(),
                category: None,
                accountname: None,
                fetching: false,
                end_of_data: false,
            },
        );
        let after = apply(
            &seeded,
            &Action::ReceiveRecentPosts {
                data: vec![json!({"author": "a", "permlink": "p", "body": "stale"})],
            },
        );
        assert_eq!(
            after.content("a/p").unwrap().get("body"),
            Some(&Value::from("fresh"))
        );
        // But a feed page for the same key does refresh it.
        let refreshed = apply(
            &after,
            &Action::ReceiveData {
                data: vec![json!({"author": "a", "permlink": "p", "body": "newer"})],
                order: "trending".into(),
                category: None,
                accountname: None,
                fetching: false,
                end_of_data: false,
            },
        );
        assert_eq!(
            refreshed.content("a/p").unwrap().get("body"),
            Some(&Value::from("newer"))
        );
    }

    #[test]
    fn receive_state_merges_and_computes_stats() {
        let doc = apply(
            &Document::new(),
            &Action::ReceiveState {
                state: json!({
                    "content": {
                        "alice/p1": {"author": "alice", "permlink": "p1", "body": "hello"}
                    },
                    "props": {"total_vesting_shares": "1000.000"}
                }),
            },
        );
        let item = doc.content("alice/p1").unwrap();
        assert_eq!(item.get("body"), Some(&Value::from("hello")));
        assert!(item.get("stats").and_then(Value::as_map).is_some());
        assert!(doc.get_in(&["props", "total_vesting_shares"]).is_some());
        // Default status survives the merge.
        assert!(doc.get("status").is_some());
    }

    #[test]
    fn bulk_state_lists_merge_index_wise() {
        let seeded = apply(
            &Document::new(),
            &Action::ReceiveState {
                state: json!({"guest_bloggers": ["alice", "bob"]}),
            },
        );
        // An empty list in a later snapshot must not wipe fetched data.
        let after_empty = apply(
            &seeded,
            &Action::ReceiveState {
                state: json!({"guest_bloggers": []}),
            },
        );
        assert_eq!(
            list_of(&after_empty, &["guest_bloggers"]),
            vec!["alice".to_string(), "bob".to_string()]
        );

        // A shorter list overlays its prefix; the existing tail survives.
        let after_short = apply(
            &seeded,
            &Action::ReceiveState {
                state: json!({"guest_bloggers": ["carol"]}),
            },
        );
        assert_eq!(
            list_of(&after_short, &["guest_bloggers"]),
            vec!["carol".to_string(), "bob".to_string()]
        );
    }

    #[test]
    fn transfer_history_replaced_wholesale() {
        let seeded = apply(
            &Document::new(),
            &Action::ReceiveState {
                state: json!({
                    "accounts": {
                        "alice": {"transfer_history": [["t1"], ["t2"]], "vesting_shares": "5.0"},
                        "bob": {"transfer_history": [["b1"]]}
                    }
                }),
            },
        );
        let updated = apply(
            &seeded,
            &Action::ReceiveState {
                state: json!({
                    "accounts": {
                        "alice": {"transfer_history": [["t3"]]}
                    }
                }),
            },
        );
        // Alice's history is the new one, not a merge of old and new.
        let history = updated
            .get_in(&["accounts", "alice", "transfer_history"])
            .and_then(Value::as_seq)
            .unwrap();
        assert_eq!(history.len(), 1);
        // Fields outside the history still merged additively.
        assert_eq!(
            updated.get_in(&["accounts", "alice", "vesting_shares"]),
            Some(&Value::from("5.0"))
        );
        // Bob's history was absent from the second snapshot and survives.
        let bob = updated
            .get_in(&["accounts", "bob", "transfer_history"])
            .and_then(Value::as_seq)
            .unwrap();
        assert_eq!(bob.len(), 1);
    }

    #[test]
    fn meta_lifecycle() {
        let mut doc = apply(
            &Document::new(),
            &Action::RequestMeta {
                id: "form1".into(),
                link: "https://example.com".into(),
            },
        );
        doc = apply(
            &doc,
            &Action::ReceiveMeta {
                id: "form1".into(),
                meta: json!({"title": "Example", "image": "img.png"}),
            },
        );
        let record = doc.meta_link_data("form1").unwrap();
        assert_eq!(record.get("link"), Some(&Value::from("https://example.com")));
        assert_eq!(record.get("title"), Some(&Value::from("Example")));

        doc = apply(
            &doc,
            &Action::ClearMetaElement {
                form_id: "form1".into(),
                element: "image".into(),
            },
        );
        assert!(doc.meta_link_data("form1").unwrap().get("image").is_none());

        doc = apply(
            &doc,
            &Action::SetMetaData {
                id: "form1".into(),
                meta: json!({"only": "this"}),
            },
        );
        assert!(doc.meta_link_data("form1").unwrap().get("link").is_none());

        doc = apply(&doc, &Action::ClearMeta { id: "form1".into() });
        assert!(doc.meta_link_data("form1").is_none());
    }

    #[test]
    fn generic_set_remove_update() {
        let mut doc = apply(
            &Document::new(),
            &Action::Set {
                key: vec!["ui".into(), "theme".into()],
                value: json!({"dark": true}),
            },
        );
        assert_eq!(
            doc.get_in(&["ui", "theme", "dark"]),
            Some(&Value::Bool(true))
        );

        doc = apply(
            &doc,
            &Action::update(vec!["counter".into()], Value::Int(0), |v| {
                Value::Int(v.as_int().unwrap_or(0) + 1)
            }),
        );
        assert_eq!(doc.get("counter"), Some(&Value::Int(1)));

        doc = apply(
            &doc,
            &Action::Remove {
                key: vec!["ui".into(), "theme".into()],
            },
        );
        assert!(doc.get_in(&["ui", "theme"]).is_none());
    }

    #[test]
    fn empty_key_set_and_remove_are_identity() {
        let doc = apply(
            &Document::new(),
            &Action::Set {
                key: vec!["kept".into()],
                value: json!(true),
            },
        );
        let after_set = apply(
            &doc,
            &Action::Set {
                key: vec![],
                value: json!("not the new root"),
            },
        );
        assert_eq!(after_set, doc);

        let after_remove = apply(&doc, &Action::Remove { key: vec![] });
        assert_eq!(after_remove, doc);
    }

    #[test]
    fn fetch_json_is_identity() {
        let doc = Document::new();
        assert_eq!(apply(&doc, &Action::FetchJson), doc);
    }

    #[test]
    fn fetch_json_result_writes_flat_key() {
        let doc = apply(
            &Document::new(),
            &Action::FetchJsonResult {
                id: "vote_lookup".into(),
                result: json!({"ok": true}),
                error: Json::Null,
            },
        );
        // Top-level, not namespaced.
        assert_eq!(
            doc.get_in(&["vote_lookup", "result", "ok"]),
            Some(&Value::Bool(true))
        );
        assert_eq!(doc.get_in(&["vote_lookup", "error"]), Some(&Value::Null));
    }

    #[test]
    fn dialog_lifecycle() {
        let shown = apply(
            &Document::new(),
            &Action::ShowDialog {
                name: "transfer".into(),
                params: json!({"to": "bob"}),
            },
        );
        assert_eq!(
            shown
                .active_dialog("transfer")
                .unwrap()
                .get_in(&["params", "to"]),
            Some(&Value::from("bob"))
        );

        let hidden = apply(&shown, &Action::HideDialog { name: "transfer".into() });
        assert!(hidden.active_dialog("transfer").is_none());
    }

    #[test]
    fn dialog_params_default_to_empty_map() {
        let doc = apply(
            &Document::new(),
            &Action::ShowDialog {
                name: "about".into(),
                params: Json::Null,
            },
        );
        assert_eq!(
            doc.active_dialog("about").unwrap().get("params"),
            Some(&Value::map())
        );
    }

    #[test]
    fn active_witness_vote_scratch_set() {
        let mut doc = apply(
            &Document::new(),
            &Action::AddActiveWitnessVote {
                account: "alice".into(),
                witness: "w1".into(),
            },
        );
        let key = "transaction_witness_vote_active_alice";
        assert!(doc.get(key).and_then(Value::as_set).unwrap().contains("w1"));

        doc = apply(
            &doc,
            &Action::RemoveActiveWitnessVote {
                account: "alice".into(),
                witness: "w1".into(),
            },
        );
        assert!(doc.get(key).and_then(Value::as_set).unwrap().is_empty());

        // Removing from an account with no scratch set changes nothing.
        let before = doc.clone();
        let after = apply(
            &doc,
            &Action::RemoveActiveWitnessVote {
                account: "carol".into(),
                witness: "w1".into(),
            },
        );
        assert_eq!(after, before);
    }

    #[test]
    fn deterministic_under_fixed_clock() {
        let now = Utc::now();
        let action = Action::ReceiveData {
            data: vec![json!({"author": "a", "permlink": "p"})],
            order: "trending".into(),
            category: None,
            accountname: None,
            fetching: false,
            end_of_data: true,
        };
        let a = apply_at(&Document::new(), &action, now);
        let b = apply_at(&Document::new(), &action, now);
        assert_eq!(a, b);
    }
}
