//! # Actions
//!
//! The closed set of updates the store understands. On the wire every
//! action is an [`ActionEnvelope`] of the shape `{type, payload}`, and
//! [`Action::decode`] turns recognized envelopes into typed [`Action`]
//! variants at the boundary, so the reducer itself never touches raw JSON
//! shapes it has not validated.
//!
//! Unknown tags are not an error: `decode` returns `Ok(None)` and the store
//! leaves the document unchanged. A recognized tag with a payload of the
//! wrong shape is a contract violation by the dispatching collaborator and
//! surfaces as [`StoreError::Payload`].

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::{Result, StoreError};
use crate::value::Value;

pub const RECEIVE_STATE: &str = "global/RECEIVE_STATE";
pub const RECEIVE_ACCOUNT: &str = "global/RECEIVE_ACCOUNT";
pub const RECEIVE_ACCOUNTS: &str = "global/RECEIVE_ACCOUNTS";
pub const UPDATE_ACCOUNT_WITNESS_VOTE: &str = "global/UPDATE_ACCOUNT_WITNESS_VOTE";
pub const UPDATE_ACCOUNT_WITNESS_PROXY: &str = "global/UPDATE_ACCOUNT_WITNESS_PROXY";
pub const FETCHING_DATA: &str = "global/FETCHING_DATA";
pub const RECEIVE_DATA: &str = "global/RECEIVE_DATA";
pub const RECEIVE_RECENT_POSTS: &str = "global/RECEIVE_RECENT_POSTS";
pub const REQUEST_META: &str = "global/REQUEST_META";
pub const RECEIVE_META: &str = "global/RECEIVE_META";
pub const SET: &str = "global/SET";
pub const REMOVE: &str = "global/REMOVE";
pub const UPDATE: &str = "global/UPDATE";
pub const SET_META_DATA: &str = "global/SET_META_DATA";
pub const CLEAR_META: &str = "global/CLEAR_META";
pub const CLEAR_META_ELEMENT: &str = "global/CLEAR_META_ELEMENT";
pub const FETCH_JSON: &str = "global/FETCH_JSON";
pub const FETCH_JSON_RESULT: &str = "global/FETCH_JSON_RESULT";
pub const SHOW_DIALOG: &str = "global/SHOW_DIALOG";
pub const HIDE_DIALOG: &str = "global/HIDE_DIALOG";
pub const ADD_ACTIVE_WITNESS_VOTE: &str = "global/ADD_ACTIVE_WITNESS_VOTE";
pub const REMOVE_ACTIVE_WITNESS_VOTE: &str = "global/REMOVE_ACTIVE_WITNESS_VOTE";

/// Caller-supplied transform for [`Action::Update`]. Must be pure over the
/// expected input shape; panics propagate to the dispatcher.
pub type Updater = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// The inbound wire contract: a tag plus a free-form payload.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ActionEnvelope {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub payload: Json,
}

impl ActionEnvelope {
    pub fn new(action_type: impl Into<String>, payload: Json) -> Self {
        ActionEnvelope {
            action_type: action_type.into(),
            payload,
        }
    }

    /// Parse an envelope from raw JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// One recognized update, with its payload already validated.
#[derive(Clone)]
pub enum Action {
    /// Merge an externally-fetched whole snapshot into the document.
    ReceiveState { state: Json },
    /// Merge one account record into `accounts[name]`.
    ReceiveAccount { account: Json },
    /// Fold a batch of account records left-to-right.
    ReceiveAccounts { accounts: Vec<Json> },
    UpdateAccountWitnessVote {
        account: String,
        witness: String,
        approve: bool,
    },
    UpdateAccountWitnessProxy {
        account: String,
        proxy: String,
    },
    FetchingData {
        category: Option<String>,
        order: String,
    },
    /// One page of feed data.
    ReceiveData {
        data: Vec<Json>,
        order: String,
        category: Option<String>,
        accountname: Option<String>,
        fetching: bool,
        end_of_data: bool,
    },
    ReceiveRecentPosts { data: Vec<Json> },
    RequestMeta { id: String, link: String },
    ReceiveMeta { id: String, meta: Json },
    /// Write an arbitrary value at an arbitrary path.
    Set { key: Vec<String>, value: Json },
    Remove { key: Vec<String> },
    /// Read-transform-write with a caller-supplied pure function. Not
    /// wire-decodable; construct through [`Action::update`].
    Update {
        key: Vec<String>,
        fallback: Value,
        updater: Updater,
    },
    SetMetaData { id: String, meta: Json },
    ClearMeta { id: String },
    ClearMetaElement { form_id: String, element: String },
    /// Recognized no-op: the fetch itself happens outside the store.
    FetchJson,
    FetchJsonResult {
        id: String,
        result: Json,
        error: Json,
    },
    ShowDialog { name: String, params: Json },
    HideDialog { name: String },
    AddActiveWitnessVote { account: String, witness: String },
    RemoveActiveWitnessVote { account: String, witness: String },
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// A path that arrives either as a single key or as an ordered key list.
#[derive(Deserialize)]
#[serde(untagged)]
enum KeyPath {
    One(String),
    Many(Vec<String>),
}

impl From<KeyPath> for Vec<String> {
    fn from(key: KeyPath) -> Self {
        match key {
            KeyPath::One(key) => vec![key],
            KeyPath::Many(keys) => keys,
        }
    }
}

fn parse<T: DeserializeOwned>(tag: &'static str, payload: &Json) -> Result<T> {
    serde_json::from_value(payload.clone()).map_err(|source| StoreError::Payload { tag, source })
}

impl Action {
    /// Construct a generic read-transform-write action.
    pub fn update<F>(key: Vec<String>, fallback: Value, updater: F) -> Action
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Action::Update {
            key,
            fallback,
            updater: Arc::new(updater),
        }
    }

    /// Decode a wire envelope. `Ok(None)` means the tag is unknown and the
    /// transition is identity.
    pub fn decode(envelope: &ActionEnvelope) -> Result<Option<Action>> {
        let payload = &envelope.payload;
        let action = match envelope.action_type.as_str() {
            RECEIVE_STATE => Action::ReceiveState {
                state: payload.clone(),
            },
            RECEIVE_ACCOUNT => {
                #[derive(Deserialize)]
                struct Payload {
                    account: Json,
                }
                let p: Payload = parse(RECEIVE_ACCOUNT, payload)?;
                Action::ReceiveAccount { account: p.account }
            }
            RECEIVE_ACCOUNTS => {
                #[derive(Deserialize)]
                struct Payload {
                    accounts: Vec<Json>,
                }
                let p: Payload = parse(RECEIVE_ACCOUNTS, payload)?;
                Action::ReceiveAccounts {
                    accounts: p.accounts,
                }
            }
            UPDATE_ACCOUNT_WITNESS_VOTE => {
                #[derive(Deserialize)]
                struct Payload {
                    account: String,
                    witness: String,
                    approve: bool,
                }
                let p: Payload = parse(UPDATE_ACCOUNT_WITNESS_VOTE, payload)?;
                Action::UpdateAccountWitnessVote {
                    account: p.account,
                    witness: p.witness,
                    approve: p.approve,
                }
            }
            UPDATE_ACCOUNT_WITNESS_PROXY => {
                #[derive(Deserialize)]
                struct Payload {
                    account: String,
                    proxy: String,
                }
                let p: Payload = parse(UPDATE_ACCOUNT_WITNESS_PROXY, payload)?;
                Action::UpdateAccountWitnessProxy {
                    account: p.account,
                    proxy: p.proxy,
                }
            }
            FETCHING_DATA => {
                #[derive(Deserialize)]
                struct Payload {
                    category: Option<String>,
                    order: String,
                }
                let p: Payload = parse(FETCHING_DATA, payload)?;
                Action::FetchingData {
                    category: p.category,
                    order: p.order,
                }
            }
            RECEIVE_DATA => {
                #[derive(Deserialize)]
                struct Payload {
                    data: Vec<Json>,
                    order: String,
                    category: Option<String>,
                    accountname: Option<String>,
                    #[serde(default)]
                    fetching: bool,
                    #[serde(default, rename = "endOfData")]
                    end_of_data: bool,
                }
                let p: Payload = parse(RECEIVE_DATA, payload)?;
                Action::ReceiveData {
                    data: p.data,
                    order: p.order,
                    category: p.category,
                    accountname: p.accountname,
                    fetching: p.fetching,
                    end_of_data: p.end_of_data,
                }
            }
            RECEIVE_RECENT_POSTS => {
                #[derive(Deserialize)]
                struct Payload {
                    data: Vec<Json>,
                }
                let p: Payload = parse(RECEIVE_RECENT_POSTS, payload)?;
                Action::ReceiveRecentPosts { data: p.data }
            }
            REQUEST_META => {
                #[derive(Deserialize)]
                struct Payload {
                    id: String,
                    link: String,
                }
                let p: Payload = parse(REQUEST_META, payload)?;
                Action::RequestMeta {
                    id: p.id,
                    link: p.link,
                }
            }
            RECEIVE_META => {
                #[derive(Deserialize)]
                struct Payload {
                    id: String,
                    meta: Json,
                }
                let p: Payload = parse(RECEIVE_META, payload)?;
                Action::ReceiveMeta {
                    id: p.id,
                    meta: p.meta,
                }
            }
            SET => {
                #[derive(Deserialize)]
                struct Payload {
                    key: KeyPath,
                    value: Json,
                }
                let p: Payload = parse(SET, payload)?;
                Action::Set {
                    key: p.key.into(),
                    value: p.value,
                }
            }
            REMOVE => {
                #[derive(Deserialize)]
                struct Payload {
                    key: KeyPath,
                }
                let p: Payload = parse(REMOVE, payload)?;
                Action::Remove { key: p.key.into() }
            }
            UPDATE => return Err(StoreError::NotWireDecodable { tag: UPDATE }),
            SET_META_DATA => {
                #[derive(Deserialize)]
                struct Payload {
                    id: String,
                    meta: Json,
                }
                let p: Payload = parse(SET_META_DATA, payload)?;
                Action::SetMetaData {
                    id: p.id,
                    meta: p.meta,
                }
            }
            CLEAR_META => {
                #[derive(Deserialize)]
                struct Payload {
                    id: String,
                }
                let p: Payload = parse(CLEAR_META, payload)?;
                Action::ClearMeta { id: p.id }
            }
            CLEAR_META_ELEMENT => {
                #[derive(Deserialize)]
                struct Payload {
                    #[serde(rename = "formId")]
                    form_id: String,
                    element: String,
                }
                let p: Payload = parse(CLEAR_META_ELEMENT, payload)?;
                Action::ClearMetaElement {
                    form_id: p.form_id,
                    element: p.element,
                }
            }
            FETCH_JSON => Action::FetchJson,
            FETCH_JSON_RESULT => {
                #[derive(Deserialize)]
                struct Payload {
                    id: String,
                    #[serde(default)]
                    result: Json,
                    #[serde(default)]
                    error: Json,
                }
                let p: Payload = parse(FETCH_JSON_RESULT, payload)?;
                Action::FetchJsonResult {
                    id: p.id,
                    result: p.result,
                    error: p.error,
                }
            }
            SHOW_DIALOG => {
                #[derive(Deserialize)]
                struct Payload {
                    name: String,
                    #[serde(default)]
                    params: Json,
                }
                let p: Payload = parse(SHOW_DIALOG, payload)?;
                Action::ShowDialog {
                    name: p.name,
                    params: p.params,
                }
            }
            HIDE_DIALOG => {
                #[derive(Deserialize)]
                struct Payload {
                    name: String,
                }
                let p: Payload = parse(HIDE_DIALOG, payload)?;
                Action::HideDialog { name: p.name }
            }
            ADD_ACTIVE_WITNESS_VOTE => {
                let p = parse_witness(ADD_ACTIVE_WITNESS_VOTE, payload)?;
                Action::AddActiveWitnessVote {
                    account: p.0,
                    witness: p.1,
                }
            }
            REMOVE_ACTIVE_WITNESS_VOTE => {
                let p = parse_witness(REMOVE_ACTIVE_WITNESS_VOTE, payload)?;
                Action::RemoveActiveWitnessVote {
                    account: p.0,
                    witness: p.1,
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(action))
    }

    /// The wire tag for this action, used for dispatch logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::ReceiveState { .. } => RECEIVE_STATE,
            Action::ReceiveAccount { .. } => RECEIVE_ACCOUNT,
            Action::ReceiveAccounts { .. } => RECEIVE_ACCOUNTS,
            Action::UpdateAccountWitnessVote { .. } => UPDATE_ACCOUNT_WITNESS_VOTE,
            Action::UpdateAccountWitnessProxy { .. } => UPDATE_ACCOUNT_WITNESS_PROXY,
            Action::FetchingData { .. } => FETCHING_DATA,
            Action::ReceiveData { .. } => RECEIVE_DATA,
            Action::ReceiveRecentPosts { .. } => RECEIVE_RECENT_POSTS,
            Action::RequestMeta { .. } => REQUEST_META,
            Action::ReceiveMeta { .. } => RECEIVE_META,
            Action::Set { .. } => SET,
            Action::Remove { .. } => REMOVE,
            Action::Update { .. } => UPDATE,
            Action::SetMetaData { .. } => SET_META_DATA,
            Action::ClearMeta { .. } => CLEAR_META,
            Action::ClearMetaElement { .. } => CLEAR_META_ELEMENT,
            Action::FetchJson => FETCH_JSON,
            Action::FetchJsonResult { .. } => FETCH_JSON_RESULT,
            Action::ShowDialog { .. } => SHOW_DIALOG,
            Action::HideDialog { .. } => HIDE_DIALOG,
            Action::AddActiveWitnessVote { .. } => ADD_ACTIVE_WITNESS_VOTE,
            Action::RemoveActiveWitnessVote { .. } => REMOVE_ACTIVE_WITNESS_VOTE,
        }
    }
}

fn parse_witness(tag: &'static str, payload: &Json) -> Result<(String, String)> {
    #[derive(Deserialize)]
    struct Payload {
        account: String,
        witness: String,
    }
    let p: Payload = parse(tag, payload)?;
    Ok((p.account, p.witness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_tag_decodes_to_none() {
        let envelope = ActionEnvelope::new("global/SOMETHING_ELSE", json!({}));
        assert!(matches!(Action::decode(&envelope), Ok(None)));
    }

    #[test]
    fn malformed_payload_is_a_boundary_error() {
        let envelope = ActionEnvelope::new(UPDATE_ACCOUNT_WITNESS_VOTE, json!({"account": 1}));
        match Action::decode(&envelope) {
            Err(StoreError::Payload { tag, .. }) => {
                assert_eq!(tag, UPDATE_ACCOUNT_WITNESS_VOTE);
            }
            other => panic!("expected payload error, got {other:?}"),
        }
    }

    #[test]
    fn update_is_not_wire_decodable() {
        let envelope = ActionEnvelope::new(UPDATE, json!({"key": ["a"]}));
        assert!(matches!(
            Action::decode(&envelope),
            Err(StoreError::NotWireDecodable { tag: UPDATE })
        ));
    }

    #[test]
    fn set_accepts_single_key_or_path() {
        let one = ActionEnvelope::new(SET, json!({"key": "flag", "value": true}));
        match Action::decode(&one).unwrap().unwrap() {
            Action::Set { key, .. } => assert_eq!(key, vec!["flag".to_string()]),
            other => panic!("unexpected action {other:?}"),
        }

        let many = ActionEnvelope::new(SET, json!({"key": ["a", "b"], "value": 1}));
        match Action::decode(&many).unwrap().unwrap() {
            Action::Set { key, .. } => {
                assert_eq!(key, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn receive_data_reads_camel_case_end_flag() {
        let envelope = ActionEnvelope::new(
            RECEIVE_DATA,
            json!({
                "data": [],
                "order": "trending",
                "category": "life",
                "fetching": false,
                "endOfData": true
            }),
        );
        match Action::decode(&envelope).unwrap().unwrap() {
            Action::ReceiveData {
                end_of_data,
                fetching,
                ..
            } => {
                assert!(end_of_data);
                assert!(!fetching);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn envelope_parses_from_raw_json() {
        let envelope =
            ActionEnvelope::from_json_str(r#"{"type":"global/FETCH_JSON","payload":{}}"#).unwrap();
        assert!(matches!(
            Action::decode(&envelope),
            Ok(Some(Action::FetchJson))
        ));
        assert!(ActionEnvelope::from_json_str("not json").is_err());
    }
}
