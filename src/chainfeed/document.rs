//! # Document
//!
//! The root snapshot of all client-known state. A [`Document`] always
//! exists (there is no absent document) and starts as `{status: {}}`.
//! Cloning one is cheap: the underlying tree is structurally shared, so a
//! clone is a stable read view that later writes never disturb.

use serde::Serialize;
use serde_json::Value as Json;

use crate::value::Value;

/// Root snapshot of all client-known state.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    root: Value,
}

impl Default for Document {
    fn default() -> Self {
        let mut root = Value::map();
        root.set_in(&["status"], Value::map());
        Document { root }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing tree as a document root.
    pub fn from_root(root: Value) -> Self {
        Document { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut Value {
        &mut self.root
    }

    /// Read a top-level entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Read the node at an ordered key path; `None` when absent.
    pub fn get_in<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        self.root.get_in(path)
    }

    /// The account record under `accounts[name]`.
    pub fn account(&self, name: &str) -> Option<&Value> {
        self.get_in(&["accounts", name])
    }

    /// The content item under `content["author/permlink"]`.
    pub fn content(&self, key: &str) -> Option<&Value> {
        self.get_in(&["content", key])
    }

    /// The ordered key list under `discussion_idx[category][order]`.
    pub fn discussion_idx(&self, category: &str, order: &str) -> Option<&[Value]> {
        self.get_in(&["discussion_idx", category, order])
            .and_then(Value::as_seq)
    }

    /// Per-(category, order) fetch bookkeeping.
    pub fn fetch_status(&self, category: &str, order: &str) -> Option<&Value> {
        self.get_in(&["status", category, order])
    }

    /// Link-preview metadata cached under `metaLinkData[id]`.
    pub fn meta_link_data(&self, id: &str) -> Option<&Value> {
        self.get_in(&["metaLinkData", id])
    }

    /// Dialog state under `active_dialogs[name]`; present while shown.
    pub fn active_dialog(&self, name: &str) -> Option<&Value> {
        self.get_in(&["active_dialogs", name])
    }

    /// Export the whole snapshot as plain JSON.
    pub fn to_json(&self) -> Json {
        self.root.to_json()
    }
}
