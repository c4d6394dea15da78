//! # Document Tree
//!
//! The persistent value tree every snapshot is made of. A [`Value`] is a
//! rooted, structurally-shared document node: container variants hold their
//! children behind an [`Arc`], so cloning a document is cheap (one reference
//! bump per shared node) and mutating it copies only the spine from the root
//! down to the touched node (`Arc::make_mut`). Readers holding an older
//! snapshot are never invalidated by a later write.
//!
//! ## Container conventions
//!
//! - Objects become [`ValueMap`], a keyed map that preserves insertion
//!   order, so feeds and account fields render in the order they arrived.
//! - Arrays become [`Value::Seq`], an order-preserving sequence.
//! - [`Value::Set`] holds string sets (witness votes and the optimistic
//!   vote scratch sets); plain JSON never produces one, only
//!   [`Value::normalize_account`] does.
//!
//! ## Path operations
//!
//! All deep access goes through ordered key sequences: [`Value::get_in`],
//! [`Value::set_in`], [`Value::remove_in`], [`Value::update_in`]. Reads of
//! absent paths return `None` rather than failing; writes create missing
//! intermediate maps.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value as Json;

/// A keyed map that preserves insertion order.
///
/// Overwriting an existing key keeps its original position; removing a key
/// frees its position. Lookup is backed by a hash index, iteration walks the
/// key vector.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueMap {
    keys: Vec<String>,
    entries: HashMap<String, Value>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Insert a value, returning the previous one if the key was present.
    /// A replaced key keeps its first-seen position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.entries.entry(key.clone()) {
            Entry::Vacant(slot) => {
                self.keys.push(key);
                slot.insert(value);
                None
            }
            Entry::Occupied(mut slot) => Some(slot.insert(value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.keys.retain(|k| k != key);
        }
        removed
    }

    /// Mutable access to the value under `key`, inserting `default` first
    /// when the key is absent.
    pub fn entry_or(&mut self, key: &str, default: Value) -> &mut Value {
        match self.entries.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                self.keys.push(key.to_string());
                slot.insert(default)
            }
            Entry::Occupied(slot) => slot.into_mut(),
        }
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.keys
            .iter()
            .filter_map(|k| self.entries.get(k).map(|v| (k.as_str(), v)))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

impl FromIterator<(String, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// One node of the persistent document tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Order-preserving sequence.
    Seq(Arc<Vec<Value>>),
    /// Insertion-order-preserving keyed map.
    Map(Arc<ValueMap>),
    /// String set (witness votes, optimistic vote scratch state).
    Set(Arc<BTreeSet<String>>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    /// An empty map node.
    pub fn map() -> Self {
        Value::Map(Arc::new(ValueMap::new()))
    }

    /// An empty sequence node.
    pub fn seq() -> Self {
        Value::Seq(Arc::new(Vec::new()))
    }

    /// An empty set node.
    pub fn set() -> Self {
        Value::Set(Arc::new(BTreeSet::new()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    /// Copy-on-write access to this node as a map. Non-map nodes are
    /// replaced by an empty map first, matching the write-creates-container
    /// rule for path updates.
    pub fn make_map(&mut self) -> &mut ValueMap {
        if !matches!(self, Value::Map(_)) {
            *self = Value::map();
        }
        match self {
            Value::Map(m) => Arc::make_mut(m),
            _ => unreachable!("node was just made a map"),
        }
    }

    /// Copy-on-write access to this node as a sequence, replacing non-seq
    /// nodes with an empty one.
    pub fn make_seq(&mut self) -> &mut Vec<Value> {
        if !matches!(self, Value::Seq(_)) {
            *self = Value::seq();
        }
        match self {
            Value::Seq(s) => Arc::make_mut(s),
            _ => unreachable!("node was just made a seq"),
        }
    }

    /// Copy-on-write access to this node as a set, replacing non-set nodes
    /// with an empty one.
    pub fn make_set(&mut self) -> &mut BTreeSet<String> {
        if !matches!(self, Value::Set(_)) {
            *self = Value::set();
        }
        match self {
            Value::Set(s) => Arc::make_mut(s),
            _ => unreachable!("node was just made a set"),
        }
    }

    /// Read the child under `key` when this node is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Read the node at `path`. Absent paths (or traversal through a
    /// non-map) yield `None`.
    pub fn get_in<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        let mut node = self;
        for key in path {
            node = node.get(key.as_ref())?;
        }
        Some(node)
    }

    /// Write `value` at `path`, creating intermediate maps as needed.
    /// An empty path replaces this node wholesale.
    pub fn set_in<S: AsRef<str>>(&mut self, path: &[S], value: Value) {
        match path {
            [] => *self = value,
            [key] => {
                self.make_map().insert(key.as_ref(), value);
            }
            [key, rest @ ..] => {
                self.make_map()
                    .entry_or(key.as_ref(), Value::map())
                    .set_in(rest, value);
            }
        }
    }

    /// Delete the node at `path`. Absent paths are a no-op; emptied parent
    /// containers are left in place.
    pub fn remove_in<S: AsRef<str>>(&mut self, path: &[S]) {
        match path {
            [] => *self = Value::Null,
            [key] => {
                if let Value::Map(m) = self {
                    if m.contains_key(key.as_ref()) {
                        Arc::make_mut(m).remove(key.as_ref());
                    }
                }
            }
            [key, rest @ ..] => {
                if let Value::Map(m) = self {
                    if m.contains_key(key.as_ref()) {
                        if let Some(child) = Arc::make_mut(m).get_mut(key.as_ref()) {
                            child.remove_in(rest);
                        }
                    }
                }
            }
        }
    }

    /// Read the node at `path` (or `default` when absent), transform it,
    /// and write the result back.
    pub fn update_in<S, F>(&mut self, path: &[S], default: Value, f: F)
    where
        S: AsRef<str>,
        F: FnOnce(Value) -> Value,
    {
        let current = self.get_in(path).cloned().unwrap_or(default);
        self.set_in(path, f(current));
    }

    /// Additive depth-first merge. Map children merge recursively and
    /// existing keys the incoming map does not mention survive. Sequences
    /// merge index-wise: incoming elements merge onto the existing element
    /// at the same position, the existing tail survives, and extra incoming
    /// elements append. Every other variant is replaced wholesale by the
    /// incoming value.
    pub fn deep_merge(&mut self, incoming: Value) {
        match (self, incoming) {
            (Value::Map(existing), Value::Map(incoming)) => {
                let existing = Arc::make_mut(existing);
                let incoming =
                    Arc::try_unwrap(incoming).unwrap_or_else(|shared| (*shared).clone());
                let ValueMap { keys, mut entries } = incoming;
                for key in keys {
                    if let Some(value) = entries.remove(&key) {
                        match existing.get_mut(&key) {
                            Some(slot) => slot.deep_merge(value),
                            None => {
                                existing.insert(key, value);
                            }
                        }
                    }
                }
            }
            (Value::Seq(existing), Value::Seq(incoming)) => {
                let entries = Arc::make_mut(existing);
                let incoming =
                    Arc::try_unwrap(incoming).unwrap_or_else(|shared| (*shared).clone());
                for (index, value) in incoming.into_iter().enumerate() {
                    match entries.get_mut(index) {
                        Some(slot) => slot.deep_merge(value),
                        None => entries.push(value),
                    }
                }
            }
            (slot, incoming) => *slot = incoming,
        }
    }

    /// Normalize plain JSON into document containers: objects become
    /// insertion-ordered maps, arrays become sequences, numbers split into
    /// `Int` when losslessly integral, else `Float`.
    pub fn from_json(json: Json) -> Value {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::Str(s),
            Json::Array(items) => {
                Value::Seq(Arc::new(items.into_iter().map(Value::from_json).collect()))
            }
            Json::Object(entries) => Value::Map(Arc::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            )),
        }
    }

    /// Account-specific normalization: any `witness_votes` list (at any
    /// depth) becomes a string set; everything else follows [`from_json`].
    ///
    /// [`from_json`]: Value::from_json
    pub fn normalize_account(json: Json) -> Value {
        match json {
            Json::Array(items) => Value::Seq(Arc::new(
                items.into_iter().map(Value::normalize_account).collect(),
            )),
            Json::Object(entries) => Value::Map(Arc::new(
                entries
                    .into_iter()
                    .map(|(k, v)| {
                        let value = if k == "witness_votes" {
                            witness_vote_set(v)
                        } else {
                            Value::normalize_account(v)
                        };
                        (k, value)
                    })
                    .collect(),
            )),
            other => Value::from_json(other),
        }
    }

    /// Export to plain JSON. Sets serialize as sorted arrays.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => Json::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Str(s) => Json::String(s.clone()),
            Value::Seq(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
            Value::Set(set) => Json::Array(set.iter().cloned().map(Json::String).collect()),
        }
    }
}

fn witness_vote_set(json: Json) -> Value {
    match json {
        Json::Array(items) => Value::Set(Arc::new(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Json::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        )),
        other => Value::from_json(other),
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Value::from_json(json)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Set(set) => {
                let mut seq = serializer.serialize_seq(Some(set.len()))?;
                for item in set.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}
