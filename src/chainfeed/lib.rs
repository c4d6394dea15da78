//! # Chainfeed Architecture
//!
//! Chainfeed is the **state-merge engine** of a blockchain social-network
//! client: one immutable, structurally-shared document folded over a stream
//! of tagged actions. It is a library with no opinions about rendering,
//! transport, or persistence; those collaborators only *dispatch* actions
//! and *read* snapshots.
//!
//! ## The Fold
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Collaborators (rendering layer, network layer)             │
//! │  - Serialize writes into one ordered action stream          │
//! │  - Read snapshots by path; never mutate what they read      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ ActionEnvelope {type, payload}
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Store (store.rs)                                           │
//! │  - The single owned handle; no globals                      │
//! │  - Decodes envelopes at the boundary (action.rs)            │
//! │  - Unknown tag → identity; bad payload → boundary error     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ Action
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Reducer (reducer.rs)                                       │
//! │  - Pure, total transition: (document, action) → document'   │
//! │  - Merge semantics live here; stats.rs derives display data │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Document tree (document.rs, value.rs)                      │
//! │  - Persistent copy-on-write maps/seqs/sets                  │
//! │  - Old snapshots stay valid and internally consistent       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principles
//!
//! - **Transitions are pure.** `apply_at` never performs I/O, never reads a
//!   clock (the instant is an argument), and either fully applies or, on a
//!   payload that violates the wire contract, fails at the decode boundary
//!   before any document is produced. There is no half-written snapshot.
//! - **Merges never regress.** A partial account record from a list
//!   endpoint cannot erase fields a detail endpoint already delivered; a
//!   recent-posts feed cannot clobber content being read. The one deliberate
//!   exception is `transfer_history`, replaced wholesale because two partial
//!   histories deep-merged would interleave corruptly.
//! - **Readers are never torn.** Snapshots share structure with the live
//!   document; a writer copies only the path it touches. Holding a stale
//!   snapshot is always safe, just stale.
//!
//! ## Module Overview
//!
//! - [`store`]: The owned handle, dispatch and snapshot reads
//! - [`action`]: The closed action set and envelope decoding
//! - [`reducer`]: The transition table
//! - [`document`]: The root snapshot and its typed read accessors
//! - [`value`]: The persistent value tree and path operations
//! - [`stats`]: Derived content statistics
//! - [`error`]: Boundary error types

pub mod action;
pub mod document;
pub mod error;
pub mod reducer;
pub mod stats;
pub mod store;
pub mod value;

pub use action::{Action, ActionEnvelope};
pub use document::Document;
pub use error::{Result, StoreError};
pub use store::Store;
pub use value::{Value, ValueMap};
