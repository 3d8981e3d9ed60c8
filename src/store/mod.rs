//! Storage Collaborators
//!
//! The ledger never touches storage itself. Callers fetch snapshots through
//! an `EntityStore` and keep secondary balances in a `KeyValueStore`.

mod entity;
pub mod kv;
mod memory;
mod postgres;

pub use entity::{EntityStore, Filter, Record, SortKey};
pub use kv::{KeyValueStore, MemoryKeyValueStore, Wallet, WalletBalance};
pub use memory::MemoryEntityStore;
pub use postgres::PgEntityStore;
