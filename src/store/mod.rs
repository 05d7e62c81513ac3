//! Store Module
//!
//! The volatile key-value map shared by every request.
//!
//! ## Responsibilities
//! - Insert, look up, and remove single keys atomically
//! - Stay consistent when accessed from several threads
//!
//! ## Data Structure Choice
//! A `HashMap` behind one `parking_lot::Mutex`:
//! - Coarse granularity, operations on different keys still serialize
//! - O(1) average-case critical sections
//! - The lock does not poison, so a panic while it is held leaves the
//!   map usable for the next request

mod table;

pub use table::MemStore;

/// Single-key operations the dispatcher needs from a store.
///
/// Every method must be atomic with respect to every other call on the
/// same instance.
pub trait KvEngine: Send + Sync + 'static {
    /// Inserts or overwrites `key`, returning the previous value.
    fn put(&self, key: String, value: String) -> Option<String>;

    /// Returns a copy of the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Removes `key`, returning the value it held.
    fn delete(&self, key: &str) -> Option<String>;
}
