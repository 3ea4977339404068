//! orderdesk-core: adaptive write path and domain repositories.
//!
//! Writes to a schema-rigid document store whose schema the client does not
//! know. A rejected write is classified, the payload repaired and the write
//! retried, up to a fixed number of attempts.
//!
//! # Public API
//!
//! - [`WriteExecutor`] -- bounded repair-and-retry for one write
//! - [`FailureClassifier`], [`MessageClassifier`], [`Diagnosis`] -- reading
//!   the store's failure messages
//! - [`Synthesizer`] -- placeholder values for attributes the schema requires
//! - [`encode_list`] / [`decode_list`] -- lists stored in text columns
//! - [`OrderRepository`], [`ConfigRepository`] -- typed collection access
//! - [`OrderStats`] -- order count and daily average over a period

pub mod classify;
pub mod codec;
pub mod executor;
pub mod model;
pub mod repository;
pub mod stats;
pub mod synthesize;

// ── Convenience re-exports ───────────────────────────────────────────

pub use classify::{Diagnosis, FailureClassifier, MessageClassifier};
pub use codec::{decode_list, decode_text, encode_list};
pub use executor::{WriteExecutor, DEFAULT_MAX_ATTEMPTS};
pub use model::{ConfigList, NetworkChange, Order, OrderFields, SystemConfig};
pub use repository::{Collections, ConfigHandle, ConfigRepository, OrderRepository};
pub use stats::OrderStats;
pub use synthesize::Synthesizer;
