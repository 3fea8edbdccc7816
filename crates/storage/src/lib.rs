//! Balance snapshot storage
//!
//! Two [`BalanceStore`](tally_ports::BalanceStore) implementations sharing
//! one set of rollup queries:
//!
//! ```text
//! save(rows) ──► MemoryBalanceStore (DashMap: currency -> rows)
//!                      ▲
//! FileBalanceStore ────┘  append JSON line, then index in memory
//!
//! fetch_window / fetch_bucketed / fetch_all / active_currencies
//!        └──► rollup::{window, bucketed, latest_snapshot}
//! ```

pub mod file;
pub mod memory;
pub mod rollup;

pub use file::FileBalanceStore;
pub use memory::MemoryBalanceStore;
