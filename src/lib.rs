//! # Mirror-LOB
//!
//! A side-aware limit-order-book core that models an external venue from
//! one participant's perspective: it tracks queue position for the
//! participant's own resting orders and simulates how market events
//! consume them.
//!
//! Two questions are answered at high rates:
//!
//! 1. How does an externally observed trade print move our resting orders,
//!    given where they sit in the queue? ([`Level::reduce_front`])
//! 2. What would it take to execute against the book until a target size
//!    of our own orders has been lifted? ([`Level::walk_until_lifted`])
//!
//! ## Design Principles
//!
//! - **Single-Writer**: one thread owns a book exclusively (no locks)
//! - **Allocation-Free Hot Path**: bounded inline containers throughout;
//!   the only allocation is one cold record per order
//! - **Monomorphised Variants**: side, shown-ness and capacities are
//!   compile-time parameters, so per-variant branches fold out of the
//!   inner loops
//!
//! ## Architecture
//!
//! ```text
//! [Feed Events] --> [Lob: level index, per-side routing]
//!                            |
//!                   [Level: queue accounting, fill procedures]
//!                            |
//!                   [TradeResult: our lifted orders + moved volume]
//! ```

pub mod level;
pub mod lob;
pub mod matching;
pub mod order;
pub mod types;

// Re-exports for convenience
pub use level::{Level, TradeResult};
pub use lob::{FindStrategy, LevelSeq, Lob, RejectReason, Rejected, SideLevels};
pub use matching::Execution;
pub use order::{Order, OrderInfo};
pub use types::{Ask, Bid, Id, Offset, OrderType, Price, Queue, Side, SideId, Size, Time};
