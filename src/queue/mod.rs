//! Durable, time-ordered scheduled work queue.
//!
//! One live entry per key; entries are claimed under a visibility lease and
//! acknowledged with [`WorkQueue::complete`], which re-arms recurring entries
//! for their next occurrence. Delivery is at-least-once: an unacknowledged
//! claim becomes due again when its lease lapses.

mod error;
mod memory;
mod redis;
mod traits;

pub use self::error::QueueError;
pub use self::memory::MemoryWorkQueue;
pub use self::redis::RedisWorkQueue;
pub use self::traits::{Delivery, WorkQueue};
