//! Core types for philoagents.

pub mod generation;
pub mod message;
pub mod stream;
pub mod thread;
pub mod turn;
pub mod usage;

pub use generation::*;
pub use message::*;
pub use stream::*;
pub use thread::*;
pub use turn::*;
pub use usage::*;
