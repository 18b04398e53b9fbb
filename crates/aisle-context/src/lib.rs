//! aisle-context
//!
//! Per-session conversation state. The store mirrors whatever query the
//! translator produced; it never re-derives filters itself.
pub mod command;
pub mod store;
pub mod transcript;

pub use command::ContextCommand;
pub use store::{ConversationContext, VendorRerun, VendorScope};
pub use transcript::{Role, Transcript, Turn};
