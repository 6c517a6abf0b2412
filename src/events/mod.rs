//! Events: serialized publish/subscribe for session-level signals
//!
//! - **Dispatcher**: one task, one FIFO queue; every handler runs there
//! - **Signal / Stream**: hot observer registry, no replay
//! - **PushStream / Notifier**: payload-less backend callbacks → stream

mod dispatcher;
mod notifier;
mod signal;

pub use dispatcher::Dispatcher;
pub use notifier::{Notifier, PushStream};
pub use signal::{Delivery, Signal, Stream, Subscription};
