//! Process lifecycle: shutdown coordination and OS signal translation.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::{spawn_signal_listener, wait_for_signal};
