//! Change notification module.
//!
//! Record sources and the aggregator announce "something changed, re-read"
//! through a [`ChangeNotifier`]. Signals carry no payload and are delivered
//! at least once; listeners re-read the current state instead of applying a
//! delta.

mod change_notifier;

pub use change_notifier::*;
