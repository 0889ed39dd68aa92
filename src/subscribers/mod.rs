//! # Event subscribers.
//!
//! An observer can read a run's `mpsc::Receiver<Event>` directly, or hand it to a
//! [`SubscriberSet`] that fans every event out to any number of [`Subscribe`]
//! implementations.
//!
//! ## Architecture
//! ```text
//! Engine ── publish(Event) ──► Bus ──► Receiver ──► SubscriberSet::forward()
//!                                                        │
//!                                              ┌─────────┼─────────┐
//!                                              ▼         ▼         ▼
//!                                          LogWriter   Custom     ...
//! ```

mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
mod embedded;

pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
