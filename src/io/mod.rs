//! Image I/O collaborator.
//!
//! The engine never touches files itself. It talks to an [`IoActor`] through an
//! [`IoHandle`] (input, output, idle check), and the actor persists through an
//! [`ImageStore`].
//!
//! ## Contents
//! - [`IoActor`], [`IoHandle`] the channel protocol
//! - [`ImageStore`] persistence seam, with [`PgmStore`] and [`MemoryStore`]

mod actor;
mod store;

pub use actor::{IoActor, IoHandle};
pub use store::{ImageStore, MemoryStore, PgmStore, parse_pgm};
