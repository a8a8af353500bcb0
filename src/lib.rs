#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

//! Short-lived correlation state for authentication flows.
//!
//! A [`State`] ties an outgoing request (an authorization redirect, say) to the
//! response that eventually comes back. States are serialized into a
//! [`StateStore`]; [`clear_stale_state`] garbage-collects the ones that never
//! complete.

pub mod clock;
pub mod config;
pub mod error;
pub mod id;
pub mod observability;
pub mod state;
pub mod store;
pub mod sweep;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ObservabilityConfig, StateConfig};
pub use error::{AuthStateError, ConfigError, StateError, StoreError, StoreOperation};
pub use id::{IdGenerator, UuidV4Generator};
pub use observability::{LogObserver, NoopObserver, Observer, SweepEvent, create_observer};
pub use state::{State, StateArgs};
pub use store::{InMemoryStorage, PrefixedStore, StateStore};
pub use sweep::{
    RemovalReason, StateSweeper, SweepReport, clear_stale_state, sweep_with_concurrency,
};
