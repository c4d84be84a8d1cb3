//! Component-local redux store
//!
//! A single state value, changed only by actions applied through one pure
//! reducer, with distinct selectors for reading and effects for reacting.
//!
//! - **Action channel**: multicast stream of applied actions ([`Store::actions`])
//! - **State cell**: current state plus every later state ([`Store::state_stream`])
//! - **Dispatch scheduler**: FIFO queue drained by one caller at a time, so
//!   re-entrant dispatch never recurses ([`Store::dispatch`])
//! - **Selectors**: distinct projections of the state ([`Store::select`])
//! - **Effects**: action streams fed back into dispatch, each isolated from
//!   the others' failures ([`Store::effect`])
//!
//! ```text
//! dispatch → queue → reducer → state cell → selectors → consumers / effects
//!                                                             │
//!            ▲────────────────────────────────────────────────┘
//! ```

mod action;
mod config;
mod effect;
mod error;
mod scheduler;
mod selector;
mod state_cell;
mod store;
mod stream;
mod subscription;

pub use action::{Action, INIT_KIND};
pub use config::{ReducerFaultPolicy, StoreConfig};
pub use error::{EffectId, ErrorReporter, LogReporter, StoreError};
pub use scheduler::{Reducer, StoreStatus};
pub use store::{Store, StoreBuilder};
pub use stream::{ActionStream, Selection, StateStream, StoreStream};
pub use subscription::Subscription;
