//! Wayphase Runtime
//!
//! Async half of the engine: the [`TransitionRunner`] that executes action
//! lists with retries and a time budget, and the stateful [`PhaseManager`]
//! that drives one trip through its phases.

pub mod bus;
pub mod executor;
pub mod logging;
pub mod manager;
pub mod periodic;
pub mod runner;
pub mod session;

pub use bus::{ObserverBus, Subscription};
pub use executor::{CollaboratorExecutor, RetryPolicy};
pub use manager::{PhaseManager, PhaseManagerBuilder};
pub use periodic::PeriodicTask;
pub use runner::TransitionRunner;
pub use session::{SessionLiveness, TripSession};

pub mod prelude {
    pub use crate::bus::Subscription;
    pub use crate::executor::RetryPolicy;
    pub use crate::manager::{PhaseManager, PhaseManagerBuilder};
    pub use crate::periodic::PeriodicTask;
    pub use crate::session::TripSession;
}
