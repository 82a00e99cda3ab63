//! Cat fact session: fetches facts from a remote service, falls back to a
//! local pool on failure, and publishes one result per interval to a
//! single-slot holder.

pub mod cancel;
pub mod config;
pub mod fact;
pub mod logging;
pub mod remote;
pub mod scheduler;
pub mod session;
pub mod source;
pub mod state;
pub mod stream;

pub use cancel::CancelHandle;
pub use config::{Config, ConfigError};
pub use fact::{Fact, FactResult};
pub use remote::{HttpFactProvider, OfflineProvider, RemoteError, RemoteFactProvider};
pub use scheduler::{ui_context, ScheduleError, Scheduler, TokioScheduler, UiLoop, UiScheduler};
pub use session::FactSession;
pub use source::{FactSource, PeriodicFacts, SourceError};
pub use state::ResultHolder;
pub use stream::{FactStream, StreamError};
