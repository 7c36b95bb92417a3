//! # Strata Dispatch
//!
//! Read-through / write-through dispatcher over three tiers: a fast cache,
//! a durable document store and an origin computation.
//!
//! Operations are bound to handlers in an [`OriginRegistry`]. A call looks
//! the result up in the cache, then in the document store, and only on a
//! full miss runs the handler; the result is then written back to the
//! enabled tiers wrapped in an [`Envelope`](strata_core::Envelope).
//!
//! ## Example
//!
//! ```ignore
//! use strata_dispatch::{DispatcherSettings, OriginRegistry, TieredDispatcherBuilder};
//!
//! let settings = DispatcherSettings::load(Some(Path::new("strata.toml")))?;
//! let dispatcher = TieredDispatcherBuilder::from_settings(&settings)?
//!     .cache(Arc::new(MokaCacheStore::new(settings.cache_config())))
//!     .registry(registry)
//!     .build()?;
//!
//! let mut session = dispatcher.session_with(params.into_controls());
//! let users = session.invoke("listUsers", vec![]).await?;
//! ```

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod origin;
pub mod session;
pub mod settings;

// Re-exports
pub use dispatcher::{Served, TieredDispatcher, TieredDispatcherBuilder};
pub use error::{DispatchError, OriginError};
pub use self::metrics::{TierMetrics, register_dispatch_metrics};
pub use origin::{FnHandler, OriginHandler, OriginRegistry, OriginResult};
pub use session::Session;
pub use settings::{DispatcherSettings, OperationSettings};

// Re-export the lower crates for consumers
pub use strata_core;
pub use strata_store;
