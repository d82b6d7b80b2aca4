//! Quote digest pipeline.
//!
//! One run flows through:
//! 1. `auth::authenticate()` — login, the only fatal step
//! 2. `finder::find_open_quotes()` — search, degrades to an empty list
//! 3. `QuoteEnricher::enrich_all()` — per-quote joins, failures skip the quote
//! 4. `grouper::group_by_manager()` — partition by manager email
//! 5. `digest::dispatch()` — render and send, failures skip the recipient
//!
//! Every step completes before the next starts; remote calls are never
//! issued concurrently.

pub mod auth;
pub mod digest;
pub mod driver;
pub mod enricher;
pub mod finder;
pub mod grouper;
pub mod types;

pub use driver::{PipelineDriver, RunReport};
pub use enricher::QuoteEnricher;
pub use grouper::Grouping;
pub use types::{Digest, ManagerGroup, QuoteSummary};
