//! Look up a Bluesky account's avatar URL from its handle.
//!
//! ```no_run
//! # async fn run() -> pfp_fetch::FetchResult<()> {
//! let config = pfp_fetch::Config::from_env()?;
//! let resolver = pfp_fetch::ProfileImageResolver::new(config)?;
//!
//! if let Some(url) = resolver.get_profile_image("devoxx").await? {
//!     println!("{url}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod handle;
pub mod interrupt;
pub mod resolver;
pub mod setup;
pub mod xrpc;

pub use config::{Config, Credentials};
pub use errors::{FetchError, FetchResult};
pub use handle::normalize_handle;
pub use interrupt::interruptible;
pub use resolver::ProfileImageResolver;
pub use xrpc::Profile;
