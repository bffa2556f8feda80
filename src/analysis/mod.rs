//! Point-in-time computations over already-fetched series.
//!
//! - as-of lookups (`asof`)
//! - post-filing window returns (`returns`)
//! - rate-environment buckets (`bucket`)

pub mod asof;
pub mod bucket;
pub mod returns;

pub use asof::{first_on_or_after, latest_on_or_before};
pub use bucket::{RateBucket, classify};
pub use returns::{ReturnWindows, WholeWindowReturn, WindowReturns, compute_returns, whole_window_return};
