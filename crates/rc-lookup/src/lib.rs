//! rc-lookup: vehicle registration details scraped from public RC search pages.
//!
//! The pipeline is: fetch raw markup for an RC number, parse it, probe the
//! document for known field labels and generic two-column tables, and merge
//! per-source records into one flat key-value [`Record`].

pub mod catalog;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod record;
pub mod scan;

pub use catalog::FIELD_CATALOG;
pub use extract::{extract, Label};
pub use fetch::{
    AggregatorSource, FetchError, HttpClient, Metadata, RetryPolicy, Source, VahanxSource,
};
pub use normalize::{normalize, normalize_rc_number};
pub use record::{merge, Record};
pub use scan::{scan, scan_html};
