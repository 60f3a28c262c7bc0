//! Generic, immutable, prefix-aware address-division groupings for IP
//! address types.
#![doc(html_root_url = "https://docs.rs/ip-divisions/0.1.0-alpha.1")]

/// IP address family traits and marker types.
pub mod af;
/// A thin address facade: a section plus an optional zone identifier.
pub mod address;
/// Per-family factory and interning capability for segments and sections.
pub mod creator;
/// The single contiguous bit-range value type groupings are built from.
pub mod division;
mod error;
/// Generic, ordered, prefix-aware division sequences with lazy caches.
pub mod grouping;
/// Range enumeration over a grouping's concrete values.
pub mod iter;
/// Pure grouping-prefix-to-segment-prefix calculus.
pub mod prefix_calculus;
/// Radix conversion of a division sequence.
pub mod regroup;
/// A grouping of uniform, family-width segments.
pub mod section;
/// A family-width-fixed division.
pub mod segment;

pub use error::{Error, ErrorKind};
