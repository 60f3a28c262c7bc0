//! Pure functions mapping between grouping-level and segment-level prefix
//! lengths (component **C8**, `spec.md` §4.6).
//!
//! These are plain, allocation-free functions rather than methods on
//! [`DivisionGrouping`][crate::grouping::DivisionGrouping] so that
//! construction code (which has not yet assembled a grouping) and grouping
//! algorithms alike can share one implementation.

/// Compute the per-segment prefix length for the segment at `segment_index`
/// within a grouping whose overall prefix is `grouping_prefix`.
///
/// Returns `None` when `grouping_prefix` is `None`, or forwards to
/// [`segment_prefix_length`] with the prefix expressed relative to the start
/// of the segment.
pub fn indexed_segment_prefix_length(
    bits_per_segment: u8,
    grouping_prefix: Option<u16>,
    segment_index: usize,
) -> Option<u8> {
    let p = grouping_prefix?;
    let offset = segment_index as i64 * bits_per_segment as i64;
    segment_prefix_length(bits_per_segment, p as i64 - offset)
}

/// Compute a single segment's prefix length given the number of prefix bits
/// (`prefixed_bits`) that remain once earlier segments have been accounted
/// for.
///
/// - `0` if `prefixed_bits <= 0` (the segment is entirely past the prefix
///   boundary, in host territory).
/// - `prefixed_bits` if `0 < prefixed_bits <= segment_bits` (the prefix
///   boundary falls within, or exactly at the end of, this segment).
/// - `segment_bits` if `prefixed_bits > segment_bits` (the segment is
///   entirely within the network portion, so it is fully significant).
pub fn segment_prefix_length(segment_bits: u8, prefixed_bits: i64) -> Option<u8> {
    if prefixed_bits <= 0 {
        Some(0)
    } else if prefixed_bits <= segment_bits as i64 {
        Some(prefixed_bits as u8)
    } else {
        Some(segment_bits)
    }
}
