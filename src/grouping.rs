//! An immutable, ordered sequence of divisions with an overall prefix length
//! and lazy, thread-safe caches (component **C3**, `spec.md` §3, §4.2, §5).

use std::sync::OnceLock;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::{err, Error, ErrorKind};
use crate::prefix_calculus::segment_prefix_length;

/// Shared capability implemented by every element type that can sit inside a
/// [`DivisionGrouping`]: [`Division`][crate::division::Division] directly,
/// [`Segment<A>`][crate::segment::Segment] (which fixes `bit_count` to the
/// address family's width), and the radix-regrouped divisions produced by
/// [`regroup`][crate::regroup::regroup].
///
/// Generalizing over this trait, rather than over a type-parameterized base
/// class as the source does, is the "capability composition" substitution
/// described in `SPEC_FULL.md` §9.
pub trait DivisionValue: Clone + core::fmt::Debug {
    fn bit_count(&self) -> u8;
    fn lower_value(&self) -> u64;
    fn upper_value(&self) -> u64;
    fn division_prefix(&self) -> Option<u8>;
    /// Return a copy of `self` carrying a different division prefix.
    fn with_prefix(&self, prefix: Option<u8>) -> Self;

    fn is_multiple(&self) -> bool {
        self.lower_value() != self.upper_value()
    }

    fn max_value(&self) -> u64 {
        if self.bit_count() >= 64 {
            u64::MAX
        } else {
            (1u64 << self.bit_count()) - 1
        }
    }

    fn is_full_range(&self) -> bool {
        self.lower_value() == 0 && self.upper_value() == self.max_value()
    }

    fn division_value_count(&self) -> u64 {
        self.upper_value() - self.lower_value() + 1
    }

    /// See [`Division::min_prefix`][crate::division::Division::min_prefix].
    fn min_prefix(&self) -> u8 {
        let bit_count = self.bit_count();
        if !self.is_multiple() {
            return bit_count
                - self
                    .lower_value()
                    .trailing_zeros()
                    .min(bit_count as u32) as u8;
        }
        for k in 0..=bit_count {
            let host_bits = bit_count - k;
            let host_mask = if host_bits == 0 {
                0
            } else {
                (1u64 << host_bits) - 1
            };
            let top_mask = self.max_value() & !host_mask;
            if self.lower_value() & host_mask == 0
                && self.upper_value() & host_mask == host_mask
                && self.lower_value() & top_mask == self.upper_value() & top_mask
            {
                return k;
            }
        }
        bit_count
    }

    fn is_same_values(&self, other: &Self) -> bool {
        self.bit_count() == other.bit_count()
            && self.lower_value() == other.lower_value()
            && self.upper_value() == other.upper_value()
    }
}

impl DivisionValue for crate::division::Division {
    fn bit_count(&self) -> u8 {
        crate::division::Division::bit_count(self)
    }
    fn lower_value(&self) -> u64 {
        crate::division::Division::lower_value(self)
    }
    fn upper_value(&self) -> u64 {
        crate::division::Division::upper_value(self)
    }
    fn division_prefix(&self) -> Option<u8> {
        crate::division::Division::division_prefix(self)
    }
    fn with_prefix(&self, prefix: Option<u8>) -> Self {
        crate::division::Division::with_prefix(self, prefix)
    }
}

#[derive(Default)]
struct Caches {
    count: OnceLock<BigUint>,
    lower_bytes: OnceLock<Vec<u8>>,
    upper_bytes: OnceLock<Vec<u8>>,
    multiple: OnceLock<bool>,
    hash: OnceLock<u64>,
}

impl Clone for Caches {
    fn clone(&self) -> Self {
        // Caches are derived data: a clone starts empty and is lazily
        // repopulated, rather than copying (possibly stale w.r.t. a
        // still-racing writer) cached values.
        Self::default()
    }
}

impl core::fmt::Debug for Caches {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Caches").finish_non_exhaustive()
    }
}

/// An immutable ordered sequence of divisions, with an optional overall
/// prefix length and lazily-computed, thread-safe derived values
/// (`spec.md` §3, §4.2).
#[derive(Debug, Clone)]
pub struct DivisionGrouping<D: DivisionValue> {
    divisions: Vec<D>,
    prefix: Option<u16>,
    caches: Caches,
}

impl<D: DivisionValue> DivisionGrouping<D> {
    /// Construct a new grouping, normalizing each division's own prefix to
    /// be consistent with `grouping_prefix` (invariant 2, `spec.md` §3).
    ///
    /// A division entirely in the host portion (at or past
    /// `grouping_prefix`) must already be full-range: turning a single
    /// address plus a prefix length into a whole prefix block is the
    /// [`Creator`][crate::creator::Creator]'s job (masking each segment's
    /// value at construction time), not this constructor's — see `spec.md`
    /// §4.3.
    pub fn new(divisions: Vec<D>, grouping_prefix: Option<u16>) -> Result<Self, Error> {
        let mut offset: i64 = 0;
        let mut normalized = Vec::with_capacity(divisions.len());
        for div in divisions {
            let bit_count = div.bit_count();
            let div_prefix = grouping_prefix.map(|p| {
                segment_prefix_length(bit_count, p as i64 - offset)
            });
            let div = match div_prefix {
                Some(Some(0)) if grouping_prefix.unwrap() as i64 <= offset => {
                    if !div.is_full_range() {
                        return Err(err!(
                            ErrorKind::InvalidArgument,
                            "division in host portion of prefix must be full-range"
                        ));
                    }
                    div.with_prefix(Some(0))
                }
                Some(p) => div.with_prefix(p),
                None => div,
            };
            offset += bit_count as i64;
            normalized.push(div);
        }
        if let Some(p) = grouping_prefix {
            if p as i64 > offset {
                return Err(err!(
                    ErrorKind::InvalidArgument,
                    "grouping prefix exceeds total bit count"
                ));
            }
        }
        Ok(Self {
            divisions: normalized,
            prefix: grouping_prefix,
            caches: Caches::default(),
        })
    }

    /// The divisions making up this grouping, in order (index 0 is most
    /// significant).
    pub fn divisions(&self) -> &[D] {
        &self.divisions
    }

    /// Number of divisions.
    pub fn division_count(&self) -> usize {
        self.divisions.len()
    }

    /// Get the division at `index`.
    pub fn division(&self, index: usize) -> Result<&D, Error> {
        self.divisions
            .get(index)
            .ok_or_else(|| err!(ErrorKind::IndexOutOfBounds, "division index out of bounds"))
    }

    /// Total bit width across all divisions.
    pub fn total_bit_count(&self) -> u16 {
        self.divisions.iter().map(|d| d.bit_count() as u16).sum()
    }

    /// The grouping-level prefix length, if any.
    pub fn grouping_prefix(&self) -> Option<u16> {
        self.prefix
    }

    /// `true` iff this grouping carries a prefix length.
    pub fn is_prefixed(&self) -> bool {
        self.prefix.is_some()
    }

    /// Canonical network-byte-order materialization of either the lower
    /// (`low = true`) or upper (`low = false`) bound of this grouping's
    /// value range. Cached; `spec.md` §4.2.
    pub fn get_bytes(&self, low: bool) -> Vec<u8> {
        let cache = if low {
            &self.caches.lower_bytes
        } else {
            &self.caches.upper_bytes
        };
        cache
            .get_or_init(|| {
                let mut acc = BigUint::zero();
                for div in &self.divisions {
                    let value = if low { div.lower_value() } else { div.upper_value() };
                    acc <<= div.bit_count() as u32;
                    acc |= BigUint::from(value);
                }
                let n_bytes = ((self.total_bit_count() as usize) + 7) / 8;
                let mut bytes = acc.to_bytes_be();
                if bytes.len() < n_bytes {
                    let mut padded = vec![0u8; n_bytes - bytes.len()];
                    padded.append(&mut bytes);
                    bytes = padded;
                }
                bytes
            })
            .clone()
    }

    /// Arbitrary-precision count of distinct values this grouping
    /// represents: the product of each division's `divisionValueCount`.
    /// Cached.
    pub fn get_count(&self) -> BigUint {
        self.caches
            .count
            .get_or_init(|| {
                self.divisions
                    .iter()
                    .fold(BigUint::one(), |acc, d| acc * d.division_value_count())
            })
            .clone()
    }

    /// `true` iff this grouping represents more than one concrete value.
    /// Scans from the last division to the first, short-circuiting on the
    /// first multiple division (`spec.md` §4.2). Cached.
    pub fn is_multiple(&self) -> bool {
        *self
            .caches
            .multiple
            .get_or_init(|| self.divisions.iter().rev().any(|d| d.is_multiple()))
    }

    /// The smallest prefix length under which this grouping's value range is
    /// equivalent (`spec.md` §4.2). Not cached (cheap, O(divisions)).
    ///
    /// Walks divisions from least to most significant. A division whose own
    /// `minPrefix` equals its full `bitCount` means the remaining high bits
    /// all matter in full, so the walk stops there and returns the
    /// accumulated total unchanged; a division with `minPrefix == 0`
    /// collapses away entirely and the walk continues leftward; anything in
    /// between fixes the boundary at `total - bitCount + minPrefix`.
    pub fn get_min_prefix(&self) -> u16 {
        let mut total: u16 = self.total_bit_count();
        for div in self.divisions.iter().rev() {
            let bit_count = div.bit_count() as u16;
            let mp = div.min_prefix();
            if mp as u16 == bit_count {
                return total;
            }
            total -= bit_count;
            if mp != 0 {
                return total + mp as u16;
            }
        }
        0
    }

    /// The prefix length for which `lowerValue` plus that prefix exactly
    /// reproduces this grouping's range, or `None` if no such prefix exists
    /// (`spec.md` §4.2).
    pub fn get_equivalent_prefix(&self) -> Option<u16> {
        let mut total: u16 = 0;
        let mut iter = self.divisions.iter().peekable();
        while let Some(div) = iter.next() {
            let bit_count = div.bit_count();
            if !div.is_multiple() {
                // Single-valued division: fully significant regardless of
                // its own internal trailing zeros, so it contributes its
                // whole bit count and the walk continues rightward.
                total += bit_count as u16;
                continue;
            }
            // The first multiple (full-range host) division fixes the host
            // boundary: it contributes its own `minPrefix` bits, and every
            // division after it must be full-range for the whole grouping
            // to be a single CIDR block.
            total += div.min_prefix() as u16;
            for rest in iter {
                if !rest.is_full_range() {
                    return None;
                }
            }
            return Some(total);
        }
        Some(total)
    }

    /// `true` iff this grouping's `[lower, upper]` range equals the CIDR
    /// block determined by the lower address and prefix `p` (`spec.md`
    /// §4.2).
    pub fn is_range_equivalent(&self, p: u16) -> bool {
        let mut offset: u16 = 0;
        for div in &self.divisions {
            let bit_count = div.bit_count() as u16;
            let start = offset;
            let end = offset + bit_count;
            offset = end;
            if p <= start {
                // Entirely host: must be full-range.
                if !div.is_full_range() {
                    return false;
                }
            } else if p >= end {
                // Entirely network: must be single-valued.
                if div.is_multiple() {
                    return false;
                }
            } else {
                // Straddles the boundary.
                let host_bits = (end - p) as u8;
                let host_mask = if host_bits == 0 {
                    0
                } else {
                    (1u64 << host_bits) - 1
                };
                let top_mask = div.max_value() & !host_mask;
                if div.lower_value() & top_mask != div.upper_value() & top_mask {
                    return false;
                }
                if div.lower_value() & host_mask != 0 || div.upper_value() & host_mask != host_mask
                {
                    return false;
                }
            }
        }
        true
    }

    /// `isRangeEquivalent` evaluated at this grouping's own prefix length,
    /// or (when un-prefixed) `true` iff the grouping is not multiple
    /// (`spec.md` §4.2).
    pub fn is_range_equivalent_to_prefix(&self) -> bool {
        match self.prefix {
            Some(p) => self.is_range_equivalent(p),
            None => !self.is_multiple(),
        }
    }

    /// Round the current prefix to the next or previous segment boundary.
    pub fn get_adjusted_prefix(
        &self,
        next_segment: bool,
        bits_per_segment: u16,
        skip_bit_count_prefix: bool,
    ) -> u16 {
        let bit_count = self.total_bit_count();
        match self.prefix {
            None => {
                if next_segment {
                    if self.get_min_prefix() == 0 {
                        0
                    } else {
                        bit_count
                    }
                } else if skip_bit_count_prefix {
                    bit_count.saturating_sub(bits_per_segment)
                } else {
                    bit_count
                }
            }
            Some(p) => {
                if next_segment {
                    if p == bit_count {
                        bit_count
                    } else {
                        let rem = p % bits_per_segment;
                        if rem == 0 {
                            (p + bits_per_segment).min(bit_count)
                        } else {
                            (p + (bits_per_segment - rem)).min(bit_count)
                        }
                    }
                } else if p == 0 {
                    0
                } else {
                    let rem = (p - 1) % bits_per_segment;
                    p.saturating_sub(rem + 1)
                }
            }
        }
    }

    /// Clamp `current_prefix + delta` into `[0, totalBitCount]`.
    pub fn get_adjusted_prefix_by_delta(&self, delta: i32, floor: bool, ceiling: bool) -> u16 {
        let bit_count = self.total_bit_count() as i32;
        let current = self.prefix.map(|p| p as i32).unwrap_or(bit_count);
        let mut adjusted = current + delta;
        if floor {
            adjusted = adjusted.max(0);
        }
        if ceiling {
            adjusted = adjusted.min(bit_count);
        }
        adjusted.clamp(0, bit_count) as u16
    }

    /// Structural equality of the division sequence, ignoring each
    /// division's own prefix and this grouping's overall prefix
    /// (`spec.md` §4.2).
    pub fn is_same_grouping(&self, other: &Self) -> bool {
        self.divisions.len() == other.divisions.len()
            && self
                .divisions
                .iter()
                .zip(other.divisions.iter())
                .all(|(a, b)| a.is_same_values(b))
    }

    /// Hash derived from the same `(bitCount, lower[, upper])` fold used by
    /// [`is_same_grouping`][Self::is_same_grouping]. Cached.
    ///
    /// The source's cache uses a raw field with `0` as an "unset" sentinel,
    /// which causes it to recompute on every access for a grouping whose
    /// fold genuinely produces `0`. `OnceLock` already distinguishes unset
    /// from set, so here a cached `0` is returned directly; see
    /// `DESIGN.md`'s Open Question (a).
    pub fn hash_code(&self) -> u64 {
        *self.caches.hash.get_or_init(|| {
            let fold = |v: u64| (v >> 32) ^ (v & 0xFFFF_FFFF);
            self.divisions.iter().fold(0u64, |h, d| {
                let mut h = h.wrapping_mul(31).wrapping_add(fold(d.lower_value()));
                if d.is_multiple() {
                    h = h.wrapping_mul(31).wrapping_add(fold(d.upper_value()));
                }
                h
            })
        })
    }
}

impl<D: DivisionValue> PartialEq for DivisionGrouping<D> {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_grouping(other)
    }
}

impl<D: DivisionValue> Eq for DivisionGrouping<D> {}

impl<D: DivisionValue> core::hash::Hash for DivisionGrouping<D> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}
