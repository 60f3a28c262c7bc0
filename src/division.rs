//! A single contiguous bit range carrying a value or a value range and an
//! optional prefix length (component **C1**, `spec.md` §4.1).

use crate::error::{err, Error, ErrorKind};

mod private {
    use super::*;

    /// A contiguous range of `bitCount` bits, holding `[lower, upper]` and an
    /// optional division-local prefix length.
    ///
    /// Invariants enforced at construction (`spec.md` §3): `1 <= bitCount <=
    /// 63`, `lower <= upper < 2^bitCount`, and `divisionPrefix`, when
    /// present, lies in `[0, bitCount]`.
    #[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
    pub struct Division {
        bit_count: u8,
        lower: u64,
        upper: u64,
        prefix: Option<u8>,
    }

    impl Division {
        pub(crate) fn new_unchecked(
            bit_count: u8,
            lower: u64,
            upper: u64,
            prefix: Option<u8>,
        ) -> Self {
            Self {
                bit_count,
                lower,
                upper,
                prefix,
            }
        }

        /// Construct a new [`Division`], validating the invariants in
        /// `spec.md` §3.
        pub fn new(
            bit_count: u8,
            lower: u64,
            upper: u64,
            prefix: Option<u8>,
        ) -> Result<Self, Error> {
            if !(1..=63).contains(&bit_count) {
                return Err(err!(
                    ErrorKind::InvalidArgument,
                    "division bit count must be in [1, 63]"
                ));
            }
            let max = (1u64 << bit_count) - 1;
            if lower > upper || upper > max {
                return Err(err!(
                    ErrorKind::InvalidArgument,
                    "division value range out of bounds"
                ));
            }
            if let Some(p) = prefix {
                if p > bit_count {
                    return Err(err!(
                        ErrorKind::InvalidArgument,
                        "division prefix exceeds bit count"
                    ));
                }
            }
            Ok(Self::new_unchecked(bit_count, lower, upper, prefix))
        }

        /// Construct a single-valued, prefix-less division.
        pub fn single(bit_count: u8, value: u64) -> Result<Self, Error> {
            Self::new(bit_count, value, value, None)
        }

        /// Construct the full-range division for `bit_count`.
        pub fn full_range(bit_count: u8) -> Result<Self, Error> {
            let max = if bit_count >= 63 {
                (1u64 << 63) - 1
            } else {
                (1u64 << bit_count) - 1
            };
            Self::new(bit_count, 0, max, None)
        }

        /// Bit width of this division.
        pub fn bit_count(&self) -> u8 {
            self.bit_count
        }

        /// Lower bound of the division's value range.
        pub fn lower_value(&self) -> u64 {
            self.lower
        }

        /// Upper bound of the division's value range.
        pub fn upper_value(&self) -> u64 {
            self.upper
        }

        /// The division-local prefix length, if any.
        pub fn division_prefix(&self) -> Option<u8> {
            self.prefix
        }

        /// `true` iff `lower != upper`.
        pub fn is_multiple(&self) -> bool {
            self.lower != self.upper
        }

        /// `true` iff `[lower, upper]` spans every value representable in
        /// `bit_count` bits.
        pub fn is_full_range(&self) -> bool {
            self.lower == 0 && self.upper == self.max_value()
        }

        /// `true` iff `lower == upper == 0`.
        pub fn is_zero(&self) -> bool {
            self.lower == 0 && self.upper == 0
        }

        /// Number of distinct values covered by `[lower, upper]`.
        pub fn division_value_count(&self) -> u64 {
            self.upper - self.lower + 1
        }

        fn max_value(&self) -> u64 {
            (1u64 << self.bit_count) - 1
        }

        /// `true` iff masking both bounds of `self`'s range with `mask` yields
        /// `value & mask` on both ends.
        pub fn matches_with_mask(&self, value: u64, mask: u64) -> bool {
            (self.lower & mask) == (value & mask) && (self.upper & mask) == (value & mask)
        }

        /// The smallest `k` in `[0, bitCount]` such that masking to the top `k`
        /// bits collapses `[lower, upper]` to a single value.
        pub fn min_prefix(&self) -> u8 {
            if !self.is_multiple() {
                return self.bit_count - self.lower.trailing_zeros().min(self.bit_count as u32) as u8;
            }
            // Multiple-valued: find the smallest k such that the low
            // (bitCount - k) bits form a full-range block (lower's tail all
            // zero, upper's tail all one) with the remaining top k bits fixed.
            for k in 0..=self.bit_count {
                let host_bits = self.bit_count - k;
                let host_mask = if host_bits == 0 {
                    0
                } else {
                    (1u64 << host_bits) - 1
                };
                let top_mask = self.max_value() & !host_mask;
                if self.lower & host_mask == 0
                    && self.upper & host_mask == host_mask
                    && self.lower & top_mask == self.upper & top_mask
                {
                    return k;
                }
            }
            self.bit_count
        }

        /// Structural equality of `(bitCount, lower, upper)`, ignoring the
        /// division prefix.
        pub fn is_same_values(&self, other: &Self) -> bool {
            self.bit_count == other.bit_count && self.lower == other.lower && self.upper == other.upper
        }

        /// Return a copy of `self` with a different division prefix, used by
        /// [`DivisionGrouping`][crate::grouping::DivisionGrouping] when it
        /// recomputes per-division prefixes to maintain invariant 2 of `spec.md`
        /// §3.
        pub fn with_prefix(&self, prefix: Option<u8>) -> Self {
            Self::new_unchecked(self.bit_count, self.lower, self.upper, prefix)
        }

        /// Reverse the bit pattern of this division's value range.
        ///
        /// When `per_byte` is `false`, the full `bitCount`-wide pattern of both
        /// bounds is reversed (re-sorting them if reversal inverts their order).
        /// When `per_byte` is `true`, each constituent byte is reversed
        /// independently, which requires `bitCount` to be a whole number of
        /// bytes. Either way the division prefix is cleared: reversal is not
        /// prefix-preserving (`spec.md` §4.4.1).
        pub fn reverse_bits(&self, per_byte: bool) -> Result<Self, Error> {
            if per_byte && self.bit_count % 8 != 0 {
                return Err(err!(
                    ErrorKind::InvalidArgument,
                    "per-byte reversal requires a byte-aligned bit count"
                ));
            }
            let rev = |v: u64| -> u64 {
                if per_byte {
                    super::reverse_bytes_in_value(v, self.bit_count)
                } else {
                    super::reverse_bits_in_value(v, self.bit_count)
                }
            };
            let (a, b) = (rev(self.lower), rev(self.upper));
            let (lower, upper) = if a <= b { (a, b) } else { (b, a) };
            Ok(Self::new_unchecked(self.bit_count, lower, upper, None))
        }
    }
}

pub use self::private::Division;

fn reverse_bits_in_value(value: u64, bit_count: u8) -> u64 {
    let mut v = value;
    let mut r = 0u64;
    for _ in 0..bit_count {
        r = (r << 1) | (v & 1);
        v >>= 1;
    }
    r
}

fn reverse_bytes_in_value(value: u64, bit_count: u8) -> u64 {
    let n_bytes = bit_count / 8;
    let mut r = 0u64;
    for i in 0..n_bytes {
        let byte = (value >> (i * 8)) & 0xFF;
        r |= byte << ((n_bytes - 1 - i) * 8);
    }
    r
}

#[cfg(any(test, feature = "arbitrary"))]
mod arbitrary {
    use super::*;

    use proptest::prelude::*;

    /// Generate an arbitrary, invariant-respecting [`Division`] of a fixed
    /// `bit_count`.
    pub fn any_division(bit_count: u8) -> impl Strategy<Value = Division> {
        let max = if bit_count >= 63 {
            (1u64 << 63) - 1
        } else {
            (1u64 << bit_count) - 1
        };
        (0..=max, 0..=max).prop_map(move |(a, b)| {
            let (lower, upper) = if a <= b { (a, b) } else { (b, a) };
            Division::new(bit_count, lower, upper, None).unwrap()
        })
    }
}

#[cfg(any(test, feature = "arbitrary"))]
pub use self::arbitrary::any_division;
