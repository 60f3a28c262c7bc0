//! A family-width-fixed division (component **C2**, `spec.md` §4.4).

use core::marker::PhantomData;

use crate::af::Afi;
use crate::division::Division;
use crate::error::{err, Error, ErrorKind};
use crate::grouping::DivisionValue;
use crate::prefix_calculus::segment_prefix_length;

/// A [`Division`] whose `bitCount` is fixed by the address family `A`
/// (`Afi::SEGMENT_BITS`).
///
/// Carrying `A` as a `PhantomData` marker, rather than generating a
/// per-family concrete type, mirrors the teacher's `ConcreteAddress<A, P>`
/// pattern while keeping the value representation itself family-agnostic.
#[derive(Clone, Copy, Debug)]
pub struct Segment<A: Afi> {
    division: Division,
    _afi: PhantomData<A>,
}

impl<A: Afi> PartialEq for Segment<A> {
    fn eq(&self, other: &Self) -> bool {
        self.division == other.division
    }
}

impl<A: Afi> Eq for Segment<A> {}

impl<A: Afi> core::hash::Hash for Segment<A> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.division.hash(state);
    }
}

impl<A: Afi> Segment<A> {
    /// Construct a segment from a single value, masked if `prefix` is given
    /// (`spec.md` §4.4, construction path 1/2).
    pub fn new(value: u64, prefix: Option<u8>) -> Result<Self, Error> {
        let bits = A::SEGMENT_BITS;
        let max = (1u64 << bits) - 1;
        if value > max {
            return Err(err!(
                ErrorKind::InvalidArgument,
                "segment value exceeds family segment width"
            ));
        }
        let (lower, upper) = match prefix {
            None => (value, value),
            Some(p) => {
                if p > bits {
                    return Err(err!(
                        ErrorKind::InvalidArgument,
                        "segment prefix exceeds family segment width"
                    ));
                }
                let host_bits = bits - p;
                let host_mask = if host_bits == 0 { 0 } else { (1u64 << host_bits) - 1 };
                (value & !host_mask, value | host_mask)
            }
        };
        let division = Division::new(bits, lower, upper, prefix)?;
        Ok(Self {
            division,
            _afi: PhantomData,
        })
    }

    /// Construct a segment from an explicit `[lower, upper]` range, with an
    /// optional prefix (`spec.md` §4.4, construction path 3).
    pub fn with_range(lower: u64, upper: u64, prefix: Option<u8>) -> Result<Self, Error> {
        let bits = A::SEGMENT_BITS;
        let division = Division::new(bits, lower, upper, prefix)?;
        Ok(Self {
            division,
            _afi: PhantomData,
        })
    }

    /// The full-range segment for family `A`.
    pub fn full_range() -> Self {
        Self {
            division: Division::full_range(A::SEGMENT_BITS).expect("segment width is always valid"),
            _afi: PhantomData,
        }
    }

    /// The underlying [`Division`].
    pub fn division(&self) -> &Division {
        &self.division
    }

    pub fn lower_value(&self) -> u64 {
        self.division.lower_value()
    }

    pub fn upper_value(&self) -> u64 {
        self.division.upper_value()
    }

    pub fn division_prefix(&self) -> Option<u8> {
        self.division.division_prefix()
    }

    pub fn is_multiple(&self) -> bool {
        self.division.is_multiple()
    }

    pub fn is_full_range(&self) -> bool {
        self.division.is_full_range()
    }

    /// Compute this segment's local prefix length given the grouping-level
    /// prefix and this segment's index within the grouping (`spec.md`
    /// §4.6).
    pub fn prefix_length_for(grouping_prefix: Option<u16>, segment_index: usize) -> Option<u8> {
        let p = grouping_prefix?;
        let offset = segment_index as i64 * A::SEGMENT_BITS as i64;
        segment_prefix_length(A::SEGMENT_BITS, p as i64 - offset)
    }

    /// Reverse the bit pattern of this segment's value range; see
    /// [`Division::reverse_bits`].
    pub fn reverse_bits(&self, per_byte: bool) -> Result<Self, Error> {
        Ok(Self {
            division: self.division.reverse_bits(per_byte)?,
            _afi: PhantomData,
        })
    }
}

impl<A: Afi> DivisionValue for Segment<A> {
    fn bit_count(&self) -> u8 {
        A::SEGMENT_BITS
    }
    fn lower_value(&self) -> u64 {
        self.division.lower_value()
    }
    fn upper_value(&self) -> u64 {
        self.division.upper_value()
    }
    fn division_prefix(&self) -> Option<u8> {
        self.division.division_prefix()
    }
    fn with_prefix(&self, prefix: Option<u8>) -> Self {
        Self {
            division: self.division.with_prefix(prefix),
            _afi: PhantomData,
        }
    }
}

#[cfg(any(test, feature = "arbitrary"))]
mod arbitrary {
    use super::*;

    use proptest::prelude::*;

    /// Generate an arbitrary, invariant-respecting [`Segment<A>`].
    pub fn any_segment<A: Afi>() -> impl Strategy<Value = Segment<A>> {
        let max = (1u64 << A::SEGMENT_BITS) - 1;
        (0..=max, 0..=max).prop_map(move |(a, b)| {
            let (lower, upper) = if a <= b { (a, b) } else { (b, a) };
            Segment::<A>::with_range(lower, upper, None).unwrap()
        })
    }
}

#[cfg(any(test, feature = "arbitrary"))]
pub use self::arbitrary::any_segment;
