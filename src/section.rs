//! A grouping of uniform, family-width segments (component **C4**,
//! `spec.md` §4.3).

use core::ops::Deref;

use crate::af::Afi;
use crate::error::{err, Error, ErrorKind};
use crate::grouping::DivisionGrouping;
use crate::segment::Segment;

/// A [`DivisionGrouping`] whose divisions are all [`Segment<A>`] of the same
/// address family.
///
/// `Section` adds segment-indexed accessors and the structural operations
/// (`subsection`, `append`, `replace`) that only make sense once every
/// division has the same width (`spec.md` §4.3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Section<A: Afi> {
    grouping: DivisionGrouping<Segment<A>>,
}

impl<A: Afi> Deref for Section<A> {
    type Target = DivisionGrouping<Segment<A>>;

    fn deref(&self) -> &Self::Target {
        &self.grouping
    }
}

impl<A: Afi> Section<A> {
    /// Wrap an already-built [`DivisionGrouping`] of segments.
    pub fn new(segments: Vec<Segment<A>>, prefix: Option<u16>) -> Result<Self, Error> {
        Ok(Self {
            grouping: DivisionGrouping::new(segments, prefix)?,
        })
    }

    /// The segment at `index`.
    pub fn get_segment(&self, index: usize) -> Result<&Segment<A>, Error> {
        self.grouping.division(index)
    }

    /// Number of segments in this section.
    pub fn get_segment_count(&self) -> usize {
        self.grouping.division_count()
    }

    /// A copy of every segment, in order.
    pub fn get_segments(&self) -> Vec<Segment<A>> {
        self.grouping.divisions().to_vec()
    }

    /// Extract the segments `[from, to)` as a new section, re-deriving the
    /// overall prefix relative to the new start (`spec.md` §4.3).
    pub fn subsection(&self, from: usize, to: usize) -> Result<Self, Error> {
        if from > to || to > self.get_segment_count() {
            return Err(err!(
                ErrorKind::IndexOutOfBounds,
                "subsection range out of bounds"
            ));
        }
        let segments = self.grouping.divisions()[from..to].to_vec();
        let offset_bits: u16 = self.grouping.divisions()[..from]
            .iter()
            .map(|s| s.bit_count_for())
            .sum();
        let prefix = self.grouping.grouping_prefix().and_then(|p| {
            let total_bits: u16 = segments.iter().map(|s| s.bit_count_for()).sum();
            if p <= offset_bits {
                Some(0)
            } else {
                Some((p - offset_bits).min(total_bits))
            }
        });
        Self::new(segments, prefix)
    }

    /// Append `other`'s segments after this section's own. If
    /// `extend_prefix` is `true` and this section is fully prefixed (its
    /// prefix covers every one of its own segments), the result's prefix is
    /// extended to also cover `other`'s prefixed portion; otherwise the
    /// combined section keeps this section's own prefix only (`spec.md`
    /// §4.3).
    pub fn append(&self, other: &Self, extend_prefix: bool) -> Result<Self, Error> {
        let own_bits: u16 = self.grouping.divisions().iter().map(|s| s.bit_count_for()).sum();
        let mut segments = self.grouping.divisions().to_vec();
        segments.extend(other.grouping.divisions().iter().cloned());

        let prefix = match self.grouping.grouping_prefix() {
            Some(p) if extend_prefix && p >= own_bits => {
                other.grouping.grouping_prefix().map(|op| own_bits + op).or(Some(own_bits))
            }
            Some(p) => Some(p),
            None => None,
        };
        Self::new(segments, prefix)
    }

    /// Replace the segments starting at `index` with `other`'s segments,
    /// which must fit entirely within this section (`spec.md` §4.3).
    pub fn replace(&self, other: &Self, index: usize, extend_prefix: bool) -> Result<Self, Error> {
        let own_count = self.get_segment_count();
        let other_count = other.get_segment_count();
        if index + other_count > own_count {
            return Err(err!(
                ErrorKind::AddressSizeMismatch,
                "replacement segments do not fit within target section"
            ));
        }
        let mut segments = self.grouping.divisions().to_vec();
        for (offset, seg) in other.grouping.divisions().iter().enumerate() {
            segments[index + offset] = seg.clone();
        }
        let own_bits: u16 = self.grouping.divisions().iter().map(|s| s.bit_count_for()).sum();
        let replaced_start_bits: u16 = self.grouping.divisions()[..index]
            .iter()
            .map(|s| s.bit_count_for())
            .sum();

        let prefix = match self.grouping.grouping_prefix() {
            Some(p) if extend_prefix && p >= replaced_start_bits => {
                let other_total: u16 = other.grouping.divisions().iter().map(|s| s.bit_count_for()).sum();
                other
                    .grouping
                    .grouping_prefix()
                    .map(|op| replaced_start_bits + op)
                    .or(Some((replaced_start_bits + other_total).min(own_bits)))
            }
            Some(p) => Some(p),
            None => None,
        };
        Self::new(segments, prefix)
    }

    /// Reverse segment order, byte-swapping each segment's own value via
    /// [`Segment::reverse_bits`] with `per_byte = true` (`spec.md` §4.4.1).
    ///
    /// Requires every segment's `bit_count` to be byte-aligned; clears the
    /// overall prefix, since reversal is not prefix-preserving.
    pub fn reverse_bytes(&self) -> Result<Self, Error> {
        let segments = self
            .grouping
            .divisions()
            .iter()
            .rev()
            .map(|s| s.reverse_bits(true))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(segments, None)
    }
}

/// Helper trait-free accessor kept local to this module: every `Segment<A>`
/// has the same bit count, but that constant lives behind the `Afi` bound on
/// `A` rather than on `Segment` itself, so this reads it off an instance.
trait SegmentBits {
    fn bit_count_for(&self) -> u16;
}

impl<A: Afi> SegmentBits for Segment<A> {
    fn bit_count_for(&self) -> u16 {
        A::SEGMENT_BITS as u16
    }
}
