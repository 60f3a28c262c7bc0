//! Enumeration of the concrete values a grouping represents (component
//! **C7**, `spec.md` §4.8, plus the added granularities in §4.8.1).

use crate::af::Afi;
use crate::creator::Creator;
use crate::error::Error;
use crate::section::Section;

/// One cursor slot: the inclusive `[lower, upper]` bound a segment's value
/// ranges over, the `step` between successive cursor values, and the
/// `current` value.
#[derive(Clone, Copy, Debug)]
struct Slot {
    lower: u64,
    upper: u64,
    step: u64,
    current: u64,
}

/// Ripple-carry cartesian-product iterator over a [`Section<A>`]'s value
/// range.
///
/// Each call to [`next`][Iterator::next] advances the least-significant
/// slot by its `step`; when it wraps past its upper bound it resets to its
/// lower bound and carries into the next-more-significant slot, exactly as
/// incrementing a mixed-radix number (`spec.md` §4.8). [`PrefixBlockIterator`]
/// reuses this machinery with a non-unit step so a straddling segment's
/// cursor moves in whole-block increments rather than per-address ones.
pub struct RangeIterator<A: Afi> {
    creator: Creator<A>,
    slots: Vec<Slot>,
    prefix: Option<u16>,
    exhausted: bool,
}

impl<A: Afi> RangeIterator<A> {
    /// Build an iterator over every concrete value of `section`.
    pub fn new(section: &Section<A>) -> Self {
        let slots = section
            .get_segments()
            .iter()
            .map(|s| Slot {
                lower: s.lower_value(),
                upper: s.upper_value(),
                step: 1,
                current: s.lower_value(),
            })
            .collect();
        Self::with_slots(slots, section.grouping_prefix())
    }

    fn with_slots(slots: Vec<Slot>, prefix: Option<u16>) -> Self {
        let exhausted = slots.is_empty();
        Self {
            creator: Creator::default(),
            slots,
            prefix,
            exhausted,
        }
    }

    fn advance(&mut self) {
        for slot in self.slots.iter_mut().rev() {
            if slot.current + slot.step <= slot.upper {
                slot.current += slot.step;
                return;
            }
            slot.current = slot.lower;
        }
        self.exhausted = true;
    }
}

impl<A: Afi> Iterator for RangeIterator<A> {
    type Item = Result<Section<A>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let values: Vec<u64> = self.slots.iter().map(|s| s.current).collect();
        let result = self.creator.create_section(&values, self.prefix);
        self.advance();
        Some(result)
    }
}

/// Iterate only the distinct prefix *blocks* `section`'s prefix length
/// divides it into, rather than every individual value (`spec.md` §4.8.1).
///
/// Segments entirely within the prefix keep their own range, stepped one
/// value at a time; the segment straddling the prefix boundary, if any,
/// steps in whole-block increments (its host bits held at zero); every
/// segment entirely past the boundary is pinned to zero and never stepped.
/// The [`Creator`] widens each zero-prefix segment back to full range when
/// materializing a result, so every yielded [`Section`] represents one
/// whole block rather than one address within it. Cardinality equals
/// `get_count()` divided by the number of addresses per block.
pub struct PrefixBlockIterator<A: Afi> {
    inner: RangeIterator<A>,
}

impl<A: Afi> PrefixBlockIterator<A> {
    /// Build a block iterator for `section`'s own prefix length.
    pub fn new(section: &Section<A>) -> Result<Self, Error> {
        let prefix = section
            .grouping_prefix()
            .unwrap_or_else(|| section.total_bit_count());
        let bits_per_segment = A::SEGMENT_BITS as u16;
        let boundary = prefix / bits_per_segment;
        let remainder = (prefix % bits_per_segment) as u8;

        let slots = section
            .get_segments()
            .iter()
            .enumerate()
            .map(|(i, seg)| {
                let i = i as u16;
                if i < boundary {
                    Slot {
                        lower: seg.lower_value(),
                        upper: seg.upper_value(),
                        step: 1,
                        current: seg.lower_value(),
                    }
                } else if i == boundary && remainder > 0 {
                    let host_bits = A::SEGMENT_BITS - remainder;
                    let host_mask = if host_bits == 0 { 0 } else { (1u64 << host_bits) - 1 };
                    let step = host_mask + 1;
                    let lower = seg.lower_value() & !host_mask;
                    let upper = seg.upper_value() & !host_mask;
                    Slot {
                        lower,
                        upper,
                        step,
                        current: lower,
                    }
                } else {
                    Slot {
                        lower: 0,
                        upper: 0,
                        step: 1,
                        current: 0,
                    }
                }
            })
            .collect();
        Ok(Self {
            inner: RangeIterator::with_slots(slots, Some(prefix)),
        })
    }
}

impl<A: Afi> Iterator for PrefixBlockIterator<A> {
    type Item = Result<Section<A>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Iterate the sequence of successively shorter prefix lengths from
/// `start` down to zero, in steps of `bits_per_segment` (`spec.md`
/// §4.8.1).
pub struct PrefixLengthIterator {
    current: Option<u16>,
    step: u16,
}

impl PrefixLengthIterator {
    pub fn new(start: u16, bits_per_segment: u16) -> Self {
        Self {
            current: Some(start),
            step: bits_per_segment.max(1),
        }
    }
}

impl Iterator for PrefixLengthIterator {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = current.checked_sub(self.step);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::af::Ipv4;
    use crate::segment::Segment;

    fn section(octets: [u64; 4], prefix: Option<u16>) -> Section<Ipv4> {
        Section::new(
            octets.iter().map(|&v| Segment::new(v, None).unwrap()).collect(),
            prefix,
        )
        .unwrap()
    }

    #[test]
    fn s3_wildcard_third_octet_enumeration() {
        let s = Section::<Ipv4>::new(
            vec![
                Segment::new(1, None).unwrap(),
                Segment::new(2, None).unwrap(),
                Segment::full_range(),
                Segment::new(4, None).unwrap(),
            ],
            None,
        )
        .unwrap();
        let values: Vec<_> = RangeIterator::new(&s).collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(values.len(), 256);
        assert_eq!(values[0].get_segment(2).unwrap().lower_value(), 0);
        assert_eq!(values[255].get_segment(2).unwrap().lower_value(), 255);
    }

    #[test]
    fn single_value_section_yields_one_item() {
        let s = section([1, 1, 1, 1], None);
        let values: Vec<_> = RangeIterator::new(&s).collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn prefix_block_iterator_yields_distinct_slash_16_blocks() {
        let s = Section::<Ipv4>::new(
            vec![
                Segment::new(10, None).unwrap(),
                Segment::full_range(),
                Segment::full_range(),
                Segment::full_range(),
            ],
            Some(16),
        )
        .unwrap();
        let blocks: Vec<_> = PrefixBlockIterator::new(&s)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(blocks.len(), 256);
        assert!(blocks[0].get_segment(2).unwrap().is_full_range());
        assert!(blocks[0].get_segment(3).unwrap().is_full_range());
    }

    #[test]
    fn prefix_block_iterator_steps_straddling_segment_in_whole_blocks() {
        // A /20 boundary falls inside octet 2 (bits 16..24): the block step
        // for that octet must be 16 (2^4), not 1, so no block is visited
        // twice.
        let s = Section::<Ipv4>::new(
            vec![
                Segment::new(10, None).unwrap(),
                Segment::new(0, None).unwrap(),
                Segment::full_range(),
                Segment::full_range(),
            ],
            Some(20),
        )
        .unwrap();
        let blocks: Vec<_> = PrefixBlockIterator::new(&s)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(blocks.len(), 16);
        assert_eq!(blocks[0].get_segment(2).unwrap().lower_value(), 0);
        assert_eq!(blocks[1].get_segment(2).unwrap().lower_value(), 16);
        assert_eq!(blocks[15].get_segment(2).unwrap().lower_value(), 240);
    }

    #[test]
    fn prefix_length_iterator_steps_down_to_zero() {
        let lengths: Vec<u16> = PrefixLengthIterator::new(24, 8).collect();
        assert_eq!(lengths, vec![24, 16, 8, 0]);
    }

    #[test]
    fn range_iterator_matches_independent_cartesian_product() {
        use itertools::Itertools;

        let s = Section::<Ipv4>::new(
            vec![
                Segment::new(1, None).unwrap(),
                Segment::with_range(2, 3, None).unwrap(),
                Segment::with_range(0, 1, None).unwrap(),
                Segment::new(9, None).unwrap(),
            ],
            None,
        )
        .unwrap();
        let got: Vec<[u64; 4]> = RangeIterator::new(&s)
            .map(|r| r.map(|sec| {
                [
                    sec.get_segment(0).unwrap().lower_value(),
                    sec.get_segment(1).unwrap().lower_value(),
                    sec.get_segment(2).unwrap().lower_value(),
                    sec.get_segment(3).unwrap().lower_value(),
                ]
            }))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let expected: Vec<[u64; 4]> = (2u64..=3)
            .cartesian_product(0u64..=1)
            .map(|(b, c)| [1, b, c, 9])
            .collect();
        assert_eq!(got, expected);
    }
}
