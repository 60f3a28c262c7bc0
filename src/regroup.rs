//! Radix conversion of a division sequence (component **C6**, `spec.md`
//! §4.7).
//!
//! The regrouper treats the whole source grouping as one contiguous bit
//! stream (`bitvec`, left over from the teacher's dependency list but never
//! used there) and re-slices it into as few divisions as possible at the new
//! digit width, carrying the lower and upper value streams through in
//! lockstep so a multiple-valued source division fans out into
//! multiple-valued divisions at the target width too.

use bitvec::prelude::*;

use crate::division::Division;
use crate::error::{err, Error, ErrorKind};
use crate::grouping::{DivisionGrouping, DivisionValue};
use crate::prefix_calculus::segment_prefix_length;

/// A division produced by [`regroup`], holding the radix-converted bit
/// width directly rather than relying on an address family.
pub type RadixDivision = Division;

fn push_value(bits: &mut BitVec<u8, Msb0>, value: u64, width: u8) {
    for i in (0..width).rev() {
        bits.push((value >> i) & 1 == 1);
    }
}

fn pull_value(bits: &BitSlice<u8, Msb0>) -> u64 {
    bits.iter().fold(0u64, |acc, b| (acc << 1) | (*b as u64))
}

/// Widths (most significant first) of the divisions `regroup` should produce
/// for `total_bits` total bits at `bits_per_digit` bits per digit.
///
/// Each division's width is a multiple of `bits_per_digit`, capped at the
/// architectural maximum `floor(63 / bits_per_digit) * bits_per_digit`, except
/// the first (most significant), which absorbs the leftover remainder when
/// `total_bits` is not itself a multiple of `bits_per_digit` (`spec.md`
/// §4.7 point 2-3; scenario S5).
fn division_widths(total_bits: u16, bits_per_digit: u8) -> Vec<u16> {
    let bits_per_digit = bits_per_digit as u16;
    let max_width = (63 / bits_per_digit) * bits_per_digit;
    let remainder = total_bits % bits_per_digit;

    let mut widths = Vec::new();
    let mut remaining = total_bits;
    if remainder != 0 {
        widths.push(remainder);
        remaining -= remainder;
    }
    while remaining > 0 {
        let width = remaining.min(max_width);
        widths.push(width);
        remaining -= width;
    }
    widths
}

/// Re-slice `grouping`'s divisions into as few divisions as possible of
/// `bits_per_digit` radix.
///
/// Both the lower-value and upper-value bit streams are re-sliced
/// independently and zipped back together, so a regrouped division's range
/// is valid (`lower <= upper`) whenever every source division it draws from
/// is itself a trivial range expansion of a contiguous value set — see
/// `spec.md` §4.7's note that arbitrary multiple-valued interior divisions
/// can produce a regrouping whose per-digit ranges no longer correspond to a
/// single contiguous block; callers needing that guarantee should check
/// [`DivisionGrouping::is_range_equivalent_to_prefix`] first.
pub fn regroup<D: DivisionValue>(
    grouping: &DivisionGrouping<D>,
    bits_per_digit: u8,
) -> Result<Vec<RadixDivision>, Error> {
    if bits_per_digit == 0 || bits_per_digit >= 32 {
        return Err(err!(
            ErrorKind::InvalidArgument,
            "regroup digit width must be in [1, 31]"
        ));
    }
    let total_bits: u16 = grouping.divisions().iter().map(|d| d.bit_count() as u16).sum();

    let mut lower_bits: BitVec<u8, Msb0> = BitVec::new();
    let mut upper_bits: BitVec<u8, Msb0> = BitVec::new();
    for div in grouping.divisions() {
        push_value(&mut lower_bits, div.lower_value(), div.bit_count());
        push_value(&mut upper_bits, div.upper_value(), div.bit_count());
    }

    let grouping_prefix = grouping.grouping_prefix();
    let mut start = 0usize;
    let mut offset: i64 = 0;
    let mut out = Vec::new();
    for width in division_widths(total_bits, bits_per_digit) {
        let end = start + width as usize;
        let lower = pull_value(&lower_bits[start..end]);
        let upper = pull_value(&upper_bits[start..end]);
        let (lower, upper) = if lower <= upper { (lower, upper) } else { (upper, lower) };
        let prefix = grouping_prefix.and_then(|p| segment_prefix_length(width as u8, p as i64 - offset));
        out.push(Division::new(width as u8, lower, upper, prefix)?);
        offset += width as i64;
        start = end;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(bit_count: u8, value: u64) -> Division {
        Division::single(bit_count, value).unwrap()
    }

    #[test]
    fn s5_regroup_ipv4_address_to_octal() {
        // 0x01020304 over 32 bits, regrouped at 3 bits per digit, produces a
        // 2-bit leading division (the 32 mod 3 remainder) and a single
        // 30-bit division carrying the rest (spec.md scenario S5).
        let grouping = DivisionGrouping::new(
            vec![single(8, 0x01), single(8, 0x02), single(8, 0x03), single(8, 0x04)],
            None,
        )
        .unwrap();
        let digits = regroup(&grouping, 3).unwrap();
        assert_eq!(digits.len(), 2);
        assert_eq!(digits[0].bit_count(), 2);
        assert_eq!(digits[0].lower_value(), 0);
        assert_eq!(digits[1].bit_count(), 30);
        assert_eq!(digits[1].lower_value(), 0x0102_0304);
    }

    #[test]
    fn regroup_ipv4_octets_to_nibbles_stays_byte_aligned() {
        // 32 bits at 4 bits per digit divides evenly, and 8*4=32 <= 63, so
        // the whole address collapses into a single 32-bit division.
        let grouping = DivisionGrouping::new(
            vec![single(8, 0xAB), single(8, 0xCD), single(8, 0xEF), single(8, 0x01)],
            None,
        )
        .unwrap();
        let nibbles = regroup(&grouping, 4).unwrap();
        assert_eq!(nibbles.len(), 1);
        assert_eq!(nibbles[0].bit_count(), 32);
        assert_eq!(nibbles[0].lower_value(), 0xABCD_EF01);
    }

    #[test]
    fn regroup_splits_wide_groupings_at_the_63_bit_ceiling() {
        // 8 octets (64 bits) at 1 bit per digit: 64 is already a multiple of
        // the digit width, so there's no irregular leading division; the
        // architectural max of 63 bits per division is filled first, leaving
        // a 1-bit division at the tail.
        let grouping = DivisionGrouping::new(vec![single(8, 0xFF); 8], None).unwrap();
        let digits = regroup(&grouping, 1).unwrap();
        assert_eq!(digits.len(), 2);
        assert_eq!(digits[0].bit_count(), 63);
        assert_eq!(digits[1].bit_count(), 1);
    }

    #[test]
    fn regroup_rejects_digit_width_at_or_above_machine_word() {
        let grouping = DivisionGrouping::new(vec![single(8, 1), single(8, 2)], None).unwrap();
        assert!(regroup(&grouping, 32).is_err());
    }

    #[test]
    fn regroup_preserves_multiple_valued_range() {
        let grouping = DivisionGrouping::new(
            vec![Division::new(8, 0, 15, None).unwrap(), single(8, 0)],
            None,
        )
        .unwrap();
        let digits = regroup(&grouping, 4).unwrap();
        // 16 bits at 4 bits per digit divides evenly and fits in one 16-bit
        // division: the first (most significant) byte's [0, 15] range and
        // the second byte's fixed 0 combine byte-wise into [0x0000, 0x0F00].
        assert_eq!(digits.len(), 1);
        assert_eq!(digits[0].lower_value(), 0x0000);
        assert_eq!(digits[0].upper_value(), 0x0F00);
    }

    #[test]
    fn regroup_derives_per_division_prefix_from_grouping_prefix() {
        let grouping = DivisionGrouping::new(
            vec![single(8, 10), Division::new(8, 0, 255, None).unwrap(), Division::new(8, 0, 255, None).unwrap(), Division::new(8, 0, 255, None).unwrap()],
            Some(8),
        )
        .unwrap();
        // 32 bits at 1 bit per digit: total_bits(32) % 1 == 0, so no
        // remainder division; max_width = 63, capped at total_bits.
        let digits = regroup(&grouping, 1).unwrap();
        assert_eq!(digits.len(), 1);
        assert_eq!(digits[0].bit_count(), 32);
        assert_eq!(digits[0].division_prefix(), Some(8));
    }
}
