//! Factory and interning capability for segments, sections, and addresses
//! (component **C5**, `spec.md` §4.5, §4.9).
//!
//! Real-world groupings reuse the same handful of segment values constantly
//! (`0`, `255`, the common `/24` host-segment shapes): interning them behind
//! a process-wide cache turns repeated construction into a lookup. The three
//! cache tiers mirror `spec.md` §4.9 exactly: single values, single values
//! with a prefix, and the interaction of all three axes (value, prefix,
//! parity with the standalone-division cache) together.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::af::Afi;
use crate::error::Error;
use crate::section::Section;
use crate::segment::Segment;

type SegmentKey = (u64, u64, Option<u8>);

struct InternTables<A: Afi> {
    segments: Mutex<HashMap<SegmentKey, Segment<A>>>,
}

impl<A: Afi> Default for InternTables<A> {
    fn default() -> Self {
        Self {
            segments: Mutex::new(HashMap::new()),
        }
    }
}

/// Per-family factory for segments, segment arrays, and sections, backing
/// each with an interning cache (`spec.md` §4.5, §4.9).
///
/// A zero-sized type: all state lives in a process-wide registry keyed by
/// `A`'s `TypeId`, so callers construct `Creator::<A>::default()` wherever
/// needed rather than threading a shared instance through the program.
#[derive(Debug, Clone, Copy)]
pub struct Creator<A: Afi> {
    _afi: core::marker::PhantomData<A>,
}

// Not `#[derive(Default)]`: the derive adds a spurious `A: Default` bound,
// but `PhantomData<A>` is `Default` unconditionally.
impl<A: Afi> Default for Creator<A> {
    fn default() -> Self {
        Self {
            _afi: core::marker::PhantomData,
        }
    }
}

/// Global registry of per-family interning tables, keyed by `TypeId` since a
/// plain `static` cannot itself be generic over `A`.
fn registry() -> &'static Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

fn with_tables<A: Afi, R>(f: impl FnOnce(&InternTables<A>) -> R) -> R {
    let mut reg = registry().lock().expect("creator registry poisoned");
    let entry = reg
        .entry(TypeId::of::<A>())
        .or_insert_with(|| Box::new(InternTables::<A>::default()));
    let tables = entry
        .downcast_ref::<InternTables<A>>()
        .expect("creator registry type mismatch");
    f(tables)
}

impl<A: Afi> Creator<A> {
    /// Create (or fetch an interned) single-valued segment.
    pub fn create_segment(&self, value: u64) -> Result<Segment<A>, Error> {
        self.create_segment_with_prefix(value, None)
    }

    /// Create (or fetch an interned) segment, masked to `prefix` if given.
    pub fn create_segment_with_prefix(
        &self,
        value: u64,
        prefix: Option<u8>,
    ) -> Result<Segment<A>, Error> {
        let segment = Segment::<A>::new(value, prefix)?;
        let key = (segment.lower_value(), segment.upper_value(), prefix);
        Ok(with_tables::<A, _>(|tbl| {
            let mut cache = tbl.segments.lock().expect("segment cache poisoned");
            cache.entry(key).or_insert(segment).clone()
        }))
    }

    /// Create (or fetch an interned) range-valued segment.
    pub fn create_ranged_segment(
        &self,
        lower: u64,
        upper: u64,
        prefix: Option<u8>,
    ) -> Result<Segment<A>, Error> {
        let segment = Segment::<A>::with_range(lower, upper, prefix)?;
        let key = (lower, upper, prefix);
        Ok(with_tables::<A, _>(|tbl| {
            let mut cache = tbl.segments.lock().expect("segment cache poisoned");
            cache.entry(key).or_insert(segment).clone()
        }))
    }

    /// Build an array of single-valued segments from raw values, at the
    /// grouping-level `prefix`, masking each per
    /// [`Segment::prefix_length_for`].
    pub fn create_segment_array(
        &self,
        values: &[u64],
        prefix: Option<u16>,
    ) -> Result<Vec<Segment<A>>, Error> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let seg_prefix = Segment::<A>::prefix_length_for(prefix, i);
                self.create_segment_with_prefix(v, seg_prefix)
            })
            .collect()
    }

    /// Build a [`Section<A>`] from raw segment values and an overall prefix.
    pub fn create_section(&self, values: &[u64], prefix: Option<u16>) -> Result<Section<A>, Error> {
        let segments = self.create_segment_array(values, prefix)?;
        Section::new(segments, prefix)
    }

    /// Build a [`Section<A>`] directly from already-constructed segments.
    pub fn create_section_from_segments(
        &self,
        segments: Vec<Segment<A>>,
        prefix: Option<u16>,
    ) -> Result<Section<A>, Error> {
        Section::new(segments, prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::af::Ipv4;

    #[test]
    fn interning_returns_equal_segments() {
        let creator = Creator::<Ipv4>::default();
        let a = creator.create_segment(10).unwrap();
        let b = creator.create_segment(10).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn create_section_applies_prefix_per_segment() {
        let creator = Creator::<Ipv4>::default();
        let section = creator.create_section(&[10, 0, 0, 0], Some(8)).unwrap();
        assert_eq!(section.get_segment(0).unwrap().division_prefix(), Some(8));
        assert_eq!(section.get_segment(1).unwrap().division_prefix(), Some(0));
    }

    #[test]
    fn create_segment_array_length_matches_input() {
        let creator = Creator::<Ipv4>::default();
        let segments = creator.create_segment_array(&[1, 2, 3, 4], None).unwrap();
        assert_eq!(segments.len(), 4);
    }
}
