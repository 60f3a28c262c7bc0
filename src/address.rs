//! A thin address facade over a [`Section`] (component **C9**, added to
//! satisfy the `Creator`/`DivisionGrouping` contracts described in `spec.md`
//! §3 "Ownership" and §6; see `SPEC_FULL.md` §2.1).
//!
//! Everything address-shaped beyond "a section plus an optional zone" —
//! parsing, textual formatting, `std::net` interop — is out of scope (§1)
//! and lives, if anywhere, in a caller built on top of this crate.

use crate::af::Afi;
use crate::error::{err, Error, ErrorKind};
use crate::section::Section;

/// An address: a [`Section<A>`] plus an optional zone identifier, present
/// only for families where `Afi::HAS_ZONE` is `true`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address<A: Afi> {
    section: Section<A>,
    zone: Option<String>,
}

impl<A: Afi> Address<A> {
    /// Construct an address from a section and an optional zone identifier.
    ///
    /// Rejects a non-empty zone on a family that does not support one
    /// (`Afi::HAS_ZONE == false`).
    pub fn new(section: Section<A>, zone: Option<String>) -> Result<Self, Error> {
        if zone.is_some() && !A::HAS_ZONE {
            return Err(err!(
                ErrorKind::InvalidArgument,
                "zone identifier not supported for this address family"
            ));
        }
        Ok(Self { section, zone })
    }

    /// The underlying section.
    pub fn section(&self) -> &Section<A> {
        &self.section
    }

    /// The zone identifier, if any.
    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }
}
