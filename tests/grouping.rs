use ip_divisions::af::{Ipv4, Ipv6};
use ip_divisions::creator::Creator;
use ip_divisions::iter::PrefixBlockIterator;
use ip_divisions::regroup::regroup;
use ip_divisions::section::Section;
use ip_divisions::segment::Segment;
use num_bigint::BigUint;
use num_traits::One;

fn ipv4_section(octets: [u64; 4], prefix: Option<u16>) -> Section<Ipv4> {
    Creator::<Ipv4>::default()
        .create_section(&octets, prefix)
        .unwrap()
}

#[test]
fn loopback_address_is_single_valued() {
    let loopback = ipv4_section([127, 0, 0, 1], None);
    assert_eq!(loopback.get_count(), BigUint::one());
    assert_eq!(loopback.get_bytes(true), vec![127, 0, 0, 1]);
    assert_eq!(loopback.get_equivalent_prefix(), Some(32));
}

#[test]
fn classful_a_network_round_trips_through_creator() {
    let net = ipv4_section([10, 0, 0, 0], Some(8));
    assert!(net.is_range_equivalent_to_prefix());
    assert_eq!(net.get_count(), BigUint::from(1u64 << 24));
    assert_eq!(net.get_bytes(true), vec![10, 0, 0, 0]);
    assert_eq!(net.get_bytes(false), vec![10, 255, 255, 255]);

    let blocks: Vec<_> = PrefixBlockIterator::new(&net)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(blocks.len(), 1);
}

#[test]
fn slash_16_enumerates_256_slash_24_blocks() {
    let net = ipv4_section([192, 168, 0, 0], Some(16));
    let blocks: Vec<_> = PrefixBlockIterator::new(&net)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(blocks.len(), 256);
    for (i, block) in blocks.iter().enumerate() {
        assert_eq!(block.get_segment(2).unwrap().lower_value(), i as u64);
        assert!(block.get_segment(3).unwrap().is_full_range());
    }
}

#[test]
fn default_route_covers_every_address() {
    let default_route = Section::<Ipv4>::new(
        vec![
            Segment::full_range(),
            Segment::full_range(),
            Segment::full_range(),
            Segment::full_range(),
        ],
        Some(0),
    )
    .unwrap();
    assert!(default_route.is_range_equivalent_to_prefix());
    assert_eq!(default_route.get_equivalent_prefix(), Some(0));
    assert_eq!(default_route.get_count(), BigUint::from(1u64 << 32));
}

#[test]
fn regrouping_an_address_to_octal_preserves_value() {
    // 32 bits at 3 bits per digit leaves a 2-bit remainder, which becomes
    // its own leading division; the remaining 30 bits fit in one division.
    let addr = ipv4_section([192, 168, 1, 1], None);
    let digits = regroup(&addr, 3).unwrap();
    assert_eq!(digits.len(), 2);
    assert_eq!(digits[0].bit_count(), 2);
    assert_eq!(digits[1].bit_count(), 30);
    let recombined = (digits[0].lower_value() << 30) | digits[1].lower_value();
    assert_eq!(recombined, 0xC0A80101);
}

#[test]
fn ipv6_section_supports_zone_free_construction() {
    let creator = Creator::<Ipv6>::default();
    let loopback = creator
        .create_section(&[0, 0, 0, 0, 0, 0, 0, 1], None)
        .unwrap();
    assert_eq!(loopback.get_segment_count(), 8);
    assert_eq!(loopback.get_count(), BigUint::one());
}

#[test]
fn subsection_then_append_round_trips_original_segments() {
    let net = ipv4_section([10, 20, 30, 40], None);
    let head = net.subsection(0, 2).unwrap();
    let tail = net.subsection(2, 4).unwrap();
    let rebuilt = head.append(&tail, false).unwrap();
    assert_eq!(rebuilt.get_segments(), net.get_segments());
}
