//! Cross-layer test: a wire property holding mode-preference pairs, decoded
//! the way a domain wrapper would — pair list first, then each side through
//! the flag codec.

use busbind::flags::{from_bitmask, to_bitmask, FlagSet};
use busbind::variant::{decode_pair_list, expect_u32, DecodeError};
use zvariant::Value;

#[derive(Copy, Clone, Debug, PartialEq)]
enum Mode {
    Cs,
    Gsm2g,
    Umts3g,
    Lte4g,
}

impl FlagSet for Mode {
    const CANONICAL: &'static [Self] = &[Mode::Cs, Mode::Gsm2g, Mode::Umts3g, Mode::Lte4g];
}

#[test]
fn supported_modes_property_decodes_end_to_end() {
    // Two combinations: (2G|3G preferring 3G) and (3G|4G preferring 4G).
    let allowed_a = to_bitmask(&[Mode::Gsm2g, Mode::Umts3g]);
    let allowed_b = to_bitmask(&[Mode::Umts3g, Mode::Lte4g]);
    let preferred_a = to_bitmask(&[Mode::Umts3g]);
    let preferred_b = to_bitmask(&[Mode::Lte4g]);
    let wire = Value::new(vec![(allowed_a, preferred_a), (allowed_b, preferred_b)]);

    let pairs = decode_pair_list("SupportedModes", &wire).unwrap();
    assert_eq!(pairs.len(), 2);

    let allowed: Vec<Mode> =
        from_bitmask(expect_u32("SupportedModes", &pairs[0].left).unwrap());
    let preferred: Vec<Mode> =
        from_bitmask(expect_u32("SupportedModes", &pairs[0].right).unwrap());
    assert_eq!(allowed, vec![Mode::Gsm2g, Mode::Umts3g]);
    assert_eq!(preferred, vec![Mode::Umts3g]);

    let allowed: Vec<Mode> =
        from_bitmask(expect_u32("SupportedModes", &pairs[1].left).unwrap());
    assert_eq!(allowed, vec![Mode::Umts3g, Mode::Lte4g]);
}

#[test]
fn mismatched_pair_entry_is_reported_by_property_name() {
    let wire = Value::new(vec![Value::new(("three", 4u32))]);
    let pairs = decode_pair_list("SupportedModes", &wire).unwrap();
    let err = expect_u32("SupportedModes", &pairs[0].left).unwrap_err();
    match err {
        DecodeError::TypeMismatch {
            property, found, ..
        } => {
            assert_eq!(property, "SupportedModes");
            assert_eq!(found, "string");
        }
        other => panic!("unexpected error: {other}"),
    }
}
