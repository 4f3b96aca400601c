/// A flag enumeration with a fixed canonical ordering.
///
/// `CANONICAL[i]` owns bit `1 << i` in the exported bitmask representation,
/// independent of the flag's own integer value. The order is part of the
/// remote service's contract and must never be sorted or deduplicated.
pub trait FlagSet: Copy + PartialEq + std::fmt::Debug + 'static {
    const CANONICAL: &'static [Self];
}

/// Expands a bitmask into the flags whose canonical bits are set.
///
/// A mask of 0 yields an empty vec. Bits at index `CANONICAL.len()` and
/// above carry no meaning for this flag type and are dropped silently.
pub fn from_bitmask<T: FlagSet>(mask: u32) -> Vec<T> {
    T::CANONICAL
        .iter()
        .take(32)
        .enumerate()
        .filter(|(index, _)| mask & (1 << index) != 0)
        .map(|(_, flag)| *flag)
        .collect()
}

/// Collapses a flag list into a bitmask.
///
/// Each input flag found in the canonical table sets its bit; flags absent
/// from the table are ignored silently. Duplicates are harmless (a bit is
/// set at most once).
pub fn to_bitmask<T: FlagSet>(flags: &[T]) -> u32 {
    let mut mask = 0;
    for flag in flags {
        if let Some(index) = T::CANONICAL.iter().position(|known| known == flag) {
            // A u32 mask can only carry the first 32 canonical entries.
            if index < 32 {
                mask |= 1 << index;
            }
        }
    }
    mask
}
