use core::fmt;
use core::num::NonZeroU32;

/// Position of a declared quantity within its registry.
///
/// Stored as index+1 so that `Option<QuantityId>` stays four bytes; problem
/// variables carry one for every model quantity and none for slacks.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuantityId(NonZeroU32);

impl QuantityId {
    /// `None` once the index no longer fits.
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index)
            .ok()
            .and_then(|i| NonZeroU32::MIN.checked_add(i))
            .map(Self)
    }

    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for QuantityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuantityId({})", self.index())
    }
}

impl fmt::Display for QuantityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips() {
        for i in [0_usize, 1, 24, 31, 10_000] {
            assert_eq!(QuantityId::from_index(i).unwrap().index() as usize, i);
        }
    }

    #[test]
    fn ids_order_by_declaration() {
        assert!(QuantityId::from_index(3) < QuantityId::from_index(7));
    }

    #[test]
    fn exhausted_index_space_has_no_id() {
        let last = u32::MAX as usize - 1;
        assert_eq!(QuantityId::from_index(last).unwrap().index(), u32::MAX - 1);
        assert_eq!(QuantityId::from_index(last + 1), None);
        assert_eq!(QuantityId::from_index(usize::MAX), None);
    }

    #[test]
    fn optional_id_costs_nothing() {
        assert_eq!(
            core::mem::size_of::<QuantityId>(),
            core::mem::size_of::<Option<QuantityId>>()
        );
    }
}
