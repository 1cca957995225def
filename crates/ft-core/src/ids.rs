use core::fmt;
use core::num::NonZeroU32;

/// Dense handle into a flowsheet's unit or stream table.
///
/// Ids are handed out in insertion order, so the 0-based index doubles as the
/// table slot. Stored off by one in a `NonZeroU32` so `Option<Id>` (an open
/// stream end) costs nothing extra. Ordering follows insertion, which keeps
/// recycle sets and their rendering deterministic.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Id(NonZeroU32);

impl Id {
    /// Id for the 0-based table index `index`.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// Table slot for this id.
    pub fn slot(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// A processing unit.
pub type UnitId = Id;
/// A directed connection between two unit slots.
pub type StreamId = Id;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn open_end_costs_nothing() {
        assert_eq!(
            core::mem::size_of::<Option<StreamId>>(),
            core::mem::size_of::<u32>()
        );
    }

    #[test]
    fn ordering_follows_insertion() {
        let mut ids = vec![Id::from_index(7), Id::from_index(0), Id::from_index(3)];
        ids.sort();
        let slots: Vec<usize> = ids.iter().map(|id| id.slot()).collect();
        assert_eq!(slots, vec![0, 3, 7]);
        assert_eq!(format!("{:?}", ids[1]), "#3");
    }

    proptest! {
        #[test]
        fn index_survives_round_trip(index in 0_u32..u32::MAX) {
            prop_assert_eq!(Id::from_index(index).index(), index);
        }
    }
}
