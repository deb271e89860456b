use core::fmt;
use core::num::NonZeroU32;

/// Rank of a worker in the task farm.
///
/// Rank 0 belongs to the coordinator, so worker ranks start at 1:
/// - `NonZero` enables `Option<WorkerId>` to be niche-optimized
/// - `index()` gives the 0-based slot for per-worker tables
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(NonZeroU32);

impl WorkerId {
    /// Worker id for a 0-based worker slot (rank = index + 1).
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Worker id for a communicator rank; `None` for the coordinator's rank 0.
    pub fn from_rank(rank: u32) -> Option<Self> {
        NonZeroU32::new(rank).map(Self)
    }

    pub fn rank(self) -> u32 {
        self.0.get()
    }

    /// Recover the 0-based slot.
    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Debug for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkerId({})", self.rank())
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker {}", self.rank())
    }
}

/// Iterate the ids of a pool of `count` workers in rank order.
pub fn worker_ids(count: usize) -> impl Iterator<Item = WorkerId> {
    (0..count as u32).map(WorkerId::from_index)
}
