//! The 17 child slots of a branch node.
//! A bit flag per slot records which children are present.
use cid::Cid;

/// Number of slots in a branch node: one per nibble plus the value slot.
pub const BRANCH_SLOTS: usize = 17;

/// Children of a branch node, indexed by nibble. Slot 16 is the branch value slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchChildren {
    children: [Option<Cid>; BRANCH_SLOTS],
    flags: u32,
}

impl Default for BranchChildren {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchChildren {
    /// Creates a branch with no children.
    #[inline]
    pub const fn new() -> Self {
        Self { children: [None; BRANCH_SLOTS], flags: 0 }
    }

    /// Returns the child at `idx`, or `None` if the slot is empty or out of range.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<&Cid> {
        self.children.get(idx).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn insert(&mut self, idx: usize, cid: Cid) {
        self.children[idx] = Some(cid);
        self.flags |= 1 << idx;
    }

    /// Number of present children.
    #[inline]
    pub const fn len(&self) -> usize {
        self.flags.count_ones() as usize
    }

    /// Whether every slot is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.flags == 0
    }

    /// Iterates all 17 slots in order.
    #[inline]
    pub fn slots(&self) -> impl Iterator<Item = Option<&Cid>> {
        self.children.iter().map(Option::as_ref)
    }

    /// Iterates the present children with their slot index.
    pub fn present(&self) -> impl Iterator<Item = (usize, &Cid)> {
        self.children.iter().enumerate().filter_map(|(idx, child)| child.as_ref().map(|cid| (idx, cid)))
    }
}
