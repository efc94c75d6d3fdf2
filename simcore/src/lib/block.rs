use crate::utils::*;

impl MemoryBlock {
    /// A fresh, unowned block.
    pub fn free(id: BlockId, size: Units) -> Self {
        Self {
            id,
            size,
            is_allocated:   false,
            owner:          None,
        }
    }

    pub fn is_free(&self) -> bool {
        !self.is_allocated
    }

    /// Returns `true` if a request of `size` units could be served
    /// from this block. This is the predicate every placement policy
    /// filters on.
    pub fn fits(&self, size: Units) -> bool {
        self.is_free() && self.size >= size
    }

    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.owner.as_deref() == Some(owner)
    }

    pub(crate) fn claim(&mut self, owner: &str) {
        self.is_allocated = true;
        self.owner = Some(owner.to_owned());
    }

    pub(crate) fn release(&mut self) {
        self.is_allocated = false;
        self.owner = None;
    }
}
