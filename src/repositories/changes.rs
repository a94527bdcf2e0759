use super::Entity;

/// One staged write.
pub(crate) enum PendingChange<E: Entity> {
    Add(E::New),
    Update(E),
    Delete(E),
}

/// Ordered staging buffer owned by a single repository instance.
pub(crate) struct ChangeSet<E: Entity> {
    pending: Vec<PendingChange<E>>,
}

impl<E: Entity> Default for ChangeSet<E> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<E: Entity> ChangeSet<E> {
    pub fn push(&mut self, change: PendingChange<E>) {
        self.pending.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drains the buffer. Called before committing so a failed commit
    /// cannot leave stale operations behind.
    pub fn take(&mut self) -> Vec<PendingChange<E>> {
        std::mem::take(&mut self.pending)
    }
}
