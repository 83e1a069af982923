use std::{cell::Cell, rc::Rc};

/// Hands out surface ownership; only the most recent claim is live.
///
/// A second mount of the same surface claims again, which silently demotes
/// the first engine so it stops drawing.
#[derive(Clone, Debug, Default)]
pub struct OwnershipRegistry {
    current: Rc<Cell<u64>>,
    issued: Rc<Cell<u64>>,
}

impl OwnershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&self) -> OwnershipToken {
        let id = self.issued.get() + 1;
        self.issued.set(id);
        self.current.set(id);
        tracing::debug!(owner = id, "surface ownership claimed");
        OwnershipToken {
            id,
            current: Rc::clone(&self.current),
        }
    }

    /// Id of the live owner, if any.
    pub fn current(&self) -> Option<u64> {
        match self.current.get() {
            0 => None,
            id => Some(id),
        }
    }
}

#[derive(Debug)]
pub struct OwnershipToken {
    id: u64,
    current: Rc<Cell<u64>>,
}

impl OwnershipToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.current.get() == self.id
    }
}

impl Drop for OwnershipToken {
    fn drop(&mut self) {
        if self.is_current() {
            self.current.set(0);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreography/ownership.rs"]
mod tests;
