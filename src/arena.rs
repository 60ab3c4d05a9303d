//! Index-addressed doubly linked list.
//!
//! The windowed detectors keep an ordered chain of summaries (ADWIN rows, SEED
//! blocks) that is appended at one end, truncated at the other and merged in
//! the middle. Nodes live in a `Vec` and link to each other by slot index, so
//! removal is O(1) and freed slots are recycled instead of reallocated.
//!
//! Orientation is fixed: the *newest* end receives fresh data, the *oldest* end
//! is where truncation happens.

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    newer: Option<usize>,
    older: Option<usize>,
}

/// Doubly linked list stored in a slot arena.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    newest: Option<usize>,
    oldest: Option<usize>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            newest: None,
            oldest: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the newest node.
    pub fn newest(&self) -> Option<usize> {
        self.newest
    }

    /// Index of the oldest node.
    pub fn oldest(&self) -> Option<usize> {
        self.oldest
    }

    /// The node one step toward the newest end.
    pub fn newer(&self, idx: usize) -> Option<usize> {
        self.node(idx).and_then(|n| n.newer)
    }

    /// The node one step toward the oldest end.
    pub fn older(&self, idx: usize) -> Option<usize> {
        self.node(idx).and_then(|n| n.older)
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.node(idx).map(|n| &n.value)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.slots
            .get_mut(idx)
            .and_then(Option::as_mut)
            .map(|n| &mut n.value)
    }

    /// Append at the newest end and return the new node's index.
    pub fn push_newest(&mut self, value: T) -> usize {
        let idx = self.alloc(Node {
            value,
            newer: None,
            older: self.newest,
        });
        match self.newest {
            Some(prev) => self.link_mut(prev).newer = Some(idx),
            None => self.oldest = Some(idx),
        }
        self.newest = Some(idx);
        idx
    }

    /// Append at the oldest end and return the new node's index.
    pub fn push_oldest(&mut self, value: T) -> usize {
        let idx = self.alloc(Node {
            value,
            newer: self.oldest,
            older: None,
        });
        match self.oldest {
            Some(prev) => self.link_mut(prev).older = Some(idx),
            None => self.newest = Some(idx),
        }
        self.oldest = Some(idx);
        idx
    }

    /// Unlink a node and hand back its value. Returns `None` for a dead index.
    pub fn remove(&mut self, idx: usize) -> Option<T> {
        let node = self.slots.get_mut(idx)?.take()?;
        match node.newer {
            Some(n) => self.link_mut(n).older = node.older,
            None => self.newest = node.older,
        }
        match node.older {
            Some(o) => self.link_mut(o).newer = node.newer,
            None => self.oldest = node.newer,
        }
        self.free.push(idx);
        self.len -= 1;
        Some(node.value)
    }

    pub fn pop_oldest(&mut self) -> Option<T> {
        let idx = self.oldest?;
        self.remove(idx)
    }

    /// Drop every node strictly older than `idx`, returning how many were removed.
    pub fn truncate_older_than(&mut self, idx: usize) -> usize {
        let mut removed = 0;
        while let Some(oldest) = self.oldest {
            if oldest == idx {
                break;
            }
            self.remove(oldest);
            removed += 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.newest = None;
        self.oldest = None;
        self.len = 0;
    }

    /// Iterate from the newest node toward the oldest.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &T> + '_ {
        let mut cursor = self.newest;
        std::iter::from_fn(move || {
            let node = self.node(cursor?)?;
            cursor = node.older;
            Some(&node.value)
        })
    }

    fn node(&self, idx: usize) -> Option<&Node<T>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    // Link fields of live neighbours are always valid slots.
    fn link_mut(&mut self, idx: usize) -> &mut Node<T> {
        match self.slots.get_mut(idx).and_then(Option::as_mut) {
            Some(node) => node,
            None => unreachable!("arena link points at a free slot"),
        }
    }

    fn alloc(&mut self, node: Node<T>) -> usize {
        self.len += 1;
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }
}
