//! The pool-backed singly linked list.

use std::fmt;
use std::sync::Arc;

use tarn_pool::{BlockHandle, Pool, PoolConfig, PoolError};

use crate::node::{NodeRecord, NODE_BYTES};

/// Opaque reference to one node of a [`NodeList`].
///
/// Obtained from [`NodeList::find`] and consumed by the positional insert
/// operations. A `NodeRef` is invalidated when its node is removed; using
/// it afterwards fails safely (the pool rejects the stale handle).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeRef(pub(crate) BlockHandle);

/// A singly linked list of `u16` values with every node allocated from a
/// shared [`Pool`].
///
/// Inserts are skipped (returning `false`) when the pool cannot serve the
/// node allocation; the list itself never panics on memory pressure.
///
/// # Example
///
/// ```
/// use tarn_list::NodeList;
///
/// let mut list = NodeList::with_node_capacity(16)?;
/// list.push_back(1);
/// list.push_back(2);
/// list.push_back(3);
/// assert_eq!(list.to_string(), "[1, 2, 3]");
/// assert_eq!(list.iter().sum::<u16>(), 6);
/// # Ok::<(), tarn_pool::PoolError>(())
/// ```
pub struct NodeList {
    pool: Arc<Pool>,
    head: Option<BlockHandle>,
}

impl NodeList {
    /// Create an empty list over an existing pool.
    ///
    /// Several lists (or other clients) may share one pool.
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool, head: None }
    }

    /// Create an empty list with its own pool sized for `nodes` nodes.
    pub fn with_node_capacity(nodes: usize) -> Result<Self, PoolError> {
        let per_node = NODE_BYTES.div_ceil(PoolConfig::ALIGN) * PoolConfig::ALIGN;
        let pool = Pool::new(PoolConfig::new(nodes.max(1) * per_node))?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// The pool this list allocates from.
    pub fn pool(&self) -> &Arc<Pool> {
        &self.pool
    }

    /// Number of nodes reachable from the head, counted by traversal.
    ///
    /// Always agrees with [`NodeList::iter`]: once the backing pool is
    /// closed the nodes are gone and both report an empty list.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether the list has no reachable nodes.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Append `value` at the tail. Returns `false`, leaving the list
    /// unchanged, when the pool cannot allocate a node.
    pub fn push_back(&mut self, value: u16) -> bool {
        let Some(node) = self.alloc_node(value, None) else {
            return false;
        };
        match self.tail() {
            None => self.head = Some(node),
            Some(tail) => {
                if !self.relink(tail, Some(node)) {
                    // Tail vanished under us (shared-pool corruption);
                    // give the node back rather than leak it.
                    self.pool.free(node);
                    return false;
                }
            }
        }
        true
    }

    /// Insert `value` immediately after the node `at`.
    pub fn insert_after(&mut self, at: NodeRef, value: u16) -> bool {
        let Some(at_record) = self.read_node(at.0) else {
            return false;
        };
        let Some(node) = self.alloc_node(value, at_record.next) else {
            return false;
        };
        if !self.relink(at.0, Some(node)) {
            self.pool.free(node);
            return false;
        }
        true
    }

    /// Insert `value` immediately before the node `at`.
    pub fn insert_before(&mut self, at: NodeRef, value: u16) -> bool {
        if self.read_node(at.0).is_none() {
            return false;
        }
        let Some(node) = self.alloc_node(value, Some(at.0)) else {
            return false;
        };
        if self.head == Some(at.0) {
            self.head = Some(node);
            return true;
        }
        match self.find_predecessor(at.0) {
            Some(prev) if self.relink(prev, Some(node)) => true,
            _ => {
                // Insertion point not found: free the node again.
                self.pool.free(node);
                false
            }
        }
    }

    /// Remove the first node holding `value`. Returns whether a node was
    /// removed.
    pub fn remove(&mut self, value: u16) -> bool {
        let mut prev: Option<BlockHandle> = None;
        let mut cur = self.head;
        while let Some(handle) = cur {
            let Some(record) = self.read_node(handle) else {
                return false;
            };
            if record.value == value {
                match prev {
                    None => self.head = record.next,
                    Some(prev) => {
                        self.relink(prev, record.next);
                    }
                }
                self.pool.free(handle);
                return true;
            }
            prev = cur;
            cur = record.next;
        }
        false
    }

    /// Find the first node holding `value`.
    pub fn find(&self, value: u16) -> Option<NodeRef> {
        let mut cur = self.head;
        while let Some(handle) = cur {
            let record = self.read_node(handle)?;
            if record.value == value {
                return Some(NodeRef(handle));
            }
            cur = record.next;
        }
        None
    }

    /// The value stored at `at`, if the reference is still live.
    pub fn value(&self, at: NodeRef) -> Option<u16> {
        self.read_node(at.0).map(|record| record.value)
    }

    /// Iterate over the values in list order.
    pub fn iter(&self) -> Values<'_> {
        Values {
            list: self,
            cur: self.head,
        }
    }

    /// Render the sub-list from `start` (head when `None`) through `end`
    /// (tail when `None`), inclusive, in the same `[a, b, c]` form as
    /// [`NodeList`]'s `Display`.
    pub fn format_range(&self, start: Option<NodeRef>, end: Option<NodeRef>) -> String {
        let mut out = String::from("[");
        let mut cur = match start {
            Some(at) => Some(at.0),
            None => self.head,
        };
        let mut first = true;
        while let Some(handle) = cur {
            let Some(record) = self.read_node(handle) else {
                break;
            };
            if !first {
                out.push_str(", ");
            }
            first = false;
            out.push_str(&record.value.to_string());
            if end.is_some_and(|e| e.0 == handle) {
                break;
            }
            cur = record.next;
        }
        out.push(']');
        out
    }

    /// Remove every node, returning all node memory to the pool.
    pub fn clear(&mut self) {
        let mut cur = self.head;
        while let Some(handle) = cur {
            cur = self.read_node(handle).and_then(|record| record.next);
            self.pool.free(handle);
        }
        self.head = None;
    }

    // ── Node plumbing ─────────────────────────────────────────────────

    /// Allocate and initialise one node record.
    fn alloc_node(&self, value: u16, next: Option<BlockHandle>) -> Option<BlockHandle> {
        let handle = self.pool.alloc(NODE_BYTES)?;
        let record = NodeRecord { value, next };
        if self.pool.write(handle, 0, &record.encode()).is_err() {
            self.pool.free(handle);
            return None;
        }
        Some(handle)
    }

    /// Read and decode the record at `handle`.
    fn read_node(&self, handle: BlockHandle) -> Option<NodeRecord> {
        let mut bytes = [0u8; NODE_BYTES];
        self.pool.read(handle, 0, &mut bytes).ok()?;
        Some(NodeRecord::decode(&bytes))
    }

    /// Rewrite the `next` link of the node at `handle`.
    fn relink(&self, handle: BlockHandle, next: Option<BlockHandle>) -> bool {
        let Some(record) = self.read_node(handle) else {
            return false;
        };
        let updated = NodeRecord {
            next,
            value: record.value,
        };
        self.pool.write(handle, 0, &updated.encode()).is_ok()
    }

    /// Handle of the last node, or `None` when empty.
    fn tail(&self) -> Option<BlockHandle> {
        let mut cur = self.head?;
        loop {
            match self.read_node(cur)?.next {
                Some(next) => cur = next,
                None => return Some(cur),
            }
        }
    }

    /// Handle of the node whose `next` is `target`.
    fn find_predecessor(&self, target: BlockHandle) -> Option<BlockHandle> {
        let mut cur = self.head?;
        loop {
            let record = self.read_node(cur)?;
            match record.next {
                Some(next) if next == target => return Some(cur),
                Some(next) => cur = next,
                None => return None,
            }
        }
    }
}

/// Iterator over a [`NodeList`]'s values in list order.
pub struct Values<'a> {
    list: &'a NodeList,
    cur: Option<BlockHandle>,
}

impl Iterator for Values<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        let handle = self.cur?;
        let record = self.list.read_node(handle)?;
        self.cur = record.next;
        Some(record.value)
    }
}

impl fmt::Display for NodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

impl Drop for NodeList {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(values: &[u16]) -> NodeList {
        let mut list = NodeList::with_node_capacity(64).unwrap();
        for &v in values {
            assert!(list.push_back(v));
        }
        list
    }

    #[test]
    fn empty_list_displays_brackets() {
        let list = NodeList::with_node_capacity(4).unwrap();
        assert_eq!(list.to_string(), "[]");
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn push_back_appends_in_order() {
        let list = list_of(&[10, 20, 30]);
        assert_eq!(list.to_string(), "[10, 20, 30]");
        assert_eq!(list.len(), 3);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[test]
    fn insert_after_links_correctly() {
        let mut list = list_of(&[1, 3]);
        let at = list.find(1).unwrap();
        assert!(list.insert_after(at, 2));
        assert_eq!(list.to_string(), "[1, 2, 3]");
        let tail = list.find(3).unwrap();
        assert!(list.insert_after(tail, 4));
        assert_eq!(list.to_string(), "[1, 2, 3, 4]");
    }

    #[test]
    fn insert_before_head_and_middle() {
        let mut list = list_of(&[2, 4]);
        let head = list.find(2).unwrap();
        assert!(list.insert_before(head, 1));
        assert_eq!(list.to_string(), "[1, 2, 4]");
        let at = list.find(4).unwrap();
        assert!(list.insert_before(at, 3));
        assert_eq!(list.to_string(), "[1, 2, 3, 4]");
    }

    #[test]
    fn stale_node_ref_fails_safely() {
        let mut list = list_of(&[1, 2, 3]);
        let at = list.find(2).unwrap();
        assert!(list.remove(2));
        // `at` now names a freed node; positional inserts must refuse it.
        assert!(!list.insert_after(at, 9));
        assert!(!list.insert_before(at, 9));
        assert_eq!(list.value(at), None);
        assert_eq!(list.to_string(), "[1, 3]");
    }

    #[test]
    fn remove_head_middle_tail_and_missing() {
        let mut list = list_of(&[1, 2, 3, 4]);
        assert!(list.remove(1));
        assert_eq!(list.to_string(), "[2, 3, 4]");
        assert!(list.remove(3));
        assert_eq!(list.to_string(), "[2, 4]");
        assert!(list.remove(4));
        assert_eq!(list.to_string(), "[2]");
        assert!(!list.remove(99));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn find_returns_first_match() {
        let mut list = list_of(&[5, 7, 5]);
        let at = list.find(5).unwrap();
        assert!(list.insert_after(at, 6));
        // Inserted after the *first* 5.
        assert_eq!(list.to_string(), "[5, 6, 7, 5]");
        assert!(list.find(42).is_none());
    }

    #[test]
    fn format_range_matches_display_slices() {
        let list = list_of(&[1, 2, 3, 4, 5]);
        assert_eq!(list.format_range(None, None), "[1, 2, 3, 4, 5]");
        let from = list.find(2);
        let to = list.find(4);
        assert_eq!(list.format_range(from, to), "[2, 3, 4]");
        assert_eq!(list.format_range(from, None), "[2, 3, 4, 5]");
        assert_eq!(list.format_range(None, to), "[1, 2, 3, 4]");
    }

    #[test]
    fn exhausted_pool_skips_inserts() {
        let mut list = NodeList::with_node_capacity(2).unwrap();
        assert!(list.push_back(1));
        assert!(list.push_back(2));
        assert!(!list.push_back(3));
        assert_eq!(list.to_string(), "[1, 2]");
        assert_eq!(list.len(), 2);
        // Removing one makes room again.
        assert!(list.remove(1));
        assert!(list.push_back(3));
        assert_eq!(list.to_string(), "[2, 3]");
    }

    #[test]
    fn clear_returns_all_memory() {
        let mut list = list_of(&[1, 2, 3, 4, 5]);
        let pool = Arc::clone(list.pool());
        assert!(pool.stats().used_bytes > 0);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(pool.stats().used_bytes, 0);
        assert_eq!(pool.stats().block_count, 1);
    }

    #[test]
    fn drop_frees_nodes() {
        let pool = Arc::new(Pool::with_capacity(1024).unwrap());
        {
            let mut list = NodeList::new(Arc::clone(&pool));
            assert!(list.push_back(1));
            assert!(list.push_back(2));
            assert!(pool.stats().used_bytes > 0);
        }
        assert_eq!(pool.stats().used_bytes, 0);
    }

    #[test]
    fn two_lists_share_one_pool() {
        let pool = Arc::new(Pool::with_capacity(4096).unwrap());
        let mut a = NodeList::new(Arc::clone(&pool));
        let mut b = NodeList::new(Arc::clone(&pool));
        for v in 0..10 {
            assert!(a.push_back(v));
            assert!(b.push_back(100 + v));
        }
        assert_eq!(a.iter().collect::<Vec<_>>(), (0..10).collect::<Vec<_>>());
        assert_eq!(
            b.iter().collect::<Vec<_>>(),
            (100..110).collect::<Vec<_>>()
        );
        a.clear();
        // b is untouched by a's teardown.
        assert_eq!(b.len(), 10);
        assert_eq!(b.iter().count(), 10);
    }
}
