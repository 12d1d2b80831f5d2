use crate::element::Element;
use crate::error::Result;
use crate::queue::Queue;
use crate::ring::connect;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::mem;

use tracing::{debug, trace};

mod sort;

impl PartialEq for Queue {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other)
    }
}

impl Eq for Queue {}

impl PartialOrd for Queue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queue {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other)
    }
}

impl Clone for Queue {
    fn clone(&self) -> Self {
        self.iter().collect()
    }
}

impl Hash for Queue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut len = 0_usize;
        for elt in self {
            elt.hash(state);
            len += 1;
        }
        len.hash(state);
    }
}

impl Queue {
    /// Returns `true` if the `Queue` contains an element equal to the given value.
    pub fn contains(&self, x: &str) -> bool {
        self.iter().any(|e| e == x)
    }

    /// Deletes the middle element.
    ///
    /// In a queue of *n* elements, the element at index `(n - 1) / 2` is deleted,
    /// so the lower of the two middle elements goes when *n* is even. It is found
    /// by a slow/fast walk from the front: the slow pointer moves one node per
    /// step, the fast one two, until the fast one or its successor is the ghost.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::EmptyQueue`](crate::QueueError::EmptyQueue) if there is nothing to delete.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue: Queue = ["1", "2", "3", "4"].iter().copied().collect();
    /// queue.delete_middle().unwrap();
    /// assert_eq!(queue.iter().collect::<Vec<_>>(), ["1", "3", "4"]);
    /// ```
    pub fn delete_middle(&mut self) -> Result<()> {
        self.ensure_not_empty("delete_middle")?;
        let ghost = self.ring.ghost();
        // SAFETY: the queue is not empty, so `slow` starts on an element and
        // never passes the fast pointer; every node visited is live.
        unsafe {
            let mut slow = ghost.as_ref().next;
            let mut fast = slow.as_ref().next;
            while fast != ghost && fast.as_ref().next != ghost {
                slow = slow.as_ref().next;
                fast = fast.as_ref().next.as_ref().next;
            }
            let middle = Element::unlink(slow);
            trace!(value = middle.value(), "deleted middle element");
            middle.release();
        }
        self.ring.check_links();
        Ok(())
    }

    /// Deletes every element whose value is shared with an adjacent element.
    ///
    /// The queue must already be sorted (see [`Queue::sort`]), so that equal values
    /// form runs. Every run of two or more equal values is deleted entirely,
    /// including its first element; elements without an equal neighbor are kept
    /// in order.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::EmptyQueue`](crate::QueueError::EmptyQueue) on an empty queue.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue: Queue = ["a", "a", "b", "c", "c"].iter().copied().collect();
    /// queue.delete_duplicates().unwrap();
    /// assert_eq!(queue.iter().collect::<Vec<_>>(), ["b"]);
    /// ```
    pub fn delete_duplicates(&mut self) -> Result<()> {
        self.ensure_not_empty("delete_duplicates")?;
        let ghost = self.ring.ghost();
        let mut deleted = 0_usize;
        // Whether the previous element was deleted as the head of a run.
        let mut in_run = false;
        for link in self.ring.links_safe() {
            // SAFETY: `link` is a live element whose successor has already been
            // read; the successor is only compared, never freed, in this step.
            unsafe {
                let next = link.as_ref().next;
                let equal_to_next =
                    next != ghost && Element::value_at(link) == Element::value_at(next);
                if equal_to_next || in_run {
                    Element::unlink(link).release();
                    deleted += 1;
                }
                in_run = equal_to_next;
            }
        }
        trace!(deleted, "deleted duplicated elements");
        self.ring.check_links();
        Ok(())
    }

    /// Swaps every two adjacent elements, starting from the front.
    ///
    /// With an odd number of elements the last one stays in place. Only links are
    /// rewritten; no value is moved or copied.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue: Queue = ["1", "2", "3"].iter().copied().collect();
    /// queue.swap_pairs();
    /// assert_eq!(queue.iter().collect::<Vec<_>>(), ["2", "1", "3"]);
    /// ```
    pub fn swap_pairs(&mut self) {
        let ghost = self.ring.ghost();
        // SAFETY: every node between the ghost and itself is live, and each pair
        // `before, node, partner, after` is read before any of its links change.
        unsafe {
            let mut node = ghost.as_ref().next;
            while node != ghost {
                let partner = node.as_ref().next;
                if partner == ghost {
                    break;
                }
                let (before, after) = (node.as_ref().prev, partner.as_ref().next);
                connect(before, partner);
                connect(partner, node);
                connect(node, after);
                node = after;
            }
        }
        self.ring.check_links();
    }

    /// Reverses the order of the elements in place.
    ///
    /// Every node, the ghost included, gets its `next` and `prev` exchanged in a
    /// single pass; no element is moved.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue: Queue = ["a", "b", "c"].iter().copied().collect();
    /// queue.reverse();
    /// assert_eq!(queue.iter().collect::<Vec<_>>(), ["c", "b", "a"]);
    /// ```
    pub fn reverse(&mut self) {
        if self.is_empty() {
            return;
        }
        let ghost = self.ring.ghost();
        let mut node = ghost;
        // SAFETY: the walk follows the original `next` chain (stored in `prev`
        // after the swap), visiting every live node exactly once.
        unsafe {
            loop {
                let link = &mut *node.as_ptr();
                mem::swap(&mut link.next, &mut link.prev);
                node = link.prev;
                if node == ghost {
                    break;
                }
            }
        }
        self.ring.check_links();
    }

    /// Sort the queue in ascending order of values.
    ///
    /// Values are compared byte by byte, case-sensitively (the order of
    /// [`str`]'s `Ord`). This sort is stable (i.e., does not reorder equal
    /// elements).
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* * log(*n*)) time and *O*(1) memory.
    ///
    /// # Current Implementation
    ///
    /// The current algorithm is a bottom-up merge sort. Elements are merged into
    /// a stack of pending runs whose sizes follow the binary representation of the
    /// number of elements seen so far. No element is allocated or released.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue: Queue = ["banana", "apple", "cherry"].iter().copied().collect();
    /// queue.sort();
    /// assert_eq!(queue.iter().collect::<Vec<_>>(), ["apple", "banana", "cherry"]);
    /// ```
    pub fn sort(&mut self) {
        self.sort_by(|a, b| a.cmp(b));
    }

    /// Sort the queue with a comparator function.
    ///
    /// This sort is stable (i.e., does not reorder equal elements).
    ///
    /// The comparator function must define a total ordering for the values in
    /// the queue. If the ordering is not total, the order of the elements is
    /// unspecified.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue: Queue = ["bb", "a", "ccc", "dd"].iter().copied().collect();
    /// queue.sort_by(|a, b| b.len().cmp(&a.len()));
    /// assert_eq!(queue.iter().collect::<Vec<_>>(), ["ccc", "bb", "dd", "a"]);
    /// ```
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&str, &str) -> Ordering,
    {
        let sorted = sort::merge_sort(self, |a, b| compare(a, b) == Ordering::Less);
        if sorted > 1 {
            trace!(sorted, "sorted queue");
        } else {
            debug!(sorted, "nothing to sort");
        }
        self.ring.check_links();
    }
}
