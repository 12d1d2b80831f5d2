use std::alloc::handle_alloc_error;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::ptr::NonNull;

use tracing::{debug, warn};

use crate::element::Element;
use crate::error::{QueueError, Result};
use crate::ring::Ring;
use crate::{IntoIter, Iter};

pub mod iterator;

mod algorithms;

/// The `Queue` is a sequence of owned strings, implemented as an intrusive cyclic
/// doubly-linked list.
///
/// Inserting and removing at either end take constant time. The size is not
/// stored anywhere: [`Queue::size`] counts the elements on every call.
///
/// Operations that can fail return a [`Result`]; a failed operation never
/// changes the queue. The `push_*` / `pop_*` methods and the [`FromIterator`] and
/// [`Extend`] impls are the infallible counterparts, which abort on allocation
/// failure like the standard collections do.
pub struct Queue {
    pub(crate) ring: Ring,
    _marker: PhantomData<Box<Element>>,
}

// private methods
impl Queue {
    fn new_element(value: &str) -> Result<NonNull<Element>> {
        Element::try_new(value).map_err(|layout| {
            warn!(size = layout.size(), "failed to allocate queue element");
            QueueError::AllocationFailure(layout)
        })
    }

    fn ensure_not_empty(&self, op: &'static str) -> Result<()> {
        if self.ring.is_empty() {
            debug!(op, "rejected on an empty queue");
            return Err(QueueError::EmptyQueue);
        }
        Ok(())
    }
}

impl Queue {
    /// Create an empty `Queue`.
    ///
    /// # Examples
    /// ```
    /// use string_queue::Queue;
    /// let queue = Queue::new();
    /// assert!(queue.is_empty());
    /// ```
    #[inline]
    pub fn new() -> Self {
        match Ring::try_new() {
            Ok(ring) => Self::from_ring(ring),
            Err(layout) => handle_alloc_error(layout),
        }
    }

    /// Create an empty `Queue`, reporting allocation failure instead of aborting.
    pub fn try_new() -> Result<Self> {
        match Ring::try_new() {
            Ok(ring) => Ok(Self::from_ring(ring)),
            Err(layout) => {
                warn!(size = layout.size(), "failed to allocate queue ghost node");
                Err(QueueError::AllocationFailure(layout))
            }
        }
    }

    fn from_ring(ring: Ring) -> Self {
        let _marker = PhantomData;
        Self { ring, _marker }
    }

    /// Returns `true` if the `Queue` is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Returns the number of elements, counted by walking the whole queue.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// assert_eq!(queue.size(), 0);
    /// queue.insert_head("b").unwrap();
    /// queue.insert_tail("c").unwrap();
    /// assert_eq!(queue.size(), 2);
    /// ```
    pub fn size(&self) -> usize {
        self.ring.links().count()
    }

    /// Releases every element of the `Queue`.
    #[inline]
    pub fn clear(&mut self) {
        for link in self.ring.links_safe() {
            // SAFETY: every link after the ghost node is embedded in an element
            // owned by this queue, and `links_safe` has already read its successor.
            unsafe { Element::unlink(link) }.release();
        }
        self.ring.reset();
    }

    /// Provides the value of the front element, or `None` if the queue is empty.
    #[inline]
    pub fn front(&self) -> Option<&str> {
        self.iter().next()
    }

    /// Provides the value of the back element, or `None` if the queue is empty.
    #[inline]
    pub fn back(&self) -> Option<&str> {
        self.iter().next_back()
    }

    /// Copies `value` into a new element and links it first in the queue.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::AllocationFailure`] if either the copy or the element
    /// cannot be allocated. Nothing is linked or leaked in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// queue.insert_head("a").unwrap();
    /// queue.insert_head("b").unwrap();
    /// assert_eq!(queue.pop_front().as_deref(), Some("b"));
    /// assert_eq!(queue.pop_front().as_deref(), Some("a"));
    /// ```
    pub fn insert_head(&mut self, value: &str) -> Result<()> {
        let node = Self::new_element(value)?;
        // SAFETY: `node` is a fresh detached element, owned by the queue from now on.
        unsafe { self.ring.push_front(Element::link_of(node)) };
        self.ring.check_links();
        Ok(())
    }

    /// Copies `value` into a new element and links it last in the queue.
    ///
    /// # Errors
    ///
    /// See [`Queue::insert_head`].
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// for value in &["a", "b", "c"] {
    ///     queue.insert_tail(value).unwrap();
    /// }
    /// assert_eq!(queue.iter().collect::<Vec<_>>(), ["a", "b", "c"]);
    /// ```
    pub fn insert_tail(&mut self, value: &str) -> Result<()> {
        let node = Self::new_element(value)?;
        // SAFETY: `node` is a fresh detached element, owned by the queue from now on.
        unsafe { self.ring.push_back(Element::link_of(node)) };
        self.ring.check_links();
        Ok(())
    }

    /// Unlinks the first element and transfers its ownership to the caller.
    ///
    /// If `buf` is given, the value is also copied into it as a NUL-terminated
    /// byte string, truncated to `buf.len() - 1` bytes (see
    /// [`Element::copy_value_to`]).
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::EmptyQueue`] if there is nothing to remove.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::{Queue, QueueError};
    ///
    /// let mut queue = Queue::new();
    /// assert_eq!(queue.remove_head(None).unwrap_err(), QueueError::EmptyQueue);
    ///
    /// queue.insert_tail("gerbil").unwrap();
    /// let mut buf = [0u8; 4];
    /// let element = queue.remove_head(Some(&mut buf[..])).unwrap();
    /// assert_eq!(element.value(), "gerbil");
    /// assert_eq!(&buf, b"ger\0");
    /// ```
    pub fn remove_head(&mut self, buf: Option<&mut [u8]>) -> Result<Box<Element>> {
        self.ensure_not_empty("remove_head")?;
        // SAFETY: the queue is not empty, so the front node is an owned element.
        let element = unsafe { Element::unlink(self.ring.front()) };
        if let Some(buf) = buf {
            element.copy_value_to(buf);
        }
        self.ring.check_links();
        Ok(element)
    }

    /// Unlinks the last element and transfers its ownership to the caller.
    ///
    /// See [`Queue::remove_head`] for the handling of `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::EmptyQueue`] if there is nothing to remove.
    pub fn remove_tail(&mut self, buf: Option<&mut [u8]>) -> Result<Box<Element>> {
        self.ensure_not_empty("remove_tail")?;
        // SAFETY: the queue is not empty, so the back node is an owned element.
        let element = unsafe { Element::unlink(self.ring.back()) };
        if let Some(buf) = buf {
            element.copy_value_to(buf);
        }
        self.ring.check_links();
        Ok(element)
    }

    /// Adds a value first in the queue without copying it.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    pub fn push_front(&mut self, value: impl Into<String>) {
        let node = Element::try_from_string(value.into())
            .unwrap_or_else(|layout| handle_alloc_error(layout));
        // SAFETY: `node` is a fresh detached element.
        unsafe { self.ring.push_front(Element::link_of(node)) };
        self.ring.check_links();
    }

    /// Appends a value to the back of the queue without copying it.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    pub fn push_back(&mut self, value: impl Into<String>) {
        let node = Element::try_from_string(value.into())
            .unwrap_or_else(|layout| handle_alloc_error(layout));
        // SAFETY: `node` is a fresh detached element.
        unsafe { self.ring.push_back(Element::link_of(node)) };
        self.ring.check_links();
    }

    /// Removes the first element and returns its value, or `None` if the queue
    /// is empty.
    pub fn pop_front(&mut self) -> Option<String> {
        self.remove_head(None).ok().map(Element::into_value)
    }

    /// Removes the last element and returns its value, or `None` if the queue
    /// is empty.
    pub fn pop_back(&mut self) -> Option<String> {
        self.remove_tail(None).ok().map(Element::into_value)
    }

    /// Provides a double-ended iterator over the values.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let queue: Queue = ["x", "y"].iter().copied().collect();
    /// let mut iter = queue.iter();
    /// assert_eq!(iter.next(), Some("x"));
    /// assert_eq!(iter.next_back(), Some("y"));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Consumes the queue into an iterator of owned values.
    #[inline]
    pub fn into_values(self) -> IntoIter {
        self.into_iter()
    }
}

impl Debug for Queue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        self.clear();
    }
}

// `Queue` exclusively owns every node reachable from its ghost node.
unsafe impl Send for Queue {}

unsafe impl Sync for Queue {}

#[cfg(test)]
mod tests {
    use crate::{Queue, QueueError};
    use std::iter::FromIterator;

    fn values(queue: &Queue) -> Vec<&str> {
        queue.iter().collect()
    }

    #[test]
    fn queue_create() {
        let mut queue = Queue::try_new().unwrap();
        assert!(queue.is_empty());
        assert_eq!(queue.size(), 0);
        queue.insert_tail("1").unwrap();
        assert!(!queue.is_empty());
        assert_eq!(queue.remove_tail(None).unwrap().value(), "1");
        assert!(queue.is_empty());
        queue.ring.assert_well_formed();
    }

    #[test]
    fn queue_lifo_from_head() {
        let mut queue = Queue::new();
        queue.insert_head("a").unwrap();
        queue.insert_head("b").unwrap();
        assert_eq!(queue.remove_head(None).unwrap().value(), "b");
        assert_eq!(queue.remove_head(None).unwrap().value(), "a");
        assert_eq!(queue.remove_head(None).unwrap_err(), QueueError::EmptyQueue);
    }

    #[test]
    fn queue_fifo_from_tail() {
        let mut queue = Queue::new();
        for value in &["a", "b", "c"] {
            queue.insert_tail(value).unwrap();
        }
        let removed: Vec<String> = std::iter::from_fn(|| queue.remove_head(None).ok())
            .map(|element| element.into_value())
            .collect();
        assert_eq!(removed, ["a", "b", "c"]);
    }

    #[test]
    fn queue_remove_tail() {
        let mut queue = Queue::from_iter(["a", "b", "c"].iter().copied());
        assert_eq!(queue.remove_tail(None).unwrap().value(), "c");
        assert_eq!(values(&queue), ["a", "b"]);
        assert_eq!(queue.front(), Some("a"));
        assert_eq!(queue.back(), Some("b"));
        queue.ring.assert_well_formed();
    }

    #[test]
    fn queue_remove_into_buffer() {
        let mut queue = Queue::from_iter(["dolphin", "cat"].iter().copied());

        let mut buf = [0xaa_u8; 5];
        let element = queue.remove_head(Some(&mut buf[..])).unwrap();
        assert_eq!(element.value(), "dolphin");
        assert_eq!(&buf, b"dolp\0");

        let mut buf = [0xaa_u8; 8];
        let element = queue.remove_tail(Some(&mut buf[..])).unwrap();
        assert_eq!(element.value(), "cat");
        assert_eq!(&buf[..4], b"cat\0");
        assert!(buf[4..].iter().all(|&b| b == 0xaa));

        // the buffer is left alone when the queue is empty
        let mut buf = [0xaa_u8; 4];
        assert_eq!(
            queue.remove_tail(Some(&mut buf[..])).unwrap_err(),
            QueueError::EmptyQueue
        );
        assert_eq!(buf, [0xaa_u8; 4]);
    }

    #[test]
    fn queue_failed_operations_keep_ring() {
        let mut queue = Queue::new();
        let ghost = queue.ring.ghost();
        let mut buf = [0xaa_u8; 4];
        assert_eq!(queue.remove_head(None).unwrap_err(), QueueError::EmptyQueue);
        assert_eq!(
            queue.remove_tail(Some(&mut buf[..])).unwrap_err(),
            QueueError::EmptyQueue
        );
        assert_eq!(queue.delete_middle(), Err(QueueError::EmptyQueue));
        assert_eq!(queue.delete_duplicates(), Err(QueueError::EmptyQueue));
        queue.swap_pairs();
        queue.reverse();
        queue.sort();

        assert_eq!(queue.ring.front(), ghost);
        assert_eq!(queue.ring.back(), ghost);
        queue.ring.assert_well_formed();
        assert_eq!(buf, [0xaa_u8; 4]);

        queue.insert_tail("a").unwrap();
        assert_eq!(values(&queue), ["a"]);
        assert_eq!(queue.remove_head(None).unwrap().value(), "a");
        assert_eq!(queue.ring.front(), ghost);
        queue.ring.assert_well_formed();
    }

    #[test]
    fn queue_size_tracks_inserts_and_removes() {
        let mut queue = Queue::new();
        let mut expected = 0;
        for i in 0..20 {
            let value = i.to_string();
            if i % 2 == 0 {
                queue.insert_head(&value).unwrap();
            } else {
                queue.insert_tail(&value).unwrap();
            }
            expected += 1;
            if i % 3 == 0 {
                queue.remove_tail(None).unwrap();
                expected -= 1;
            }
            assert_eq!(queue.size(), expected);
        }
        queue.ring.assert_well_formed();
        queue.clear();
        assert_eq!(queue.size(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn queue_push_and_pop() {
        let mut queue = Queue::new();
        assert_eq!(queue.pop_front(), None);
        assert_eq!(queue.pop_back(), None);

        queue.push_back("2");
        queue.push_front(String::from("1"));
        queue.push_back("3");
        assert_eq!(queue.front(), Some("1"));
        assert_eq!(queue.back(), Some("3"));
        queue.ring.assert_well_formed();
        assert_eq!(queue.pop_back().as_deref(), Some("3"));
        assert_eq!(queue.pop_front().as_deref(), Some("1"));
        assert_eq!(queue.pop_front().as_deref(), Some("2"));
        assert!(queue.is_empty());
    }

    #[test]
    fn queue_empty_strings() {
        let mut queue = Queue::new();
        queue.insert_tail("").unwrap();
        queue.insert_tail("").unwrap();
        assert_eq!(queue.size(), 2);
        let mut buf = [0xaa_u8; 3];
        assert_eq!(queue.remove_head(Some(&mut buf[..])).unwrap().value(), "");
        assert_eq!(buf[0], 0);
    }

    #[test]
    fn queue_debug() {
        let queue = Queue::from_iter(["a", "b"].iter().copied());
        assert_eq!(format!("{:?}", queue), r#"["a", "b"]"#);
    }
}
