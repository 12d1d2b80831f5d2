use crate::ring::{self, try_alloc, Link};
use std::alloc::Layout;
use std::fmt::{self, Debug, Formatter};
use std::ptr::NonNull;

/// A node of a [`Queue`], owning one string value.
///
/// Elements are handed out by [`Queue::remove_head`] and [`Queue::remove_tail`],
/// after which the caller owns them. Dropping an element (or calling
/// [`Element::release`]) frees both the value and the node.
///
/// [`Queue`]: crate::Queue
/// [`Queue::remove_head`]: crate::Queue::remove_head
/// [`Queue::remove_tail`]: crate::Queue::remove_tail
#[repr(C)]
pub struct Element {
    // Must stay the first field: links are cast back to elements.
    link: Link,
    value: String,
}

impl Element {
    /// Duplicate `value` and allocate a detached element holding the copy.
    ///
    /// Returns the layout that could not be allocated on failure. Nothing is
    /// leaked in either case.
    pub(crate) fn try_new(value: &str) -> Result<NonNull<Element>, Layout> {
        let mut owned = String::new();
        owned
            .try_reserve_exact(value.len())
            .map_err(|_| Layout::for_value(value))?;
        owned.push_str(value);
        Self::try_from_string(owned)
    }

    /// Like [`Element::try_new`], but moves `value` in without copying it.
    pub(crate) fn try_from_string(value: String) -> Result<NonNull<Element>, Layout> {
        // `value` is dropped here if the node cannot be allocated.
        let node = try_alloc::<Element>()?;
        // SAFETY: `node` is freshly allocated for an `Element`.
        unsafe {
            node.as_ptr().write(Element {
                link: Link::dangling(),
                value,
            })
        };
        Ok(node)
    }

    /// Detach the element owning `link` from its ring and take ownership of it.
    ///
    /// It is unsafe because `link` must be linked in a ring and embedded in an
    /// element allocated by [`Element::try_new`] or [`Element::try_from_string`].
    pub(crate) unsafe fn unlink(link: NonNull<Link>) -> Box<Element> {
        ring::detach(link);
        Box::from_raw(link.cast::<Element>().as_ptr())
    }

    /// Returns the value of the element that embeds `link`.
    ///
    /// It is unsafe because `link` must be embedded in a live element, and
    /// the element must outlive `'a`.
    pub(crate) unsafe fn value_at<'a>(link: NonNull<Link>) -> &'a str {
        &(*link.cast::<Element>().as_ptr()).value
    }

    pub(crate) fn link_of(node: NonNull<Element>) -> NonNull<Link> {
        node.cast()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn into_value(self: Box<Self>) -> String {
        self.value
    }

    /// Copy the value into `buf` as a NUL-terminated byte string.
    ///
    /// At most `buf.len() - 1` bytes of the value are copied, followed by a
    /// `0` byte; longer values are truncated (possibly in the middle of a
    /// multi-byte character). Nothing is written into an empty buffer.
    /// Returns the number of value bytes copied.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// queue.insert_tail("abcdef").unwrap();
    ///
    /// let element = queue.remove_head(None).unwrap();
    /// let mut buf = [0xff_u8; 4];
    /// assert_eq!(element.copy_value_to(&mut buf), 3);
    /// assert_eq!(&buf, b"abc\0");
    /// ```
    pub fn copy_value_to(&self, buf: &mut [u8]) -> usize {
        let cap = match buf.len().checked_sub(1) {
            Some(cap) => cap,
            None => return 0,
        };
        let len = self.value.len().min(cap);
        buf[..len].copy_from_slice(&self.value.as_bytes()[..len]);
        buf[len] = 0;
        len
    }

    /// Free the value storage and the element storage.
    pub fn release(self: Box<Self>) {
        drop(self);
    }
}

impl Debug for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("value", &self.value)
            .finish()
    }
}

// A detached element only holds stale links, which are never read again.
unsafe impl Send for Element {}

unsafe impl Sync for Element {}
