//! The ring primitive: a ghost-anchored cyclic doubly-linked list of bare links.
//!
//! A [`Ring`] owns nothing but its ghost node. Every other node is embedded as the
//! first field of a `#[repr(C)]` payload type (see [`Element`]), so a `NonNull<Link>`
//! can be cast back to its container.
//!
//! [`Element`]: crate::Element

use std::alloc::{alloc, Layout};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;

#[repr(C)]
pub(crate) struct Link {
    pub(crate) next: NonNull<Link>,
    pub(crate) prev: NonNull<Link>,
}

/// A cyclic list anchored at a ghost node.
///
/// The ghost node never carries a payload. In an empty ring, `ghost.next` and
/// `ghost.prev` both point to the ghost itself; otherwise `ghost.next` is the
/// front node and `ghost.prev` is the back node.
pub(crate) struct Ring {
    ghost: NonNull<Link>,
}

impl Link {
    /// A link that is not part of any ring yet. Neither pointer may be read
    /// before the link is attached.
    pub(crate) fn dangling() -> Self {
        Self {
            next: NonNull::dangling(),
            prev: NonNull::dangling(),
        }
    }
}

impl Ring {
    /// Allocate a self-linked ghost node, or return the layout that could not be
    /// allocated.
    pub(crate) fn try_new() -> Result<Self, Layout> {
        let ghost = try_alloc::<Link>()?;
        // SAFETY: `ghost` is freshly allocated for a `Link` and is written before
        // it is ever read.
        unsafe {
            ghost.as_ptr().write(Link {
                next: ghost,
                prev: ghost,
            })
        };
        Ok(Self { ghost })
    }

    pub(crate) fn ghost(&self) -> NonNull<Link> {
        self.ghost
    }

    pub(crate) fn front(&self) -> NonNull<Link> {
        // SAFETY: `ghost.next` is always valid (either `ghost` itself, or the first node).
        unsafe { self.ghost.as_ref().next }
    }

    pub(crate) fn back(&self) -> NonNull<Link> {
        // SAFETY: `ghost.prev` is always valid (either `ghost` itself, or the last node).
        unsafe { self.ghost.as_ref().prev }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.front() == self.ghost
    }

    /// Link `node` right after the ghost node.
    ///
    /// It is unsafe because `node` must be a detached node that outlives its
    /// membership in the ring.
    pub(crate) unsafe fn push_front(&mut self, node: NonNull<Link>) {
        attach(self.ghost, self.front(), node);
    }

    /// Link `node` right before the ghost node.
    ///
    /// It is unsafe for the same reason as [`Ring::push_front`].
    pub(crate) unsafe fn push_back(&mut self, node: NonNull<Link>) {
        attach(self.back(), self.ghost, node);
    }

    /// Make the ghost node self-linked again, forgetting every node.
    ///
    /// The caller is responsible for the forgotten nodes.
    pub(crate) fn reset(&mut self) {
        let ghost = self.ghost;
        // SAFETY: the ghost node is owned by the ring.
        unsafe { connect(ghost, ghost) };
    }

    /// Forward iteration. The successor is read only when the iterator advances,
    /// so the yielded node must stay linked until then.
    pub(crate) fn links(&self) -> Links<'_> {
        Links {
            last: self.ghost,
            ghost: self.ghost,
            _marker: PhantomData,
        }
    }

    /// Forward iteration that reads the successor before yielding a node, so the
    /// yielded node may be detached (and freed) before the iterator advances.
    pub(crate) fn links_safe(&self) -> LinksSafe<'_> {
        LinksSafe {
            current: self.front(),
            ghost: self.ghost,
            _marker: PhantomData,
        }
    }

    /// Walk the whole ring and panic if any `next`/`prev` pair disagrees.
    pub(crate) fn assert_well_formed(&self) {
        let mut prev = self.ghost;
        loop {
            // SAFETY: every node reachable from the ghost is alive.
            let next = unsafe { prev.as_ref().next };
            assert_adjacent(prev, next);
            if next == self.ghost {
                break;
            }
            prev = next;
        }
    }

    /// Runs [`Ring::assert_well_formed`] when the `link-check` feature is on.
    #[inline]
    pub(crate) fn check_links(&self) {
        if cfg!(feature = "link-check") {
            self.assert_well_formed();
        }
    }
}

impl Drop for Ring {
    fn drop(&mut self) {
        // SAFETY: the ghost node was allocated with the global allocator for a
        // `Link`, and payload nodes have already been released by the owner.
        drop(unsafe { Box::from_raw(self.ghost.as_ptr()) });
    }
}

/// See [`Ring::links`].
pub(crate) struct Links<'a> {
    last: NonNull<Link>,
    ghost: NonNull<Link>,
    _marker: PhantomData<&'a Ring>,
}

impl Iterator for Links<'_> {
    type Item = NonNull<Link>;

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: `last` is either the ghost or a node still linked in the ring.
        let next = unsafe { self.last.as_ref().next };
        if next == self.ghost {
            return None;
        }
        self.last = next;
        Some(next)
    }
}

impl FusedIterator for Links<'_> {}

/// See [`Ring::links_safe`].
pub(crate) struct LinksSafe<'a> {
    current: NonNull<Link>,
    ghost: NonNull<Link>,
    _marker: PhantomData<&'a Ring>,
}

impl Iterator for LinksSafe<'_> {
    type Item = NonNull<Link>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.ghost {
            return None;
        }
        let current = self.current;
        // SAFETY: `current` has not been yielded yet, so it is still linked.
        self.current = unsafe { current.as_ref().next };
        Some(current)
    }
}

impl FusedIterator for LinksSafe<'_> {}

/// Allocate uninitialized storage for one `T` with the global allocator.
///
/// `T` must not be zero-sized.
pub(crate) fn try_alloc<T>() -> Result<NonNull<T>, Layout> {
    let layout = Layout::new::<T>();
    debug_assert!(layout.size() > 0);
    // SAFETY: `layout` has a non-zero size.
    let ptr = unsafe { alloc(layout) } as *mut T;
    NonNull::new(ptr).ok_or(layout)
}

pub(crate) unsafe fn connect(mut prev: NonNull<Link>, mut next: NonNull<Link>) {
    prev.as_mut().next = next;
    next.as_mut().prev = prev;
}

/// Attach a single node `node` between `prev` and `next`.
///
/// It is unsafe because it does not check whether `prev` and `next` are adjacent
/// (only in `#[cfg(debug_assertions)]`). If they are not, this call makes the
/// ring ill-formed.
pub(crate) unsafe fn attach(prev: NonNull<Link>, next: NonNull<Link>, node: NonNull<Link>) {
    #[cfg(debug_assertions)]
    assert_adjacent(prev, next);
    connect(prev, node);
    connect(node, next);
}

/// Detach a single node from whatever ring it is linked in.
///
/// The links of `node` are left stale and must not be read afterwards.
pub(crate) unsafe fn detach(node: NonNull<Link>) {
    let (prev, next) = (node.as_ref().prev, node.as_ref().next);
    #[cfg(debug_assertions)]
    {
        assert_adjacent(prev, node);
        assert_adjacent(node, next);
    }
    connect(prev, next);
}

fn assert_adjacent(prev: NonNull<Link>, next: NonNull<Link>) {
    unsafe {
        assert_eq!(prev.as_ref().next, next);
        assert_eq!(next.as_ref().prev, prev);
    }
}
