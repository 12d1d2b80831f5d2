//! Queue operations over a handle that may be absent.
//!
//! Each function takes the queue as an `Option`. With `None` it returns the
//! operation's failure value ([`QueueError::InvalidArgument`], `0`, or nothing)
//! and never panics; with `Some` it forwards to the [`Queue`] method of the same
//! name.
//!
//! # Examples
//!
//! ```
//! use string_queue::{handle, QueueError};
//!
//! let mut queue = handle::create().unwrap();
//! handle::insert_tail(Some(&mut queue), "a").unwrap();
//! assert_eq!(handle::size(Some(&queue)), 1);
//!
//! assert_eq!(handle::insert_tail(None, "a"), Err(QueueError::InvalidArgument));
//! assert_eq!(handle::size(None), 0);
//! handle::destroy(Some(queue));
//! handle::destroy(None);
//! ```

use tracing::debug;

use crate::element::Element;
use crate::error::{QueueError, Result};
use crate::queue::Queue;

fn present<Q>(queue: Option<Q>, op: &'static str) -> Result<Q> {
    queue.ok_or_else(|| {
        debug!(op, "rejected on an absent queue");
        QueueError::InvalidArgument
    })
}

/// Create an empty queue, see [`Queue::try_new`].
pub fn create() -> Result<Queue> {
    Queue::try_new()
}

/// Release every element of `queue`, then the queue itself.
pub fn destroy(queue: Option<Queue>) {
    drop(queue);
}

/// Insert a copy of `value` at the head, see [`Queue::insert_head`].
pub fn insert_head(queue: Option<&mut Queue>, value: &str) -> Result<()> {
    present(queue, "insert_head")?.insert_head(value)
}

/// Insert a copy of `value` at the tail, see [`Queue::insert_tail`].
pub fn insert_tail(queue: Option<&mut Queue>, value: &str) -> Result<()> {
    present(queue, "insert_tail")?.insert_tail(value)
}

/// Unlink the head element, see [`Queue::remove_head`].
pub fn remove_head(queue: Option<&mut Queue>, buf: Option<&mut [u8]>) -> Result<Box<Element>> {
    present(queue, "remove_head")?.remove_head(buf)
}

/// Unlink the tail element, see [`Queue::remove_tail`].
pub fn remove_tail(queue: Option<&mut Queue>, buf: Option<&mut [u8]>) -> Result<Box<Element>> {
    present(queue, "remove_tail")?.remove_tail(buf)
}

/// Returns `0` for an absent queue.
pub fn size(queue: Option<&Queue>) -> usize {
    queue.map_or(0, Queue::size)
}

/// See [`Queue::delete_middle`].
pub fn delete_middle(queue: Option<&mut Queue>) -> Result<()> {
    present(queue, "delete_middle")?.delete_middle()
}

/// See [`Queue::delete_duplicates`].
pub fn delete_duplicates(queue: Option<&mut Queue>) -> Result<()> {
    present(queue, "delete_duplicates")?.delete_duplicates()
}

/// See [`Queue::swap_pairs`]. Does nothing for an absent queue.
pub fn swap_pairs(queue: Option<&mut Queue>) {
    if let Some(queue) = queue {
        queue.swap_pairs();
    }
}

/// See [`Queue::reverse`]. Does nothing for an absent queue.
pub fn reverse(queue: Option<&mut Queue>) {
    if let Some(queue) = queue {
        queue.reverse();
    }
}

/// See [`Queue::sort`]. Does nothing for an absent queue.
pub fn sort(queue: Option<&mut Queue>) {
    if let Some(queue) = queue {
        queue.sort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_queue() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();

        destroy(None);
        assert_eq!(insert_head(None, "a"), Err(QueueError::InvalidArgument));
        assert_eq!(insert_tail(None, "a"), Err(QueueError::InvalidArgument));
        assert_eq!(
            remove_head(None, None).unwrap_err(),
            QueueError::InvalidArgument
        );
        let mut buf = [0xaa_u8; 4];
        assert_eq!(
            remove_tail(None, Some(&mut buf[..])).unwrap_err(),
            QueueError::InvalidArgument
        );
        assert_eq!(buf, [0xaa_u8; 4]);
        assert_eq!(size(None), 0);
        assert_eq!(delete_middle(None), Err(QueueError::InvalidArgument));
        assert_eq!(delete_duplicates(None), Err(QueueError::InvalidArgument));
        swap_pairs(None);
        reverse(None);
        sort(None);
    }

    #[test]
    fn present_queue() {
        let mut queue = create().unwrap();
        assert_eq!(delete_middle(Some(&mut queue)), Err(QueueError::EmptyQueue));
        assert_eq!(
            delete_duplicates(Some(&mut queue)),
            Err(QueueError::EmptyQueue)
        );
        assert_eq!(
            remove_head(Some(&mut queue), None).unwrap_err(),
            QueueError::EmptyQueue
        );

        for value in &["4", "2", "3", "1"] {
            insert_tail(Some(&mut queue), value).unwrap();
        }
        insert_head(Some(&mut queue), "2").unwrap();
        assert_eq!(size(Some(&queue)), 5);

        sort(Some(&mut queue));
        delete_duplicates(Some(&mut queue)).unwrap();
        assert_eq!(queue.iter().collect::<Vec<_>>(), ["1", "3", "4"]);

        reverse(Some(&mut queue));
        swap_pairs(Some(&mut queue));
        assert_eq!(queue.iter().collect::<Vec<_>>(), ["3", "4", "1"]);

        delete_middle(Some(&mut queue)).unwrap();
        let mut buf = [0_u8; 2];
        let element = remove_tail(Some(&mut queue), Some(&mut buf[..])).unwrap();
        assert_eq!(element.value(), "1");
        assert_eq!(&buf, b"1\0");
        assert_eq!(remove_head(Some(&mut queue), None).unwrap().value(), "3");
        destroy(Some(queue));
    }
}
