//! This crate provides a queue of owned strings, implemented as an intrusive
//! cyclic doubly-linked list.
//!
//! The [`Queue`] allows inserting and removing elements at both ends in constant
//! time, and restructures itself (reversal, pairwise swap, middle and duplicate
//! deletion, stable sort) purely by rewriting links: no value is ever moved or
//! copied once it is in the queue.
//!
//! Here is a quick example showing how the queue works.
//!
//! ```
//! use string_queue::Queue;
//!
//! let mut queue = Queue::new();
//! queue.insert_tail("banana").unwrap();
//! queue.insert_tail("apple").unwrap();
//! queue.insert_head("cherry").unwrap();
//! assert_eq!(queue.size(), 3);
//!
//! queue.sort();
//! assert_eq!(queue.iter().collect::<Vec<_>>(), ["apple", "banana", "cherry"]);
//!
//! let element = queue.remove_head(None).unwrap();
//! assert_eq!(element.value(), "apple");
//! ```
//!
//! # Memory Layout
//!
//! The memory layout of the queue is like the following graph:
//! ```text
//!          ┌─────────────────────────────────────────────────────────────────────┐
//!          ↓                                                      Ghost node     │
//!    ╔═══════════╗           ╔═══════════╗                        ┌───────────┐  │
//!    ║   next    ║ ────────→ ║   next    ║ ────────→ ┄┄ ────────→ │   next    │ ─┘
//!    ╟───────────╢           ╟───────────╢                        ├───────────┤
//! ┌─ ║   prev    ║ ←──────── ║   prev    ║ ←──────── ┄┄ ←──────── │   prev    │
//! │  ╟───────────╢           ╟───────────╢                        └───────────┘
//! │  ║  String   ║           ║  String   ║                            ↑   ↑
//! │  ╚═══════════╝           ╚═══════════╝                            │   │
//! │    Element 0               Element 1                              │   │
//! └───────────────────────────────────────────────────────────────────┘   │
//! ╔═══════════╗                                                           │
//! ║   ring    ║ ──────────────────────────────────────────────────────────┘
//! ╚═══════════╝
//!     Queue
//! ```
//!
//! The `Queue` only holds a pointer to its ghost node, a bare link with no
//! payload. Each [`Element`] embeds a link as its first field, followed by the
//! owned value. In an empty queue the ghost node links to itself; otherwise
//! `ghost.next` is the first element and `ghost.prev` the last one.
//!
//! The length is not stored, so [`Queue::size`] walks the whole ring.
//!
//! # Errors
//!
//! Fallible operations return [`QueueError`]. A failed operation leaves the queue
//! untouched: allocation failures during insertion leak nothing and link
//! nothing. The [`handle`] module offers the same operations on a queue that may
//! be absent.
//!
//! # Features
//!
//! - `link-check`: verify the whole ring after every mutating operation and
//!   panic if any `next`/`prev` pair disagrees. Debug builds always check the
//!   neighbours of every attached or detached node.

#[doc(inline)]
pub use element::Element;
#[doc(inline)]
pub use error::{QueueError, Result};
#[doc(inline)]
pub use queue::iterator::{IntoIter, Iter};
#[doc(inline)]
pub use queue::Queue;

pub mod handle;
pub mod queue;

mod element;
mod error;
mod ring;
