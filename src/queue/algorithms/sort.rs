use crate::element::Element;
use crate::queue::Queue;
use crate::ring::Link;
use std::ptr::{self, NonNull};

/// Sort `queue` with a stable bottom-up merge sort, and return the number of
/// elements.
///
/// While sorting, the queue is treated as a forward chain through `next` that
/// ends at the ghost node; `prev` links are ignored. Each element is pushed onto
/// a stack of pending sorted runs, threaded through the (free) `prev` field of
/// each run's first node and also terminated by the ghost node. Before element
/// number `count` is pushed, two runs are merged if `count` is not one less than
/// a power of two: skipping one pending run per trailing 1-bit of `count` finds
/// the pair to merge, like the carry of a binary increment. Pending runs thus
/// never differ in size by more than 2:1, and the total work is *O*(*n* log *n*).
///
/// At the end the pending runs are folded from newest to oldest, then `prev`
/// links are rebuilt in one walk.
///
/// If `less` panics, every element is still linked back into the ring before
/// the panic propagates, in an unspecified order.
pub(super) fn merge_sort<F>(queue: &mut Queue, mut less: F) -> usize
where
    F: FnMut(&str, &str) -> bool,
{
    let (front, back, ghost) = (queue.ring.front(), queue.ring.back(), queue.ring.ghost());
    if front == back {
        // either empty or a single element
        return if front == ghost { 0 } else { 1 };
    }
    let mut sorting = Sorting {
        end: ghost,
        list: front,
        pending: ghost,
    };
    // SAFETY: the queue has at least two elements, `back.next` is the ghost node,
    // and nothing else touches the links until `sorting` is dropped and restores
    // the ring.
    unsafe { sorting.run(&mut less) }
}

/// The state of a running sort. Dropping it, on return or on unwind, joins
/// whatever is left into one chain and closes the ring around it.
struct Sorting {
    end: NonNull<Link>,
    /// The unsorted input while runs are being pushed, then the sorted result.
    list: NonNull<Link>,
    /// The newest pending run.
    pending: NonNull<Link>,
}

impl Sorting {
    unsafe fn run<F>(&mut self, less: &mut F) -> usize
    where
        F: FnMut(&str, &str) -> bool,
    {
        let end = self.end;
        let mut count = 0_usize;
        while self.list != end {
            let mut tail: *mut NonNull<Link> = ptr::addr_of_mut!(self.pending);
            let mut bits = count;
            while bits & 1 == 1 {
                tail = ptr::addr_of_mut!((*(*tail).as_ptr()).prev);
                bits >>= 1;
            }
            if bits > 0 {
                // `newer` and `older` stay on the stack until `merge` replaces
                // them with a single run in the same slot.
                let newer = *tail;
                let older = newer.as_ref().prev;
                merge(older, newer, older.as_ref().prev, end, tail, less);
            }

            let mut node = self.list;
            self.list = node.as_ref().next;
            node.as_mut().next = end;
            node.as_mut().prev = self.pending;
            self.pending = node;
            count += 1;
        }

        while self.pending != end {
            let run = self.pending;
            self.pending = run.as_ref().prev;
            merge(run, self.list, end, end, ptr::addr_of_mut!(self.list), less);
        }
        count
    }
}

impl Drop for Sorting {
    fn drop(&mut self) {
        // SAFETY: `list` and every pending run are disjoint chains ending at
        // `end`, and together hold every element of the ring.
        unsafe {
            let mut chain = self.list;
            while self.pending != self.end {
                let run = self.pending;
                self.pending = run.as_ref().prev;
                chain = join(run, chain, self.end);
            }
            rethread(self.end, chain);
        }
    }
}

/// Merge the runs `left` and `right`, both ending at `end`, into `*out`, and
/// store `below` in the merged run's `prev`. Ties take from `left`.
///
/// `*out` is written even if `less` panics, then with both runs joined
/// unmerged.
unsafe fn merge<F>(
    left: NonNull<Link>,
    right: NonNull<Link>,
    below: NonNull<Link>,
    end: NonNull<Link>,
    out: *mut NonNull<Link>,
    less: &mut F,
) where
    F: FnMut(&str, &str) -> bool,
{
    let mut merging = Merging {
        end,
        left,
        right,
        head: end,
        last: end,
        below,
        out,
    };
    while merging.left != end && merging.right != end {
        let taken;
        if less(Element::value_at(merging.right), Element::value_at(merging.left)) {
            taken = merging.right;
            merging.right = taken.as_ref().next;
        } else {
            taken = merging.left;
            merging.left = taken.as_ref().next;
        }
        if merging.last == end {
            merging.head = taken;
        } else {
            merging.last.as_mut().next = taken;
        }
        merging.last = taken;
    }
}

/// A merge in progress. `head..=last` is the merged prefix; its `last.next`
/// is stale until the remainder is attached on drop.
struct Merging {
    end: NonNull<Link>,
    left: NonNull<Link>,
    right: NonNull<Link>,
    head: NonNull<Link>,
    last: NonNull<Link>,
    below: NonNull<Link>,
    out: *mut NonNull<Link>,
}

impl Drop for Merging {
    fn drop(&mut self) {
        // SAFETY: `left` and `right` are the untaken parts of two chains ending
        // at `end`, and `out` outlives the merge.
        unsafe {
            let rest = join(self.left, self.right, self.end);
            if self.last == self.end {
                self.head = rest;
            } else {
                self.last.as_mut().next = rest;
            }
            self.head.as_mut().prev = self.below;
            *self.out = self.head;
        }
    }
}

/// Append chain `back` to chain `front`, both ending at `end`.
unsafe fn join(front: NonNull<Link>, back: NonNull<Link>, end: NonNull<Link>) -> NonNull<Link> {
    if front == end {
        return back;
    }
    if back != end {
        let mut last = front;
        while last.as_ref().next != end {
            last = last.as_ref().next;
        }
        last.as_mut().next = back;
    }
    front
}

/// Close `list`, a chain ending at `ghost`, into a ring, rebuilding every
/// `prev` link.
unsafe fn rethread(mut ghost: NonNull<Link>, list: NonNull<Link>) {
    ghost.as_mut().next = list;
    let mut prev = ghost;
    let mut node = list;
    while node != ghost {
        node.as_mut().prev = prev;
        prev = node;
        node = node.as_ref().next;
    }
    ghost.as_mut().prev = prev;
}


#[cfg(test)]
mod tests {
    use crate::Queue;
    use std::iter::FromIterator;
    use std::panic::{self, AssertUnwindSafe};

    fn values(queue: &Queue) -> Vec<&str> {
        queue.iter().collect()
    }

    #[test]
    fn sort_small() {
        fn test_case(input: &[&str], expected: &[&str]) {
            let mut queue = Queue::from_iter(input.iter().copied());
            queue.sort();
            assert_eq!(values(&queue), expected);
            queue.ring.assert_well_formed();
        }
        test_case(&[], &[]);
        test_case(&["a"], &["a"]);
        test_case(&["b", "a"], &["a", "b"]);
        test_case(&["banana", "apple", "cherry"], &["apple", "banana", "cherry"]);
        test_case(&["b", "B", "a", "A"], &["A", "B", "a", "b"]);
        test_case(&["ab", "a", "abc", ""], &["", "a", "ab", "abc"]);
        test_case(&["x", "x", "x"], &["x", "x", "x"]);
    }

    #[test]
    fn sort_sizes() {
        // Exercise every carry pattern for small counts, in several input orders.
        for n in 0..70_u32 {
            let ascending: Vec<String> = (0..n).map(|i| format!("{:03}", i)).collect();
            let inputs = vec![
                ascending.clone(),
                ascending.iter().rev().cloned().collect::<Vec<_>>(),
                (0..n).map(|i| format!("{:03}", (i * 37) % n.max(1))).collect(),
            ];
            for input in inputs {
                let mut expected = input.clone();
                expected.sort();
                let mut queue = Queue::from_iter(input);
                queue.sort();
                assert_eq!(queue.size(), n as usize);
                assert_eq!(values(&queue), expected);
                queue.ring.assert_well_formed();
            }
        }
    }

    #[test]
    fn sort_is_stable() {
        // Equal values must keep the order of their element storage.
        let mut queue = Queue::from_iter(vec!["b", "a", "b", "a", "b", "a", "c", "a"]);
        let before: Vec<(String, *const u8)> = queue
            .iter()
            .map(|value| (value.to_owned(), value.as_ptr()))
            .collect();
        queue.sort();
        let after: Vec<(String, *const u8)> = queue
            .iter()
            .map(|value| (value.to_owned(), value.as_ptr()))
            .collect();

        let mut expected = before.clone();
        expected.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(after, expected);
    }

    #[test]
    fn sort_by_key_order() {
        let mut queue = Queue::from_iter(vec!["pear", "fig", "apple", "kiwi"]);
        queue.sort_by(|a, b| a.len().cmp(&b.len()));
        assert_eq!(values(&queue), ["fig", "pear", "kiwi", "apple"]);
        queue.sort_by(|a, b| b.cmp(a));
        assert_eq!(values(&queue), ["pear", "kiwi", "fig", "apple"]);
        queue.ring.assert_well_formed();
    }

    #[test]
    fn sort_panicking_comparator() {
        let input = ["f", "e", "d", "c", "b", "a"];
        let mut queue = Queue::from_iter(input.iter().copied());
        let mut calls = 0;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            queue.sort_by(|a, b| {
                calls += 1;
                if calls == 3 {
                    panic!("comparison {}", calls);
                }
                a.cmp(b)
            })
        }));
        assert!(result.is_err());
        assert_eq!(queue.size(), input.len());
        queue.ring.assert_well_formed();
        let mut after = values(&queue);
        after.sort();
        assert_eq!(after, ["a", "b", "c", "d", "e", "f"]);

        // The queue is still usable, then dropped normally.
        queue.sort();
        assert_eq!(values(&queue), ["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn sort_panic_at_every_comparison() {
        // Cover panics while pushing runs and while folding them.
        for n in 2..20_usize {
            let input: Vec<String> = (0..n).map(|i| format!("{:02}", (i * 7) % n)).collect();
            let mut expected = input.clone();
            expected.sort();
            for limit in 1.. {
                let mut queue = Queue::from_iter(input.clone());
                let mut calls = 0;
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    queue.sort_by(|a, b| {
                        calls += 1;
                        assert!(calls < limit);
                        a.cmp(b)
                    })
                }));
                queue.ring.assert_well_formed();
                let mut after: Vec<String> = queue.iter().map(String::from).collect();
                if result.is_ok() {
                    assert_eq!(after, expected);
                    break;
                }
                after.sort();
                assert_eq!(after, expected);
            }
        }
    }

    #[test]
    fn sort_then_delete_duplicates() {
        let mut queue = Queue::from_iter(vec!["c", "a", "b", "a", "c", "d"]);
        queue.sort();
        queue.delete_duplicates().unwrap();
        assert_eq!(values(&queue), ["b", "d"]);
    }
}
