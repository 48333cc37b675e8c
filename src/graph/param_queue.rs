//! Lock-free single-producer/single-consumer parameter queue (spec.md §5,
//! SPEC_FULL.md §3.7): the main thread pushes `(node, value)` commands, the
//! audio thread drains them at the top of each callback. Every slot is a
//! plain atomic, so no `unsafe` is needed to share it across threads.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::nodes::NodeRef;

struct Slot {
    node: AtomicUsize,
    value_bits: AtomicUsize,
    occupied: AtomicBool,
}

impl Slot {
    fn new() -> Self {
        Slot { node: AtomicUsize::new(0), value_bits: AtomicUsize::new(0), occupied: AtomicBool::new(false) }
    }
}

/// A bounded ring buffer of pending `Graph::set_constant`-style updates.
/// `push` is safe to call from the main thread, `pop` from the audio
/// callback thread, concurrently, without locking.
pub struct ParamQueue {
    slots: Box<[Slot]>,
    capacity: usize,
    head: AtomicUsize,
    tail: AtomicUsize,
}

impl ParamQueue {
    /// Create a queue holding up to `capacity` pending commands at once.
    /// `capacity` is rounded up to at least `2`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        let slots = (0..capacity).map(|_| Slot::new()).collect::<Vec<_>>().into_boxed_slice();
        ParamQueue { slots, capacity, head: AtomicUsize::new(0), tail: AtomicUsize::new(0) }
    }

    /// Enqueue a parameter update. Returns `false` if the queue is full (the
    /// caller should drop the update or retry next frame; this never blocks).
    pub fn push(&self, node: NodeRef, value: f64) -> bool {
        let tail = self.tail.load(Ordering::Relaxed);
        let next = (tail + 1) % self.capacity;
        if next == self.head.load(Ordering::Acquire) {
            return false;
        }
        let slot = &self.slots[tail];
        slot.value_bits.store(value.to_bits() as usize, Ordering::Relaxed);
        slot.node.store(node, Ordering::Relaxed);
        slot.occupied.store(true, Ordering::Release);
        self.tail.store(next, Ordering::Release);
        true
    }

    /// Dequeue the oldest pending update, if any.
    pub fn pop(&self) -> Option<(NodeRef, f64)> {
        let head = self.head.load(Ordering::Relaxed);
        if head == self.tail.load(Ordering::Acquire) {
            return None;
        }
        let slot = &self.slots[head];
        let node = slot.node.load(Ordering::Relaxed);
        let value = f64::from_bits(slot.value_bits.load(Ordering::Relaxed) as u64);
        slot.occupied.store(false, Ordering::Relaxed);
        self.head.store((head + 1) % self.capacity, Ordering::Release);
        Some((node, value))
    }

    /// Whether the queue currently holds no pending updates.
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Maximum number of pending updates this queue can hold at once.
    pub fn capacity(&self) -> usize {
        self.capacity - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_pop_roundtrips() {
        let q = ParamQueue::new(4);
        assert!(q.push(3, 1.5));
        assert_eq!(q.pop(), Some((3, 1.5)));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn fifo_order_preserved() {
        let q = ParamQueue::new(8);
        for i in 0..5 {
            assert!(q.push(i, i as f64));
        }
        for i in 0..5 {
            assert_eq!(q.pop(), Some((i, i as f64)));
        }
    }

    #[test]
    fn full_queue_rejects_push() {
        let q = ParamQueue::new(2);
        assert!(q.push(0, 0.0));
        assert!(!q.push(1, 1.0));
    }

    #[test]
    fn is_empty_tracks_state() {
        let q = ParamQueue::new(4);
        assert!(q.is_empty());
        q.push(1, 1.0);
        assert!(!q.is_empty());
        q.pop();
        assert!(q.is_empty());
    }

    #[test]
    fn cross_thread_producer_consumer() {
        use std::sync::Arc;
        use std::thread;

        let q = Arc::new(ParamQueue::new(64));
        let producer = Arc::clone(&q);
        let handle = thread::spawn(move || {
            for i in 0..50 {
                while !producer.push(i, i as f64) {
                    thread::yield_now();
                }
            }
        });

        let mut received = Vec::new();
        while received.len() < 50 {
            if let Some(item) = q.pop() {
                received.push(item);
            } else {
                thread::yield_now();
            }
        }
        handle.join().unwrap();
        for (i, (node, value)) in received.into_iter().enumerate() {
            assert_eq!(node, i);
            assert_eq!(value, i as f64);
        }
    }
}
