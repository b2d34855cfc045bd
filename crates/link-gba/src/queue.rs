use std::collections::VecDeque;

use crate::constants::{MAX_PACKET_BYTES, QUEUE_SLOTS};

/// One queued `SIO_DATA` payload, tagged with the `client_id` it arrived
/// addressed to/from.
#[derive(Debug, Clone)]
pub struct PendingPacket {
    pub client_id: u16,
    pub bytes: Vec<u8>,
}

/// Fixed-capacity, lossy FIFO of received `SIO_DATA` packets awaiting
/// delivery to the core (spec §3). When full, new packets are dropped
/// rather than blocking the transport — the queue is allowed to lose data
/// under overload, matching the spec's explicit "stays lossy" policy.
pub struct PendingPacketQueue {
    slots: VecDeque<PendingPacket>,
    dropped: u64,
}

impl Default for PendingPacketQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingPacketQueue {
    pub fn new() -> Self {
        Self {
            slots: VecDeque::with_capacity(QUEUE_SLOTS),
            dropped: 0,
        }
    }

    /// Attempt to enqueue. Returns `false` (and bumps the drop counter) if
    /// the queue is full or the packet exceeds [`MAX_PACKET_BYTES`].
    pub fn push(&mut self, client_id: u16, bytes: &[u8]) -> bool {
        if self.slots.len() >= QUEUE_SLOTS || bytes.len() > MAX_PACKET_BYTES {
            self.dropped += 1;
            return false;
        }
        self.slots.push_back(PendingPacket {
            client_id,
            bytes: bytes.to_vec(),
        });
        true
    }

    pub fn pop(&mut self) -> Option<PendingPacket> {
        self.slots.pop_front()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_drops_once_full_instead_of_blocking() {
        let mut q = PendingPacketQueue::new();
        for i in 0..QUEUE_SLOTS {
            assert!(q.push(1, &[i as u8]));
        }
        assert!(!q.push(1, &[0xFF]));
        assert_eq!(q.dropped(), 1);
        assert_eq!(q.len(), QUEUE_SLOTS);
    }

    #[test]
    fn oversized_packet_is_dropped() {
        let mut q = PendingPacketQueue::new();
        let big = vec![0u8; MAX_PACKET_BYTES + 1];
        assert!(!q.push(1, &big));
        assert_eq!(q.dropped(), 1);
    }

    #[test]
    fn drains_in_fifo_order() {
        let mut q = PendingPacketQueue::new();
        q.push(1, &[1]);
        q.push(1, &[2]);
        assert_eq!(q.pop().unwrap().bytes, vec![1]);
        assert_eq!(q.pop().unwrap().bytes, vec![2]);
        assert!(q.pop().is_none());
    }
}
