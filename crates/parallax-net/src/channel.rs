//! The simulated unreliable link: loss before enqueue, latency via delivery
//! timestamps, strict FIFO consumption.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::trace;

/// A message that knows when it becomes consumable.
pub trait Timed {
    /// Simulated time at which the message may be consumed.
    fn delivery_time(&self) -> f64;
}

/// One direction of the simulated network.
///
/// Loss is a single RNG draw taken *before* a message is constructed; a
/// message that survives the draw is guaranteed eventual delivery. The queue
/// is consumed strictly head-first: a later message is never delivered ahead
/// of an earlier one, even if its delivery time elapsed sooner.
pub struct SimulatedLink<M> {
    queue: VecDeque<M>,
    rng: Xoshiro256PlusPlus,
}

impl<M: Timed> SimulatedLink<M> {
    /// Creates a link whose loss draws come from the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            queue: VecDeque::new(),
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Samples loss with probability `loss`; on survival, constructs the
    /// message via `make` and enqueues it. Returns `true` if enqueued.
    ///
    /// The constructor runs only for surviving messages, mirroring a sender
    /// that decides to transmit before serializing anything.
    pub fn send_with(&mut self, loss: f32, make: impl FnOnce() -> M) -> bool {
        if self.rng.random::<f32>() >= loss {
            self.queue.push_back(make());
            true
        } else {
            trace!("message lost before enqueue");
            false
        }
    }

    /// Pops the head message if its delivery time has been reached.
    pub fn recv(&mut self, now: f64) -> Option<M> {
        if self
            .queue
            .front()
            .is_some_and(|message| now >= message.delivery_time())
        {
            self.queue.pop_front()
        } else {
            None
        }
    }

    /// Drains every currently consumable message and keeps only the last.
    ///
    /// Older consumable messages are discarded unread; the freshest one wins.
    pub fn recv_latest(&mut self, now: f64) -> Option<M> {
        let mut latest = None;
        let mut discarded = 0usize;
        while let Some(message) = self.recv(now) {
            if latest.is_some() {
                discarded += 1;
            }
            latest = Some(message);
        }
        if discarded > 0 {
            trace!(discarded, "superseded messages dropped unread");
        }
        latest
    }

    /// Number of messages currently in flight.
    pub fn in_flight(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
