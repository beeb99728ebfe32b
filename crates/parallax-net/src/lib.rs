//! Simulated networking: message types and an unreliable in-process link.
//!
//! There is no wire protocol here. The link carries message *values* between
//! the client and server halves of the simulation, modeling packet loss and
//! latency deterministically from a seeded RNG. Loss is decided before a
//! message is enqueued; once enqueued, delivery is guaranteed and strictly
//! FIFO.

pub mod channel;
pub mod messages;

pub use channel::{SimulatedLink, Timed};
pub use messages::{InputMessage, StateMessage, TickInput, UserInput, ViewFrame};
