//! Client-side prediction with server reconciliation over a simulated
//! unreliable network.
//!
//! The local actor moves with zero perceived input lag: every tick the
//! client samples input, applies it immediately, and records both the input
//! and the pre-step state. Reports travel through a lossy, latent link to an
//! authoritative server that replays them tick-by-tick and answers with
//! state snapshots. When a snapshot disagrees with what the client recorded,
//! the client rewinds to the authoritative state, resimulates forward to the
//! present tick, and hides the resulting pop behind a decaying visual-only
//! offset.
//!
//! Everything is single-threaded and tick-driven; "network delay" is a
//! comparison against simulated time, never an actual wait.

pub mod client;
pub mod clock;
pub mod history;
pub mod input;
pub mod movement;
pub mod netsim;
pub mod server;

pub use client::ClientSim;
pub use clock::{FixedTimestep, TICK_DT, TICK_RATE};
pub use history::{ClientState, DEFAULT_HISTORY_CAPACITY, HistoryBuffer, HistoryError};
pub use input::{InputSource, ScriptedInput};
pub use netsim::NetSim;
pub use server::ServerSim;
