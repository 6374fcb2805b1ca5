//! Discrete-event simulation of a two-stage random-access network protocol.
//!
//! Stations contend for a slotted reservation channel (ALOHA-style, with
//! collisions and randomized backoff). A successful reservation releases a
//! data-stage packet onto a contention-free data link and hands the original
//! packet to a single cloud server with an overflow queue. The simulation
//! reproduces, statistically, the throughput, delay and collision behavior of
//! the protocol under a configurable synthetic load.
//!
//! The model is built from components on top of the [`raloha-core`](raloha_core)
//! engine: [`Station`](station::Station), [`DataLink`](data_link::DataLink),
//! [`CloudServer`](server::CloudServer) and [`TrafficSource`](generator::TrafficSource),
//! wired together by [`AlohaSimulation`](simulation::AlohaSimulation).

pub mod channel;
pub mod config;
pub mod data_link;
pub mod events;
pub mod generator;
pub mod packet;
pub mod server;
pub mod simulation;
pub mod station;
pub mod stats;

pub use config::SimulationConfig;
pub use simulation::AlohaSimulation;
