//! Event payloads exchanged by the simulation components.
//!
//! All events are self-events: each component schedules the completion of its
//! own activities, and packet handoffs between resources happen synchronously
//! inside handlers. Events carry no packet data; the packet a handler acts on
//! is determined by the state of the resource (e.g. the head of the station
//! buffer), so a superseded event is simply detected from that state.

use serde::Serialize;

/// Next synthetic packet arrival at the traffic source.
#[derive(Clone, Serialize)]
pub struct PacketArrival {}

/// Start of a reservation-channel transmission at a station.
#[derive(Clone, Serialize)]
pub struct TransmissionStart {}

/// End of a reservation-channel transmission at a station.
#[derive(Clone, Serialize)]
pub struct TransmissionEnd {}

/// End of the data-link transmission of the current head packet.
#[derive(Clone, Serialize)]
pub struct DataTransmissionEnd {}

/// End of the cloud-server processing of the current packet.
#[derive(Clone, Serialize)]
pub struct ProcessingEnd {}
