//! Packets flowing through the protocol pipeline.

use serde::Serialize;

/// Transmission status of a packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PacketStatus {
    /// The packet sits in a queue waiting for its transmission to start.
    Waiting,
    /// The packet is being transmitted or processed by a resource.
    Transmitting,
}

/// One unit of traffic.
///
/// A packet is owned by exactly one queue or one in-service slot at a time;
/// moving it between the station buffer, the data queue and the server is a
/// transfer by value. Events never own a live packet, they refer to it
/// indirectly through the resource that holds it.
///
/// A reservation-stage packet is created on a synthetic arrival and destroyed
/// when the cloud server finishes processing it. A data-stage packet is
/// spawned on a successful reservation and destroyed when its data-link
/// transmission ends.
#[derive(Clone, Debug, Serialize)]
pub struct Packet {
    /// Index of the originating station.
    pub station_id: usize,
    /// Simulation time at which the packet was created.
    pub arrive_time: f64,
    /// Transmission duration on the reservation channel (unused for
    /// data-stage packets).
    pub upload_time: f64,
    /// Service duration at the downstream resource: cloud-server processing
    /// for reservation-stage packets, data-link transmission for data-stage
    /// packets.
    pub service_time: f64,
    /// Current transmission status.
    pub status: PacketStatus,
    /// Number of reservation collisions suffered so far.
    pub collision_count: u64,
}

impl Packet {
    /// Creates a reservation-stage packet.
    pub fn new(station_id: usize, arrive_time: f64, upload_time: f64, service_time: f64) -> Self {
        Self {
            station_id,
            arrive_time,
            upload_time,
            service_time,
            status: PacketStatus::Waiting,
            collision_count: 0,
        }
    }

    /// Spawns a data-stage packet released by a successful reservation.
    pub fn data(station_id: usize, arrive_time: f64, service_time: f64) -> Self {
        Self::new(station_id, arrive_time, 0., service_time)
    }
}
