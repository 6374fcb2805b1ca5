//! Simulation parameters.

use serde::{Deserialize, Serialize};

/// Flat record of simulation parameters, consumed once at run start.
///
/// Durations are expressed in normalized packet transmit times. The defaults
/// reproduce the reference configuration of the protocol study: two stations,
/// aggregate arrival rate of 2 packets per transmit time, mean backoff of 10
/// transmit times and a run of 700 000 processed packets.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of stations contending for the reservation channel.
    pub station_count: usize,
    /// Mean duration of a reservation-channel transmission (Xr).
    pub mean_reservation_duration: f64,
    /// Mean duration of a data-channel transmission (X).
    pub mean_data_duration: f64,
    /// Mean processing duration at the cloud server.
    pub mean_service_duration: f64,
    /// Aggregate packet arrival rate (packets per transmit time).
    pub arrival_rate: f64,
    /// Mean backoff duration after a collision; the actual backoff is drawn
    /// uniformly on [0, 2 x mean_backoff).
    pub mean_backoff: f64,
    /// Dead interval between a transmission end and the next attempt.
    pub guard_time: f64,
    /// Target run length, in packets processed by the cloud server.
    pub run_length: u64,
    /// Number of processed packets between progress blips.
    pub blip_rate: u64,
    /// Random seed of the run.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            station_count: 2,
            mean_reservation_duration: 2.,
            mean_data_duration: 1.,
            mean_service_duration: 1.,
            arrival_rate: 2.,
            mean_backoff: 10.,
            guard_time: 0.01,
            run_length: 700_000,
            blip_rate: 100_000,
            seed: 400072132,
        }
    }
}
