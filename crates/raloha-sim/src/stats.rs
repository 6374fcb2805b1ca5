//! Statistics accumulation and reporting.

use std::io::Write;

use serde::Serialize;

use crate::config::SimulationConfig;

/// Per-station counters.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StationStats {
    /// Packets arrived at this station.
    pub arrival_count: u64,
    /// Packets that completed a successful reservation.
    pub packets_transmitted: u64,
    /// Packets processed by the cloud server.
    pub packets_processed: u64,
    /// Collisions charged to this station's completed reservations.
    pub number_of_collisions: u64,
    /// Total arrival-to-processing delay of this station's packets.
    pub accumulated_delay: f64,
}

/// Run-wide statistics accumulator.
///
/// Counters are updated synchronously from the event handlers at well-defined
/// transition points and are never read back by the protocol logic. Collision
/// charging follows the per-completed-attempt rule: the run-wide and
/// per-station collision counters are charged from the packet's accumulated
/// retry count when its reservation finally succeeds, while
/// [`record_collision`](Stats::record_collision) separately counts the
/// collided attempts as they happen.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Stats {
    random_seed: u64,
    run_length: u64,
    blip_rate: u64,
    #[serde(skip)]
    blip_counter: u64,

    arrival_count: u64,
    packets_transmitted: u64,
    packets_processed: u64,
    number_of_collisions: u64,
    collision_events: u64,
    accumulated_delay: f64,
    accumulated_reservation_delay: f64,

    data_packets_processed: u64,
    accumulated_data_delay: f64,

    stations: Vec<StationStats>,
}

impl Stats {
    /// Creates a zeroed accumulator for the given configuration.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            random_seed: config.seed,
            run_length: config.run_length,
            blip_rate: config.blip_rate,
            blip_counter: 0,
            arrival_count: 0,
            packets_transmitted: 0,
            packets_processed: 0,
            number_of_collisions: 0,
            collision_events: 0,
            accumulated_delay: 0.,
            accumulated_reservation_delay: 0.,
            data_packets_processed: 0,
            accumulated_data_delay: 0.,
            stations: vec![StationStats::default(); config.station_count],
        }
    }

    /// Records a synthetic packet arrival at the given station.
    pub fn record_arrival(&mut self, station: usize) {
        self.arrival_count += 1;
        self.stations[station].arrival_count += 1;
    }

    /// Records a reservation attempt that ended in a collision.
    pub fn record_collision(&mut self, _station: usize) {
        self.collision_events += 1;
    }

    /// Records a completed reservation, charging the collisions accumulated
    /// over the packet's attempts.
    pub fn record_success(&mut self, station: usize, delay: f64, collisions: u64) {
        self.packets_transmitted += 1;
        self.number_of_collisions += collisions;
        self.accumulated_reservation_delay += delay;
        self.stations[station].packets_transmitted += 1;
        self.stations[station].number_of_collisions += collisions;
        self.blip();
    }

    /// Records the completion of cloud-server processing.
    pub fn record_processed(&mut self, station: usize, delay: f64) {
        self.packets_processed += 1;
        self.accumulated_delay += delay;
        self.stations[station].packets_processed += 1;
        self.stations[station].accumulated_delay += delay;
        self.blip();
    }

    /// Records the completion of a data-link transmission.
    pub fn record_data_processed(&mut self, _station: usize, delay: f64) {
        self.data_packets_processed += 1;
        self.accumulated_data_delay += delay;
    }

    /// Outputs an activity blip to the screen every so often.
    fn blip(&mut self) {
        self.blip_counter += 1;
        if self.blip_counter >= self.blip_rate || self.packets_processed >= self.run_length {
            self.blip_counter = 0;
            let percentage_done = 100. * self.packets_processed as f64 / self.run_length as f64;
            print!(
                "{:3.0}% Successfully Xmtted Pkts = {} (Arrived Pkts = {}) \r",
                percentage_done, self.packets_processed, self.arrival_count
            );
            std::io::stdout().flush().ok();
        }
    }

    /// Total number of packet arrivals.
    pub fn arrival_count(&self) -> u64 {
        self.arrival_count
    }

    /// Number of completed reservations.
    pub fn packets_transmitted(&self) -> u64 {
        self.packets_transmitted
    }

    /// Number of packets processed by the cloud server.
    pub fn packets_processed(&self) -> u64 {
        self.packets_processed
    }

    /// Collisions charged to completed reservations.
    pub fn number_of_collisions(&self) -> u64 {
        self.number_of_collisions
    }

    /// Number of reservation attempts that ended in a collision.
    pub fn collision_events(&self) -> u64 {
        self.collision_events
    }

    /// Total arrival-to-processing delay.
    pub fn accumulated_delay(&self) -> f64 {
        self.accumulated_delay
    }

    /// Total arrival-to-reservation delay.
    pub fn accumulated_reservation_delay(&self) -> f64 {
        self.accumulated_reservation_delay
    }

    /// Number of completed data-link transmissions.
    pub fn data_packets_processed(&self) -> u64 {
        self.data_packets_processed
    }

    /// Total delay of data-stage packets.
    pub fn accumulated_data_delay(&self) -> f64 {
        self.accumulated_data_delay
    }

    /// Per-station counters.
    pub fn stations(&self) -> &[StationStats] {
        &self.stations
    }

    /// Prints the end-of-run report.
    ///
    /// Mean values with a zero denominator are reported as `undefined`
    /// instead of being propagated as an error.
    pub fn print_summary(&self) {
        println!();
        println!("Random Seed = {}", self.random_seed);
        println!("Pkt Arrivals = {}", self.arrival_count);
        println!("Pkt Transmits = {}", self.packets_transmitted);
        println!("Pkt Processed = {}", self.packets_processed);
        println!("Pkt Collisions = {}", self.number_of_collisions);

        if self.arrival_count > 0 {
            println!(
                "Xmtted Pkts = {} (Service Fraction = {:.5})",
                self.packets_processed,
                self.packets_processed as f64 / self.arrival_count as f64
            );
        } else {
            println!("Xmtted Pkts = 0 (Service Fraction = undefined)");
        }
        if self.packets_processed > 0 {
            println!(
                "Mean Delay = {:.1}",
                self.accumulated_delay / self.packets_processed as f64
            );
            println!(
                "Mean collisions per packet = {:.3}",
                self.number_of_collisions as f64 / self.packets_processed as f64
            );
        } else {
            println!("Mean Delay = undefined");
            println!("Mean collisions per packet = undefined");
        }
        if self.data_packets_processed > 0 {
            println!(
                "Data Pkts = {} (Mean Data Delay = {:.1})",
                self.data_packets_processed,
                self.accumulated_data_delay / self.data_packets_processed as f64
            );
        } else {
            println!("Data Pkts = 0 (Mean Data Delay = undefined)");
        }

        for (i, station) in self.stations.iter().enumerate() {
            println!("Station {:2} Pkt Arrivals = {}", i, station.arrival_count);
            println!("Station {:2} Pkt Transmitted = {}", i, station.packets_transmitted);
            println!("Station {:2} Pkt Processed = {}", i, station.packets_processed);
            println!("Station {:2} Pkt Collisions = {}", i, station.number_of_collisions);
            println!("Station {:2} Accumulated Delay = {:8.1}", i, station.accumulated_delay);
            if station.packets_processed > 0 {
                println!(
                    "Station {:2} Mean Delay = {:8.1}",
                    i,
                    station.accumulated_delay / station.packets_processed as f64
                );
            } else {
                println!("Station {:2} Mean Delay = undefined", i);
            }
        }
        println!();
    }
}
