//! Protocol simulation assembly and execution.

use std::cell::RefCell;
use std::rc::Rc;

use sugars::{rc, refcell};

use raloha_core::simulation::Simulation;

use crate::channel::Channel;
use crate::config::SimulationConfig;
use crate::data_link::DataLink;
use crate::generator::TrafficSource;
use crate::packet::Packet;
use crate::server::CloudServer;
use crate::station::Station;
use crate::stats::Stats;

/// Wires the protocol components together and drives the run.
///
/// All components share a single sequential event queue; the protocol
/// resources (reservation channel, data link, cloud server) are shared
/// between stations through the simulation context graph, never through
/// globals.
pub struct AlohaSimulation {
    sim: Simulation,
    config: SimulationConfig,
    channel: Rc<RefCell<Channel>>,
    stations: Vec<Rc<RefCell<Station>>>,
    data_link: Rc<RefCell<DataLink>>,
    server: Rc<RefCell<CloudServer>>,
    source: Rc<RefCell<TrafficSource>>,
    stats: Rc<RefCell<Stats>>,
    started: bool,
}

impl AlohaSimulation {
    /// Builds a simulation from the given configuration.
    pub fn new(config: SimulationConfig) -> Self {
        let mut sim = Simulation::new(config.seed);
        let stats = rc!(refcell!(Stats::new(&config)));
        let channel = rc!(refcell!(Channel::new()));

        let data_link = rc!(refcell!(DataLink::new(
            stats.clone(),
            sim.create_context("data-link")
        )));
        sim.add_handler("data-link", data_link.clone());

        let server = rc!(refcell!(CloudServer::new(
            stats.clone(),
            sim.create_context("cloud-server")
        )));
        sim.add_handler("cloud-server", server.clone());

        let mut stations = Vec::with_capacity(config.station_count);
        for i in 0..config.station_count {
            let name = format!("station-{}", i);
            let station = rc!(refcell!(Station::new(
                i,
                channel.clone(),
                data_link.clone(),
                server.clone(),
                stats.clone(),
                &config,
                sim.create_context(&name),
            )));
            sim.add_handler(&name, station.clone());
            stations.push(station);
        }

        let source = rc!(refcell!(TrafficSource::new(
            stations.clone(),
            stats.clone(),
            &config,
            sim.create_context("traffic-source"),
        )));
        sim.add_handler("traffic-source", source.clone());

        Self {
            sim,
            config,
            channel,
            stations,
            data_link,
            server,
            source,
            stats,
            started: false,
        }
    }

    /// Runs the simulation with synthetic traffic until the configured number
    /// of packets has been processed by the cloud server.
    ///
    /// The termination condition is polled after every dispatched event.
    /// Returns `true` if the target was reached.
    pub fn run(&mut self) -> bool {
        if !self.started {
            self.source.borrow().activate();
            self.started = true;
        }
        let stats = self.stats.clone();
        let target = self.config.run_length;
        self.sim
            .step_until(move |_| stats.borrow().packets_processed() >= target)
    }

    /// Steps through the simulation until no pending events are left.
    ///
    /// Useful for draining manually injected scenarios; with the synthetic
    /// traffic source active the event queue never empties.
    pub fn run_until_no_events(&mut self) {
        self.sim.step_until_no_events();
    }

    /// Injects a packet arrival at the given station at the current time,
    /// bypassing the synthetic traffic source.
    ///
    /// This allows driving scenarios with fixed transmission and service
    /// durations.
    pub fn inject_arrival(&mut self, station: usize, upload_time: f64, service_time: f64) {
        let packet = Packet::new(station, self.sim.time(), upload_time, service_time);
        self.stats.borrow_mut().record_arrival(station);
        self.stations[station].borrow_mut().arrival(packet);
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> f64 {
        self.sim.time()
    }

    /// Returns the total number of created events.
    pub fn event_count(&self) -> u64 {
        self.sim.event_count()
    }

    /// Returns a snapshot of the accumulated statistics.
    pub fn stats(&self) -> Stats {
        self.stats.borrow().clone()
    }

    /// Returns the simulation configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns the shared reservation channel.
    pub fn channel(&self) -> Rc<RefCell<Channel>> {
        self.channel.clone()
    }

    /// Returns the stations.
    pub fn stations(&self) -> &[Rc<RefCell<Station>>] {
        &self.stations
    }

    /// Returns the data link.
    pub fn data_link(&self) -> Rc<RefCell<DataLink>> {
        self.data_link.clone()
    }

    /// Returns the cloud server.
    pub fn server(&self) -> Rc<RefCell<CloudServer>> {
        self.server.clone()
    }
}
