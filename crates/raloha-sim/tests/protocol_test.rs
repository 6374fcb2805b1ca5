use sugars::{rc, refcell};

use raloha_core::Simulation;
use raloha_sim::channel::ChannelState;
use raloha_sim::data_link::DataLink;
use raloha_sim::packet::Packet;
use raloha_sim::server::CloudServer;
use raloha_sim::stats::Stats;
use raloha_sim::{AlohaSimulation, SimulationConfig};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_config(station_count: usize, run_length: u64, seed: u64) -> SimulationConfig {
    SimulationConfig {
        station_count,
        run_length,
        blip_rate: u64::MAX,
        seed,
        ..Default::default()
    }
}

#[test]
fn identical_seeds_produce_identical_counters() {
    init_logger();
    let config = test_config(3, 2000, 42);
    let mut sim1 = AlohaSimulation::new(config.clone());
    let mut sim2 = AlohaSimulation::new(config.clone());
    assert!(sim1.run());
    assert!(sim2.run());
    assert_eq!(sim1.stats(), sim2.stats());
    assert_eq!(sim1.time(), sim2.time());
    assert_eq!(sim1.event_count(), sim2.event_count());

    let mut sim3 = AlohaSimulation::new(SimulationConfig {
        seed: 43,
        ..config
    });
    assert!(sim3.run());
    assert_ne!(sim1.stats(), sim3.stats());
}

#[test]
fn no_packet_is_lost_or_duplicated() {
    init_logger();
    let mut sim = AlohaSimulation::new(test_config(4, 500, 7));
    assert!(sim.run());
    let stats = sim.stats();
    assert_eq!(stats.packets_processed(), 500);

    // stations are wired in index order and the per-station counters add up
    for (i, station) in sim.stations().iter().enumerate() {
        assert_eq!(station.borrow().index(), i);
    }
    let per_station_arrivals: u64 = stats.stations().iter().map(|s| s.arrival_count).sum();
    assert_eq!(stats.arrival_count(), per_station_arrivals);

    let buffered: u64 = sim
        .stations()
        .iter()
        .map(|s| s.borrow().buffered_packets() as u64)
        .sum();
    let server = sim.server();
    let server = server.borrow();
    let at_server = server.queued_packets() as u64 + server.is_busy() as u64;

    // every arrival is either processed or resident in exactly one place
    assert_eq!(
        stats.arrival_count(),
        stats.packets_processed() + buffered + at_server
    );
    // every successful reservation went to the server and nowhere else
    assert_eq!(
        stats.packets_transmitted(),
        stats.packets_processed() + at_server
    );
    // every successful reservation spawned exactly one data-stage packet
    let data_link = sim.data_link();
    assert_eq!(
        stats.packets_transmitted(),
        stats.data_packets_processed() + data_link.borrow().queued_packets() as u64
    );

    // channel state is consistent at a rest point
    let channel = sim.channel();
    let channel = channel.borrow();
    assert_eq!(channel.is_idle(), channel.transmitting_count() == 0);
    // the overflow queue may be non-empty only while the server is busy
    assert!(server.queued_packets() == 0 || server.is_busy());
}

#[test]
fn lone_station_transmits_without_collisions() {
    init_logger();
    let config = test_config(1, 10, 123);
    let guard_time = config.guard_time;
    let mut sim = AlohaSimulation::new(config);
    sim.inject_arrival(0, 2.0, 3.0);
    sim.run_until_no_events();

    let stats = sim.stats();
    assert_eq!(stats.arrival_count(), 1);
    assert_eq!(stats.packets_transmitted(), 1);
    assert_eq!(stats.packets_processed(), 1);
    assert_eq!(stats.number_of_collisions(), 0);
    assert_eq!(stats.collision_events(), 0);
    // the packet reserves in one attempt and enters service immediately
    let expected_delay = 2.0 + guard_time + 3.0;
    assert!((stats.accumulated_delay() - expected_delay).abs() < 1e-9);
    assert!((stats.accumulated_reservation_delay() - (2.0 + guard_time)).abs() < 1e-9);
    assert_eq!(stats.data_packets_processed(), 1);
    assert!(!sim.server().borrow().is_busy());
    assert_eq!(sim.stations()[0].borrow().buffered_packets(), 0);
}

#[test]
fn station_buffer_is_served_in_fifo_order() {
    init_logger();
    let config = test_config(1, 10, 5);
    let guard_time = config.guard_time;
    let mut sim = AlohaSimulation::new(config);
    // the first packet needs a long service, the second a short one; FIFO
    // order forces the second to wait in the server overflow queue
    sim.inject_arrival(0, 1.0, 10.0);
    sim.inject_arrival(0, 1.0, 0.5);
    sim.run_until_no_events();

    let stats = sim.stats();
    assert_eq!(stats.packets_transmitted(), 2);
    assert_eq!(stats.packets_processed(), 2);
    assert_eq!(stats.number_of_collisions(), 0);
    // reservation 1: [0, 1 + g], reservation 2: [1 + 2g, 2 + 3g];
    // service 1 ends at 11 + g, service 2 at 11.5 + g
    let first_delay = 1.0 + guard_time + 10.0;
    let second_delay = first_delay + 0.5;
    let expected = first_delay + second_delay;
    assert!((stats.stations()[0].accumulated_delay - expected).abs() < 1e-9);
}

#[test]
fn two_stations_collide_then_both_succeed() {
    init_logger();
    let mut sim = AlohaSimulation::new(test_config(2, 10, 1));
    sim.inject_arrival(0, 2.0, 1.0);
    sim.inject_arrival(1, 2.0, 1.0);
    sim.run_until_no_events();

    let stats = sim.stats();
    // both first attempts overlap the same busy interval and each counts a
    // collision for its attempt
    assert!(stats.collision_events() >= 2);
    assert!(stats.number_of_collisions() >= 2);
    assert_eq!(stats.packets_transmitted(), 2);
    assert_eq!(stats.packets_processed(), 2);
    for station in stats.stations() {
        assert_eq!(station.packets_transmitted, 1);
        assert!(station.number_of_collisions >= 1);
    }
    // collisions charged at success match the per-station sums
    let charged: u64 = stats.stations().iter().map(|s| s.number_of_collisions).sum();
    assert_eq!(stats.number_of_collisions(), charged);

    // the medium drained back to idle before each retry window reopened
    let channel = sim.channel();
    assert!(channel.borrow().is_idle());
    assert_eq!(channel.borrow().transmitting_count(), 0);
}

#[test]
fn overflowed_server_processes_in_arrival_order_without_gaps() {
    init_logger();
    let config = test_config(3, 1000, 16);
    let mut sim = Simulation::new(config.seed);
    let stats = rc!(refcell!(Stats::new(&config)));
    let server = rc!(refcell!(CloudServer::new(
        stats.clone(),
        sim.create_context("cloud-server")
    )));
    sim.add_handler("cloud-server", server.clone());

    // three packets arrive back-to-back, faster than one service time apart
    {
        let mut server = server.borrow_mut();
        for (station, service_time) in [(0, 5.0), (1, 3.0), (2, 1.0)] {
            let packet = Packet::new(station, 0.0, 0.0, service_time);
            if server.is_busy() {
                server.enqueue(packet);
            } else {
                server.start_processing(packet);
            }
        }
        assert!(server.is_busy());
        assert_eq!(server.queued_packets(), 2);
    }
    sim.step_until_no_events();

    // strict arrival order with zero gaps: completions at 5, 8 and 9
    assert_eq!(sim.time(), 9.0);
    let stats = stats.borrow();
    assert_eq!(stats.packets_processed(), 3);
    for (station, expected_delay) in [(0, 5.0), (1, 8.0), (2, 9.0)] {
        assert_eq!(stats.stations()[station].packets_processed, 1);
        assert!((stats.stations()[station].accumulated_delay - expected_delay).abs() < 1e-9);
    }
    assert!(!server.borrow().is_busy());
    assert_eq!(server.borrow().queued_packets(), 0);
}

#[test]
fn data_link_serves_backlog_without_gaps() {
    init_logger();
    let config = test_config(3, 1000, 1);
    let mut sim = Simulation::new(config.seed);
    let stats = rc!(refcell!(Stats::new(&config)));
    let data_link = rc!(refcell!(DataLink::new(
        stats.clone(),
        sim.create_context("data-link")
    )));
    sim.add_handler("data-link", data_link.clone());

    {
        let mut link = data_link.borrow_mut();
        link.submit(Packet::data(0, 0.0, 1.0));
        link.submit(Packet::data(1, 0.0, 2.0));
        link.submit(Packet::data(2, 0.0, 3.0));
        assert_eq!(link.queued_packets(), 3);
        assert_eq!(link.channel_state(), ChannelState::Success);
    }
    sim.step_until_no_events();

    // FIFO completions at 1, 3 and 6 with no inter-departure gap
    assert_eq!(sim.time(), 6.0);
    let stats = stats.borrow();
    assert_eq!(stats.data_packets_processed(), 3);
    assert!((stats.accumulated_data_delay() - 10.0).abs() < 1e-9);
    assert_eq!(data_link.borrow().queued_packets(), 0);
    assert_eq!(data_link.borrow().channel_state(), ChannelState::Idle);
}
