use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use raloha_core::{cast, Event, EventHandler, Simulation};

#[derive(Clone, Serialize)]
struct TaggedEvent {
    tag: u64,
}

struct Recorder {
    received: Rc<RefCell<Vec<(f64, u64)>>>,
}

impl EventHandler for Recorder {
    fn on(&mut self, event: Event) {
        let time = event.time;
        cast!(match event.data {
            TaggedEvent { tag } => {
                self.received.borrow_mut().push((time, tag));
            }
        })
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn make_recorder(sim: &mut Simulation, name: &str) -> Rc<RefCell<Vec<(f64, u64)>>> {
    let received = Rc::new(RefCell::new(Vec::new()));
    let recorder = Rc::new(RefCell::new(Recorder {
        received: received.clone(),
    }));
    sim.add_handler(name, recorder);
    received
}

#[test]
fn simultaneous_events_are_dispatched_in_scheduling_order() {
    init_logger();
    let mut sim = Simulation::new(123);
    let received = make_recorder(&mut sim, "recorder");
    let recorder_id = sim.lookup_id("recorder");
    let ctx = sim.create_context("source");

    for tag in 0..10 {
        ctx.emit(TaggedEvent { tag }, recorder_id, 5.0);
    }
    // an earlier event scheduled later must still fire first
    ctx.emit(TaggedEvent { tag: 100 }, recorder_id, 1.0);
    sim.step_until_no_events();

    let tags: Vec<u64> = received.borrow().iter().map(|(_, tag)| *tag).collect();
    assert_eq!(tags, vec![100, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn dispatch_times_are_monotonic() {
    init_logger();
    let mut sim = Simulation::new(42);
    let received = make_recorder(&mut sim, "recorder");
    let recorder_id = sim.lookup_id("recorder");
    let ctx = sim.create_context("source");

    for tag in 0..1000 {
        let delay = ctx.gen_range(0.0..100.0);
        ctx.emit(TaggedEvent { tag }, recorder_id, delay);
    }
    sim.step_until_no_events();

    let received = received.borrow();
    assert_eq!(received.len(), 1000);
    for pair in received.windows(2) {
        assert!(pair[0].0 <= pair[1].0);
    }
    assert_eq!(sim.time(), received.last().unwrap().0);
}

#[test]
fn each_event_is_dispatched_exactly_once() {
    init_logger();
    let mut sim = Simulation::new(1);
    let received = make_recorder(&mut sim, "recorder");
    let recorder_id = sim.lookup_id("recorder");
    let ctx = sim.create_context("source");

    for tag in 0..100 {
        ctx.emit(TaggedEvent { tag }, recorder_id, tag as f64 * 0.1);
    }
    sim.step_until_no_events();
    assert!(!sim.step());

    let mut tags: Vec<u64> = received.borrow().iter().map(|(_, tag)| *tag).collect();
    tags.sort_unstable();
    assert_eq!(tags, (0..100).collect::<Vec<u64>>());
}

#[test]
#[should_panic(expected = "Event delay is negative")]
fn scheduling_event_in_the_past_panics() {
    init_logger();
    let mut sim = Simulation::new(7);
    let ctx = sim.create_context("comp");
    ctx.emit_self(TaggedEvent { tag: 0 }, -1.0);
}

#[test]
fn rng_is_deterministic_for_fixed_seed() {
    init_logger();
    let mut sim1 = Simulation::new(400072132);
    let mut sim2 = Simulation::new(400072132);
    for _ in 0..100 {
        assert_eq!(sim1.rand(), sim2.rand());
        assert_eq!(sim1.gen_range(0..1000), sim2.gen_range(0..1000));
    }
}

#[test]
fn step_until_stops_on_condition() {
    init_logger();
    let mut sim = Simulation::new(5);
    let received = make_recorder(&mut sim, "recorder");
    let recorder_id = sim.lookup_id("recorder");
    let ctx = sim.create_context("source");

    for tag in 0..10 {
        ctx.emit(TaggedEvent { tag }, recorder_id, tag as f64);
    }
    let reached = sim.step_until(|_| received.borrow().len() >= 4);
    assert!(reached);
    assert_eq!(received.borrow().len(), 4);
    assert_eq!(sim.time(), 3.0);

    // condition never holds, simulation drains instead
    let reached = sim.step_until(|_| false);
    assert!(!reached);
    assert_eq!(received.borrow().len(), 10);
}

#[test]
fn steps_dispatches_a_bounded_number_of_events() {
    init_logger();
    let mut sim = Simulation::new(9);
    let received = make_recorder(&mut sim, "recorder");
    let recorder_id = sim.lookup_id("recorder");
    let ctx = sim.create_context("source");

    for tag in 0..5 {
        ctx.emit(TaggedEvent { tag }, recorder_id, tag as f64);
    }
    assert!(sim.steps(3));
    assert_eq!(received.borrow().len(), 3);
    assert_eq!(sim.time(), 2.0);

    // the queue drains before the requested count is exhausted
    assert!(!sim.steps(10));
    assert_eq!(received.borrow().len(), 5);
}

#[test]
fn emit_now_dispatches_at_the_current_time() {
    init_logger();
    let mut sim = Simulation::new(3);
    let received = make_recorder(&mut sim, "recorder");
    let recorder_id = sim.lookup_id("recorder");
    let ctx = sim.create_context("source");

    ctx.emit(TaggedEvent { tag: 1 }, recorder_id, 2.5);
    sim.step_until_no_events();
    assert_eq!(sim.time(), 2.5);

    ctx.emit_now(TaggedEvent { tag: 2 }, recorder_id);
    assert!(sim.step());
    assert_eq!(sim.time(), 2.5);
    assert_eq!(*received.borrow(), vec![(2.5, 1), (2.5, 2)]);
}
