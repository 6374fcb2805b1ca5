//! Synthetic traffic source.

use std::cell::RefCell;
use std::rc::Rc;

use rand_distr::Exp;

use raloha_core::cast;
use raloha_core::context::SimulationContext;
use raloha_core::event::Event;
use raloha_core::handler::EventHandler;
use raloha_core::log_trace;

use crate::config::SimulationConfig;
use crate::events::PacketArrival;
use crate::packet::Packet;
use crate::station::Station;
use crate::stats::Stats;

/// Generates the synthetic packet arrival process.
///
/// Inter-arrival times are exponentially distributed with the configured
/// aggregate rate; each packet is assigned to a uniformly random station and
/// its reservation and service durations are drawn once at creation.
pub struct TrafficSource {
    stations: Vec<Rc<RefCell<Station>>>,
    stats: Rc<RefCell<Stats>>,
    interarrival: Exp<f64>,
    reservation_duration: Exp<f64>,
    service_duration: Exp<f64>,
    ctx: SimulationContext,
}

impl TrafficSource {
    /// Creates a traffic source feeding the given stations.
    pub fn new(
        stations: Vec<Rc<RefCell<Station>>>,
        stats: Rc<RefCell<Stats>>,
        config: &SimulationConfig,
        ctx: SimulationContext,
    ) -> Self {
        Self {
            stations,
            stats,
            interarrival: Exp::new(config.arrival_rate).unwrap(),
            reservation_duration: Exp::new(1. / config.mean_reservation_duration).unwrap(),
            service_duration: Exp::new(1. / config.mean_service_duration).unwrap(),
            ctx,
        }
    }

    /// Schedules the first arrival.
    pub fn activate(&self) {
        let delay = self.ctx.sample_from_distribution(&self.interarrival);
        self.ctx.emit_self(PacketArrival {}, delay);
    }

    fn on_arrival(&mut self) {
        let station = self.ctx.gen_range(0..self.stations.len());
        let packet = Packet::new(
            station,
            self.ctx.time(),
            self.ctx.sample_from_distribution(&self.reservation_duration),
            self.ctx.sample_from_distribution(&self.service_duration),
        );
        log_trace!(self.ctx, "new packet for station {}", station);
        self.stats.borrow_mut().record_arrival(station);
        self.stations[station].borrow_mut().arrival(packet);

        let delay = self.ctx.sample_from_distribution(&self.interarrival);
        self.ctx.emit_self(PacketArrival {}, delay);
    }
}

impl EventHandler for TrafficSource {
    fn on(&mut self, event: Event) {
        cast!(match event.data {
            PacketArrival {} => {
                self.on_arrival();
            }
        })
    }
}
