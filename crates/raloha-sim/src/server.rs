//! Cloud server with overflow queueing.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use raloha_core::cast;
use raloha_core::context::SimulationContext;
use raloha_core::event::Event;
use raloha_core::handler::EventHandler;
use raloha_core::log_debug;

use crate::events::ProcessingEnd;
use crate::packet::{Packet, PacketStatus};
use crate::stats::Stats;

/// Work-conserving single server processing packets that completed a
/// reservation.
///
/// The caller routes a packet either into service (when the server is free)
/// or into the overflow FIFO (when it is busy). On completion the server
/// pulls the next overflow packet and begins its service within the same
/// handler invocation, so at every rest point a non-empty overflow queue
/// implies a busy server.
pub struct CloudServer {
    in_service: Option<Packet>,
    overflow: VecDeque<Packet>,
    stats: Rc<RefCell<Stats>>,
    ctx: SimulationContext,
}

impl CloudServer {
    /// Creates an idle server with an empty overflow queue.
    pub fn new(stats: Rc<RefCell<Stats>>, ctx: SimulationContext) -> Self {
        Self {
            in_service: None,
            overflow: VecDeque::new(),
            stats,
            ctx,
        }
    }

    /// Returns whether a packet is currently in service.
    pub fn is_busy(&self) -> bool {
        self.in_service.is_some()
    }

    /// Returns the number of packets in the overflow queue.
    pub fn queued_packets(&self) -> usize {
        self.overflow.len()
    }

    /// Begins the service of a packet.
    ///
    /// Panics if the server is busy; the caller must check
    /// [`is_busy`](Self::is_busy) and use [`enqueue`](Self::enqueue) instead.
    pub fn start_processing(&mut self, mut packet: Packet) {
        assert!(
            !self.is_busy(),
            "Attempt to start processing on a busy server!"
        );
        packet.status = PacketStatus::Transmitting;
        self.ctx.emit_self(ProcessingEnd {}, packet.service_time);
        self.in_service = Some(packet);
    }

    /// Appends a packet to the overflow FIFO while the server is busy.
    pub fn enqueue(&mut self, packet: Packet) {
        debug_assert!(self.is_busy());
        self.overflow.push_back(packet);
    }

    fn on_processing_end(&mut self) {
        let packet = self.in_service.take().unwrap();
        log_debug!(
            self.ctx,
            "finished processing packet of station {}",
            packet.station_id
        );
        self.stats
            .borrow_mut()
            .record_processed(packet.station_id, self.ctx.time() - packet.arrive_time);
        // the packet is dropped here; the overflow head, if any, must enter
        // service in this same handler invocation to keep the server
        // work-conserving
        if let Some(next) = self.overflow.pop_front() {
            self.start_processing(next);
        }
    }
}

impl EventHandler for CloudServer {
    fn on(&mut self, event: Event) {
        cast!(match event.data {
            ProcessingEnd {} => {
                self.on_processing_end();
            }
        })
    }
}
