//! Contention-free data channel.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use raloha_core::cast;
use raloha_core::context::SimulationContext;
use raloha_core::event::Event;
use raloha_core::handler::EventHandler;
use raloha_core::log_debug;

use crate::channel::{Channel, ChannelState};
use crate::events::DataTransmissionEnd;
use crate::packet::{Packet, PacketStatus};
use crate::stats::Stats;

/// The second-stage data channel.
///
/// A single system-wide FIFO of data-stage packets released by successful
/// reservations, serialized over one shared channel. There is no contention:
/// the reservation stage guarantees exclusivity, so every busy period of the
/// underlying channel is a success. When a backlog exists, the next packet
/// starts at the same simulated time the previous one ended.
pub struct DataLink {
    queue: VecDeque<Packet>,
    channel: Channel,
    stats: Rc<RefCell<Stats>>,
    ctx: SimulationContext,
}

impl DataLink {
    /// Creates an idle data link.
    pub fn new(stats: Rc<RefCell<Stats>>, ctx: SimulationContext) -> Self {
        Self {
            queue: VecDeque::new(),
            channel: Channel::new(),
            stats,
            ctx,
        }
    }

    /// Returns the number of queued packets, including the one being
    /// transmitted.
    pub fn queued_packets(&self) -> usize {
        self.queue.len()
    }

    /// Returns the state of the underlying channel.
    pub fn channel_state(&self) -> ChannelState {
        self.channel.state()
    }

    /// Accepts a data-stage packet released by a successful reservation.
    ///
    /// The packet enters service immediately if it is the only queued packet.
    pub fn submit(&mut self, packet: Packet) {
        self.queue.push_back(packet);
        if self.queue.len() == 1 {
            self.start_next();
        }
    }

    fn start_next(&mut self) {
        self.channel.begin_transmission();
        let head = self.queue.front_mut().unwrap();
        head.status = PacketStatus::Transmitting;
        self.ctx.emit_self(DataTransmissionEnd {}, head.service_time);
    }

    fn on_transmission_end(&mut self) {
        let outcome = self.channel.end_transmission();
        debug_assert_eq!(outcome, ChannelState::Success);
        let packet = self.queue.pop_front().unwrap();
        log_debug!(
            self.ctx,
            "data transmission completed for station {}",
            packet.station_id
        );
        self.stats
            .borrow_mut()
            .record_data_processed(packet.station_id, self.ctx.time() - packet.arrive_time);
        // the packet is dropped here; zero inter-departure gap under backlog
        if !self.queue.is_empty() {
            self.start_next();
        }
    }
}

impl EventHandler for DataLink {
    fn on(&mut self, event: Event) {
        cast!(match event.data {
            DataTransmissionEnd {} => {
                self.on_transmission_end();
            }
        })
    }
}
