//! Station model with the slotted-ALOHA reservation protocol.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rand_distr::Exp;

use raloha_core::cast;
use raloha_core::context::SimulationContext;
use raloha_core::event::Event;
use raloha_core::handler::EventHandler;
use raloha_core::{log_debug, log_trace};

use crate::channel::{Channel, ChannelState};
use crate::config::SimulationConfig;
use crate::data_link::DataLink;
use crate::events::{TransmissionEnd, TransmissionStart};
use crate::packet::{Packet, PacketStatus};
use crate::server::CloudServer;
use crate::stats::Stats;

/// A station holding a FIFO buffer of packets awaiting reservation.
///
/// The head of the buffer is the packet currently contending for the
/// reservation channel; it stays in the buffer across collided attempts and
/// is removed only when its reservation succeeds. On success the station
/// spawns a data-stage packet onto the data link, routes the reserved packet
/// to the cloud server and enables the next buffered packet after one guard
/// time.
pub struct Station {
    index: usize,
    buffer: VecDeque<Packet>,
    channel: Rc<RefCell<Channel>>,
    data_link: Rc<RefCell<DataLink>>,
    server: Rc<RefCell<CloudServer>>,
    stats: Rc<RefCell<Stats>>,
    data_duration: Exp<f64>,
    mean_backoff: f64,
    guard_time: f64,
    ctx: SimulationContext,
}

impl Station {
    /// Creates a station wired to the shared protocol resources.
    pub fn new(
        index: usize,
        channel: Rc<RefCell<Channel>>,
        data_link: Rc<RefCell<DataLink>>,
        server: Rc<RefCell<CloudServer>>,
        stats: Rc<RefCell<Stats>>,
        config: &SimulationConfig,
        ctx: SimulationContext,
    ) -> Self {
        Self {
            index,
            buffer: VecDeque::new(),
            channel,
            data_link,
            server,
            stats,
            data_duration: Exp::new(1. / config.mean_data_duration).unwrap(),
            mean_backoff: config.mean_backoff,
            guard_time: config.guard_time,
            ctx,
        }
    }

    /// Returns the station index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the number of buffered packets, including the one currently
    /// contending for the channel.
    pub fn buffered_packets(&self) -> usize {
        self.buffer.len()
    }

    /// Accepts an arriving packet.
    ///
    /// The packet is appended to the buffer; if it is the only buffered
    /// packet, its transmission is enabled immediately.
    pub fn arrival(&mut self, packet: Packet) {
        log_debug!(
            self.ctx,
            "packet arrival, buffer size: {}",
            self.buffer.len() + 1
        );
        self.buffer.push_back(packet);
        if self.buffer.len() == 1 {
            self.ctx.emit_self_now(TransmissionStart {});
        }
    }

    fn on_transmission_start(&mut self) {
        self.channel.borrow_mut().begin_transmission();
        let head = self.buffer.front_mut().unwrap();
        head.status = PacketStatus::Transmitting;
        log_trace!(
            self.ctx,
            "transmission start, channel state: {:?}",
            self.channel.borrow().state()
        );
        self.ctx
            .emit_self(TransmissionEnd {}, head.upload_time + self.guard_time);
    }

    fn on_transmission_end(&mut self) {
        let outcome = self.channel.borrow_mut().end_transmission();
        let now = self.ctx.time();

        if outcome == ChannelState::Success {
            let packet = self.buffer.pop_front().unwrap();
            log_debug!(
                self.ctx,
                "successful reservation after {} collisions",
                packet.collision_count
            );
            self.stats.borrow_mut().record_success(
                self.index,
                now - packet.arrive_time,
                packet.collision_count,
            );

            // release the reserved data slot: a fresh data-stage packet
            // enters the contention-free pipeline
            let service_time = self.ctx.sample_from_distribution(&self.data_duration);
            self.data_link
                .borrow_mut()
                .submit(Packet::data(self.index, now, service_time));

            let mut server = self.server.borrow_mut();
            if server.is_busy() {
                server.enqueue(packet);
            } else {
                server.start_processing(packet);
            }

            if !self.buffer.is_empty() {
                self.ctx.emit_self(TransmissionStart {}, self.guard_time);
            }
        } else {
            let head = self.buffer.front_mut().unwrap();
            head.collision_count += 1;
            head.status = PacketStatus::Waiting;
            log_trace!(
                self.ctx,
                "collision, collision count: {}",
                head.collision_count
            );
            self.stats.borrow_mut().record_collision(self.index);

            // the channel was already reset to idle by end_transmission if
            // this was the last overlapping transmitter, so the retry cannot
            // collide with its own interval
            let backoff = 2. * self.ctx.rand() * self.mean_backoff;
            self.ctx.emit_self(TransmissionStart {}, backoff);
        }
    }
}

impl EventHandler for Station {
    fn on(&mut self, event: Event) {
        cast!(match event.data {
            TransmissionStart {} => {
                self.on_transmission_start();
            }
            TransmissionEnd {} => {
                self.on_transmission_end();
            }
        })
    }
}
