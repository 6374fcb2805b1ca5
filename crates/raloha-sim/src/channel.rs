//! Shared channel state machine.

use serde::Serialize;

/// Logical state of a shared channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ChannelState {
    /// No station is transmitting.
    Idle,
    /// Exactly one station has been transmitting during the current busy
    /// period, so far.
    Success,
    /// At least two stations transmitted concurrently at some point during
    /// the current busy period.
    Collision,
}

/// A shared transmission medium.
///
/// Tracks the number of concurrently transmitting stations and derives the
/// logical channel state from it. Collision attribution is per busy interval:
/// once the state flips to [`ChannelState::Collision`], every transmission
/// overlapping that interval observes the collision outcome when it ends,
/// even if its own slot ended before the other transmitters left.
#[derive(Debug)]
pub struct Channel {
    state: ChannelState,
    transmitting: u32,
}

impl Channel {
    /// Creates an idle channel.
    pub fn new() -> Self {
        Self {
            state: ChannelState::Idle,
            transmitting: 0,
        }
    }

    /// Returns the current logical state.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Returns the number of currently transmitting stations.
    pub fn transmitting_count(&self) -> u32 {
        self.transmitting
    }

    /// Returns whether the medium is free.
    pub fn is_idle(&self) -> bool {
        self.state == ChannelState::Idle
    }

    /// Registers the start of a transmission.
    ///
    /// The first transmitter of a busy period makes the channel tentatively
    /// successful; any further concurrent transmitter turns the whole busy
    /// period into a collision.
    pub fn begin_transmission(&mut self) {
        self.transmitting += 1;
        if self.state != ChannelState::Idle {
            self.state = ChannelState::Collision;
        } else {
            self.state = ChannelState::Success;
        }
    }

    /// Registers the end of a transmission and returns the outcome observed
    /// by it.
    ///
    /// On a successful outcome the channel returns to idle immediately. On a
    /// collision the channel stays in the collision state until the last
    /// overlapping transmitter ends, and only then is reset to idle; the
    /// reset happens here, before the caller schedules any retry, so a retry
    /// cannot spuriously collide with the interval it just left.
    ///
    /// Panics if no transmission is in progress, since this indicates a logic
    /// defect in the protocol state machine.
    pub fn end_transmission(&mut self) -> ChannelState {
        assert!(
            self.transmitting > 0,
            "End of transmission on a channel with no transmitters!"
        );
        let outcome = self.state;
        self.transmitting -= 1;
        if outcome == ChannelState::Success || self.transmitting == 0 {
            self.state = ChannelState::Idle;
        }
        outcome
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lone_transmission_succeeds() {
        let mut channel = Channel::new();
        assert!(channel.is_idle());
        channel.begin_transmission();
        assert_eq!(channel.state(), ChannelState::Success);
        assert_eq!(channel.transmitting_count(), 1);
        assert_eq!(channel.end_transmission(), ChannelState::Success);
        assert!(channel.is_idle());
        assert_eq!(channel.transmitting_count(), 0);
    }

    #[test]
    fn concurrent_transmissions_collide() {
        let mut channel = Channel::new();
        channel.begin_transmission();
        channel.begin_transmission();
        assert_eq!(channel.state(), ChannelState::Collision);
        assert_eq!(channel.transmitting_count(), 2);
        // the first to end still observes the collision of its interval
        assert_eq!(channel.end_transmission(), ChannelState::Collision);
        // the medium is not freed while the other transmitter is still on
        assert_eq!(channel.state(), ChannelState::Collision);
        assert_eq!(channel.end_transmission(), ChannelState::Collision);
        assert!(channel.is_idle());
    }

    #[test]
    fn late_joiner_collides_with_busy_period() {
        let mut channel = Channel::new();
        channel.begin_transmission();
        assert_eq!(channel.state(), ChannelState::Success);
        channel.begin_transmission();
        channel.begin_transmission();
        assert_eq!(channel.end_transmission(), ChannelState::Collision);
        assert_eq!(channel.end_transmission(), ChannelState::Collision);
        assert_eq!(channel.end_transmission(), ChannelState::Collision);
        assert!(channel.is_idle());
        // the next busy period starts clean
        channel.begin_transmission();
        assert_eq!(channel.state(), ChannelState::Success);
    }

    #[test]
    #[should_panic(expected = "no transmitters")]
    fn ending_on_idle_channel_panics() {
        let mut channel = Channel::new();
        channel.end_transmission();
    }
}
