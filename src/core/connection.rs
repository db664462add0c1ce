//! Socket lifecycle: connect, parse, reconnect after a fixed delay.
//!
//! [`ConnectionManager`] owns the state machine
//! `Disconnected -> Connecting -> Connected -> Disconnected -> Connecting ...`.
//! The socket and the timer are injected ([`Transport`], [`ReconnectTimer`]),
//! and the host calls back into the manager from its event handlers.

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::protocol::{parse_frame, Command, Inbound};
use crate::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

/// Constant backoff. No growth, no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    /// Reconnect attempts allowed after the first connect; `None` is unbounded.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Whether attempt number `attempt` (1-based) may be scheduled.
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempt <= max)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("not connected")]
    NotConnected,
    #[error("failed to open socket: {0}")]
    Open(String),
    #[error("failed to send: {0}")]
    Send(String),
}

/// A text-frame socket. Events are delivered by the host calling the
/// manager's `on_*` methods.
pub trait Transport {
    fn open(&mut self, url: &str) -> Result<(), ConnectionError>;
    fn send_text(&mut self, text: &str) -> Result<(), ConnectionError>;
    /// Close and detach from the current socket, if any. Must not trigger
    /// `on_close` on the manager.
    fn close(&mut self);
}

/// Opaque id of a scheduled reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(pub i32);

pub trait ReconnectTimer {
    /// Arrange for `on_reconnect_timer` to be called after `delay`.
    fn schedule(&mut self, delay: Duration) -> Option<TimerHandle>;
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug)]
pub struct ConnectionManager<T> {
    url: String,
    transport: T,
    policy: RetryPolicy,
    state: ConnectionState,
    pending_timer: Option<TimerHandle>,
    attempts: u32,
    stopped: bool,
    frames_received: u64,
    frames_dropped: u64,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(url: impl Into<String>, transport: T, policy: RetryPolicy) -> Self {
        Self {
            url: url.into(),
            transport,
            policy,
            state: ConnectionState::Disconnected,
            pending_timer: None,
            attempts: 0,
            stopped: false,
            frames_received: 0,
            frames_dropped: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Reconnect attempts made since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn reconnect_pending(&self) -> bool {
        self.pending_timer.is_some()
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Open the socket. Re-enables retries after a [`disconnect`](Self::disconnect).
    pub fn connect<R: ReconnectTimer + ?Sized>(&mut self, timer: &mut R) {
        self.stopped = false;
        self.cancel_timer(timer);
        self.open(timer);
    }

    fn open<R: ReconnectTimer + ?Sized>(&mut self, timer: &mut R) {
        self.transport.close();
        self.state = ConnectionState::Connecting;
        info!(url = %self.url, "connecting");
        if let Err(e) = self.transport.open(&self.url) {
            error!(url = %self.url, error = %e, "socket could not be opened");
            self.state = ConnectionState::Disconnected;
            self.schedule_reconnect(timer);
        }
    }

    pub fn on_open(&mut self) {
        self.state = ConnectionState::Connected;
        self.attempts = 0;
        info!(url = %self.url, "connected");
    }

    /// Parse one inbound text frame.
    ///
    /// Malformed frames are logged and dropped; the connection stays open.
    /// Typed frames this client does not know are dropped as well.
    pub fn on_message(&mut self, text: &str) -> Option<Inbound> {
        self.frames_received += 1;
        match parse_frame(text) {
            Ok(Inbound::Unknown { kind }) => {
                warn!(%kind, "ignoring message of unknown type");
                self.frames_dropped += 1;
                None
            }
            Ok(msg) => Some(msg),
            Err(e) => {
                warn!(error = %e, "dropping malformed frame");
                self.frames_dropped += 1;
                None
            }
        }
    }

    pub fn on_error<R: ReconnectTimer + ?Sized>(&mut self, timer: &mut R) {
        warn!(url = %self.url, "socket error");
        self.lost(timer);
    }

    pub fn on_close<R: ReconnectTimer + ?Sized>(&mut self, timer: &mut R) {
        info!(url = %self.url, "disconnected");
        self.lost(timer);
    }

    fn lost<R: ReconnectTimer + ?Sized>(&mut self, timer: &mut R) {
        self.state = ConnectionState::Disconnected;
        self.schedule_reconnect(timer);
    }

    /// Schedule a reconnect after the policy delay, replacing any pending one.
    /// Returns whether a timer is now pending.
    pub fn schedule_reconnect<R: ReconnectTimer + ?Sized>(&mut self, timer: &mut R) -> bool {
        self.cancel_timer(timer);
        if self.stopped {
            return false;
        }
        let attempt = self.attempts + 1;
        if !self.policy.allows(attempt) {
            warn!(attempts = self.attempts, "giving up on reconnecting");
            return false;
        }
        self.pending_timer = timer.schedule(self.policy.delay);
        debug!(
            attempt,
            delay_ms = self.policy.delay.as_millis() as u64,
            "reconnect scheduled"
        );
        self.pending_timer.is_some()
    }

    /// The reconnect timer fired.
    pub fn on_reconnect_timer<R: ReconnectTimer + ?Sized>(&mut self, timer: &mut R) {
        self.pending_timer = None;
        if self.stopped || self.state != ConnectionState::Disconnected {
            return;
        }
        self.attempts += 1;
        info!(attempt = self.attempts, "attempting to reconnect");
        self.open(timer);
    }

    /// Close the socket and stop retrying until the next [`connect`](Self::connect).
    pub fn disconnect<R: ReconnectTimer + ?Sized>(&mut self, timer: &mut R) {
        self.stopped = true;
        self.cancel_timer(timer);
        self.transport.close();
        self.state = ConnectionState::Disconnected;
        info!(url = %self.url, "disconnected on request");
    }

    pub fn send_command(&mut self, command: Command) -> Result<(), ConnectionError> {
        if !self.state.is_connected() {
            return Err(ConnectionError::NotConnected);
        }
        self.transport.send_text(command.as_str())?;
        info!(%command, "command sent");
        Ok(())
    }

    fn cancel_timer<R: ReconnectTimer + ?Sized>(&mut self, timer: &mut R) {
        if let Some(handle) = self.pending_timer.take() {
            timer.cancel(handle);
        }
    }
}
