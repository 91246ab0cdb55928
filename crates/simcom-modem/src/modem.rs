use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use simcom_frame::{CommandWriter, FrameError, FrameReader};
use simcom_transport::SerialTransport;
use tracing::{debug, info, trace, warn};

use crate::command::{StatusControl, V25ter, ERROR_MARKER, OK_MARKER};
use crate::config::ModemConfig;
use crate::demux::classify;
use crate::error::{ModemError, PowerError, Result};
use crate::power::PowerControl;
use crate::request::{CommandRequest, Reply};
use crate::urc::UnsolicitedQueue;

/// Substring `ATI` reports on every module of the series.
pub const SIM7600_MODEL: &str = "SIM7600";

/// Lifecycle of a modem connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// The serial port is closed.
    Closed,
    /// The port is open but the module is not powered.
    Open,
    /// The port is open and commands may be sent.
    Powered,
}

struct Channel<T> {
    reader: FrameReader<T>,
    writer: CommandWriter,
}

/// A connection to one SIMCom module.
///
/// All operations take `&self`: share the modem between threads with an
/// `Arc`. At most one command is in flight at a time; concurrent callers
/// queue on the channel lock. Frames that no command claims are kept in
/// arrival order until [`unsolicited_messages`](Modem::unsolicited_messages)
/// hands them out.
pub struct Modem<T> {
    channel: Mutex<Channel<T>>,
    unsolicited: UnsolicitedQueue,
    open: AtomicBool,
    powered: AtomicBool,
    power: Mutex<Option<Box<dyn PowerControl>>>,
    config: ModemConfig,
}

impl<T: SerialTransport> Modem<T> {
    /// Wrap a transport for an externally powered module.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ModemConfig::default())
    }

    /// Wrap a transport for an externally powered module, with explicit
    /// configuration.
    pub fn with_config(transport: T, config: ModemConfig) -> Self {
        Self::build(transport, config, None, true)
    }

    /// Wrap a transport for a module switched by `control`.
    ///
    /// The modem starts unpowered; call [`power_on`](Modem::power_on) after
    /// [`open`](Modem::open).
    pub fn with_power_control(
        transport: T,
        config: ModemConfig,
        control: impl PowerControl + 'static,
    ) -> Self {
        Self::build(transport, config, Some(Box::new(control)), false)
    }

    fn build(
        transport: T,
        config: ModemConfig,
        power: Option<Box<dyn PowerControl>>,
        powered: bool,
    ) -> Self {
        let open = transport.is_open();
        let channel = Channel {
            reader: FrameReader::with_config(transport, config.frame.clone()),
            writer: CommandWriter::with_terminator(config.command_terminator.clone()),
        };

        Self {
            channel: Mutex::new(channel),
            unsolicited: UnsolicitedQueue::new(),
            open: AtomicBool::new(open),
            powered: AtomicBool::new(powered),
            power: Mutex::new(power),
            config,
        }
    }

    pub fn state(&self) -> ConnectionState {
        if !self.is_open() {
            ConnectionState::Closed
        } else if self.is_powered() {
            ConnectionState::Powered
        } else {
            ConnectionState::Open
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn is_powered(&self) -> bool {
        self.powered.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    /// Open the serial connection and discard stale input.
    ///
    /// Opening an already-open connection is a usage error.
    pub fn open(&self) -> Result<()> {
        let mut channel = self.lock_channel();
        let transport = channel.reader.get_mut();
        if transport.is_open() {
            return Err(ModemError::Usage("connection is already open".to_string()));
        }

        transport.open()?;
        transport.clear_input()?;
        channel.reader.discard_buffered();
        self.open.store(true, Ordering::Release);
        debug!("modem connection opened");
        Ok(())
    }

    /// Close the serial connection. Closing a closed connection does nothing.
    pub fn close(&self) -> Result<()> {
        let mut channel = self.lock_channel();
        let transport = channel.reader.get_mut();
        if transport.is_open() {
            transport.close()?;
            debug!("modem connection closed");
        }
        channel.reader.discard_buffered();
        self.open.store(false, Ordering::Release);
        Ok(())
    }

    /// Switch the module on through the configured [`PowerControl`].
    ///
    /// The power lock is held for the whole sequence, so concurrent callers
    /// press the power key once between them.
    pub fn power_on(&self) -> Result<()> {
        if !self.is_open() {
            return Err(ModemError::Usage(
                "connection must be open before powering on".to_string(),
            ));
        }

        let mut power = self.lock_power();
        if self.is_powered() {
            return Err(ModemError::Usage("modem is already powered".to_string()));
        }
        let control = power.as_mut().ok_or_else(no_power_control)?;
        control.power_on()?;

        let mut channel = self.lock_channel();
        self.powered.store(true, Ordering::Release);
        info!("modem powered on");

        // The boot banner is not an answer to anything.
        channel.reader.discard_buffered();
        channel.reader.get_mut().clear_input()?;
        Ok(())
    }

    /// Switch the module off through the configured [`PowerControl`].
    ///
    /// Waits for an in-flight command to finish before pressing the key.
    pub fn power_down(&self) -> Result<()> {
        let mut power = self.lock_power();
        if !self.is_powered() {
            return Err(ModemError::NotPowered);
        }
        let control = power.as_mut().ok_or_else(no_power_control)?;

        let _channel = self.lock_channel();
        control.power_down()?;
        self.powered.store(false, Ordering::Release);
        info!("modem powered down");
        Ok(())
    }

    /// Send `command` and return the frame claimed as its result.
    ///
    /// With `success` set to `None` the first frame of the reply is the
    /// result. A frame containing any of `errors` fails the command even if
    /// a result was also found.
    pub fn send(
        &self,
        command: &str,
        success: Option<&str>,
        errors: &[&str],
        timeout: Duration,
    ) -> Result<String> {
        let mut request = CommandRequest::new(command)
            .errors(errors.iter().copied())
            .timeout(timeout);
        request.success_marker = success.map(str::to_string);

        self.send_request(&request).map(|reply| reply.result)
    }

    /// Send a request and classify its reply.
    ///
    /// Fails with [`ModemError::NotPowered`] before touching the transport
    /// when the module is not powered.
    pub fn send_request(&self, request: &CommandRequest) -> Result<Reply> {
        let timeout = request.timeout.unwrap_or(self.config.default_timeout);
        let command = request.command.as_str();

        let mut channel = self.lock_channel();
        // Power changes hold the channel lock, so this cannot go stale
        // before the write.
        if !self.is_powered() {
            return Err(ModemError::NotPowered);
        }
        let Channel { reader, writer } = &mut *channel;
        if !reader.get_ref().is_open() {
            return Err(ModemError::Usage("connection is not open".to_string()));
        }

        debug!(command, ?timeout, "sending command");
        writer
            .send(reader.get_mut(), command)
            .map_err(|err| ModemError::from_frame(err, command))?;

        let frames = reader
            .read_frames(timeout)
            .map_err(|err| ModemError::from_frame(err, command))?;

        let mut outcome = classify(frames, request);
        if !outcome.unsolicited.is_empty() {
            debug!(
                command,
                count = outcome.unsolicited.len(),
                "queueing unsolicited frames"
            );
            self.unsolicited
                .extend(std::mem::take(&mut outcome.unsolicited));
        }
        drop(channel);

        let reply = outcome.into_reply(request);
        match &reply {
            Ok(reply) => debug!(command, result = %reply.result, "command succeeded"),
            Err(err) => debug!(command, error = %err, "command failed"),
        }
        reply
    }

    /// Unsolicited messages received so far, oldest first.
    ///
    /// First polls the transport briefly for messages that arrived between
    /// commands; that poll never fails the call. With `clear` the queue is
    /// drained, otherwise a snapshot is returned.
    pub fn unsolicited_messages(&self, clear: bool) -> Vec<String> {
        self.poll_unsolicited();
        if clear {
            self.unsolicited.take()
        } else {
            self.unsolicited.snapshot()
        }
    }

    /// The queue itself, without polling the transport.
    pub fn unsolicited(&self) -> &UnsolicitedQueue {
        &self.unsolicited
    }

    /// Check that a module answers `AT` with `OK`.
    ///
    /// Opens the connection if needed and restores it afterwards. Protocol
    /// failures report `Ok(false)`; transport and state errors propagate.
    pub fn verify(&self) -> Result<bool> {
        self.with_connection(|modem| modem.answers("AT", OK_MARKER))
    }

    /// Like [`verify`](Modem::verify), and also require `ATI` to identify a
    /// SIM7600 series module.
    pub fn verify_model(&self) -> Result<bool> {
        self.with_connection(|modem| {
            if !modem.answers("AT", OK_MARKER)? {
                return Ok(false);
            }
            match modem.v25ter().identify() {
                Ok(identification) => Ok(identification.model.contains(SIM7600_MODEL)),
                Err(err) if is_protocol_failure(&err) => Ok(false),
                Err(err) => Err(err),
            }
        })
    }

    /// V.25TER commands.
    pub fn v25ter(&self) -> V25ter<'_, T> {
        V25ter::new(self)
    }

    /// Status control commands.
    pub fn status(&self) -> StatusControl<'_, T> {
        StatusControl::new(self)
    }

    /// Consume the modem and return the transport.
    pub fn into_inner(self) -> T {
        let channel = self
            .channel
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        channel.reader.into_inner()
    }

    /// Run `f` with the connection open, closing it again if it was closed.
    fn with_connection<R>(&self, f: impl FnOnce(&Self) -> Result<R>) -> Result<R> {
        let was_open = self.is_open();
        if !was_open {
            self.open()?;
        }

        let outcome = f(self);

        if !was_open {
            self.close()?;
        }
        outcome
    }

    /// Whether `command` gets a reply containing `marker`.
    fn answers(&self, command: &str, marker: &str) -> Result<bool> {
        let outcome = self.send(
            command,
            Some(marker),
            &[ERROR_MARKER],
            self.config.default_timeout,
        );

        match outcome {
            Ok(_) => Ok(true),
            Err(err) if is_protocol_failure(&err) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn poll_unsolicited(&self) {
        let mut channel = self.lock_channel();
        if !channel.reader.get_ref().is_open() {
            return;
        }

        // A frame straddling the poll deadline stays in the reader and is
        // completed by the next read, so nothing is lost between polls.
        match channel.reader.poll_frames(self.config.drain_timeout) {
            Ok(frames) => {
                if !frames.is_empty() {
                    trace!(count = frames.len(), "drained unsolicited frames");
                }
                self.unsolicited
                    .extend(frames.into_iter().map(|frame| frame.into_text()));
            }
            Err(FrameError::Timeout(_)) => trace!("no unsolicited frames pending"),
            Err(err) => warn!(error = %err, "unsolicited poll failed"),
        }
    }

    fn lock_channel(&self) -> MutexGuard<'_, Channel<T>> {
        self.channel.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_power(&self) -> MutexGuard<'_, Option<Box<dyn PowerControl>>> {
        self.power.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The module answered, just not the way a verified module would.
fn is_protocol_failure(err: &ModemError) -> bool {
    matches!(
        err,
        ModemError::ReadTimeout { .. }
            | ModemError::CommandRejected { .. }
            | ModemError::NoValidResponse { .. }
            | ModemError::MalformedResponse { .. }
    )
}

fn no_power_control() -> ModemError {
    PowerError::Unavailable("no power control configured".to_string()).into()
}

impl<T> fmt::Debug for Modem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modem")
            .field("open", &self.open.load(Ordering::Relaxed))
            .field("powered", &self.powered.load(Ordering::Relaxed))
            .field("unsolicited", &self.unsolicited.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
