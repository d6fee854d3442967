//! TinyG Motion Controller
//!
//! Drives a TinyG board in JSON mode over a [`Transport`]. Status reports
//! arrive on the transport's reader task and are folded into shared state by
//! [`StatusIngest`]; callers issue motion intents from their own tasks and
//! synchronise on movement signals published through a watch channel.
//!
//! Each caller records the current [`MotionSignals`] before sending a
//! command and then waits, with a bound, for the `started` or `finished`
//! counter to advance. A report that lands between the send and the wait is
//! therefore never missed. Wait timeouts are logged and do not fail the call.

use crate::communication::{LineHandler, TcpConnectionInfo, TcpTransport, Transport};
use crate::firmware::tinyg::command_creator::{
    AccessoryCommand, CommandCreator, RealTimeCommand, HOME_ALL_AXES,
};
use crate::firmware::tinyg::response_parser::{StatusReport, TinyGReport, TinyGResponseParser};
use parking_lot::RwLock;
use puzzlebot_core::{
    ConnectionError, ControllerError, ControllerEvent, Coord, CoordCmd, CoordTranslator,
    Error, EventDispatcher, MachineStatus, Result,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};

/// Default bound for a command to be picked up (Idle to Moving)
pub const DEFAULT_MOVEMENT_START_MS: u64 = 500;

/// Default bound for a motion to complete (Moving to Idle)
pub const DEFAULT_MOVEMENT_FINISH_MS: u64 = 10_000;

/// Status requests sent right after the link comes up
const STARTUP_STATUS_REQUESTS: usize = 3;

/// Wait bounds used for movement synchronisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionTimeouts {
    /// How long to wait for a sent command to start moving
    pub movement_start: Duration,
    /// How long to wait for a motion to finish
    pub movement_finish: Duration,
}

impl MotionTimeouts {
    /// Build from millisecond values
    pub fn from_millis(movement_start_ms: u64, movement_finish_ms: u64) -> Self {
        Self {
            movement_start: Duration::from_millis(movement_start_ms),
            movement_finish: Duration::from_millis(movement_finish_ms),
        }
    }
}

impl Default for MotionTimeouts {
    fn default() -> Self {
        Self::from_millis(DEFAULT_MOVEMENT_START_MS, DEFAULT_MOVEMENT_FINISH_MS)
    }
}

/// Movement signals published on every status change
///
/// `started` counts Idle to Moving transitions and `finished` counts Moving
/// to Idle transitions. Both only ever increase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionSignals {
    /// Status carried by the latest report
    pub status: MachineStatus,
    /// Idle to Moving transitions observed
    pub started: u64,
    /// Moving to Idle transitions observed
    pub finished: u64,
}

/// Point-in-time copy of the controller state
#[derive(Debug, Clone, PartialEq)]
pub struct MachineSnapshot {
    /// Last reported position, in logical coordinates
    pub position: Coord,
    /// Last reported status
    pub status: MachineStatus,
    /// Mechanical homing completed since the last reset
    pub homed: bool,
    /// Controller reported an error that has not been reset
    pub fault_latched: bool,
    /// Why the transport went away, if it did
    pub connection_lost: Option<String>,
}

#[derive(Debug, Default)]
struct ControllerState {
    position: Coord,
    status: MachineStatus,
    homed: bool,
    fault_latched: bool,
    connection_lost: Option<String>,
}

struct Shared {
    state: RwLock<ControllerState>,
    signals: watch::Sender<MotionSignals>,
    translator: Box<dyn CoordTranslator>,
    events: EventDispatcher,
}

/// Line handler feeding controller state from the transport's reader task
struct StatusIngest {
    shared: Arc<Shared>,
}

impl StatusIngest {
    fn apply_status(&self, report: StatusReport) {
        let shared = &self.shared;
        let position = shared.translator.from_inner(report.position);

        let (previous, moved) = {
            let mut state = shared.state.write();
            let moved = state.position != position;
            state.position = position;
            let previous = state.status;
            state.status = report.status;
            (previous, moved)
        };

        if moved {
            shared.events.publish(ControllerEvent::PositionChanged(position));
        }
        if previous == report.status {
            return;
        }

        tracing::info!(from = %previous, to = %report.status, "Machine status changed");

        let started = previous.is_idle() && report.status.is_moving();
        let finished = previous.is_moving() && report.status.is_idle();
        shared.signals.send_modify(|signals| {
            signals.status = report.status;
            if started {
                signals.started += 1;
            }
            if finished {
                signals.finished += 1;
            }
        });

        shared.events.publish(ControllerEvent::StatusChanged {
            from: previous,
            to: report.status,
        });
        if started {
            shared.events.publish(ControllerEvent::MovementStarted);
        }
        if finished {
            shared.events.publish(ControllerEvent::MovementFinished);
        }
    }

    fn latch_fault(&self, frame: &serde_json::Value) {
        let newly_latched = {
            let mut state = self.shared.state.write();
            !std::mem::replace(&mut state.fault_latched, true)
        };
        tracing::error!(%frame, "Controller reported an error; motion blocked until reset");
        if newly_latched {
            self.shared.events.publish(ControllerEvent::FaultLatched);
        }
    }
}

impl LineHandler for StatusIngest {
    fn on_line(&self, line: &str) {
        tracing::debug!(line, "Controller response");
        match TinyGResponseParser::parse(line) {
            Ok(TinyGReport::Status(report)) => self.apply_status(report),
            Ok(TinyGReport::Fault(frame)) => self.latch_fault(&frame),
            Ok(TinyGReport::Other(_)) => {
                tracing::trace!(line, "Ignoring response");
            }
            Err(e) => {
                tracing::warn!(line, "Discarding controller response: {}", e);
            }
        }
    }

    fn on_connection_lost(&self, error: ConnectionError) {
        let reason = match error {
            ConnectionError::ConnectionLost { reason } => reason,
            other => other.to_string(),
        };
        self.shared.state.write().connection_lost = Some(reason.clone());
        self.shared
            .events
            .publish(ControllerEvent::ConnectionLost(reason));
    }
}

/// Motion controller for the PuzzleBot stage
///
/// Owns the transport and the coordinate pipeline. All public positions and
/// bounds are logical; only the wire sees inner coordinates.
pub struct MotionController {
    shared: Arc<Shared>,
    transport: Arc<dyn Transport>,
    timeouts: MotionTimeouts,
    /// Serialises motion requests; contention means another call is in flight
    motion: Mutex<()>,
}

impl MotionController {
    /// Connect over TCP and request the initial status
    pub async fn connect(
        info: &TcpConnectionInfo,
        translator: Box<dyn CoordTranslator>,
        timeouts: MotionTimeouts,
    ) -> Result<Self> {
        let info = info.clone();
        Self::with_transport(translator, timeouts, |handler| async move {
            let transport = TcpTransport::connect(&info, handler).await?;
            Ok(Arc::new(transport) as Arc<dyn Transport>)
        })
        .await
    }

    /// Build on a transport produced by `open`
    ///
    /// `open` receives the line handler the transport must deliver incoming
    /// lines to.
    pub async fn with_transport<F, Fut>(
        translator: Box<dyn CoordTranslator>,
        timeouts: MotionTimeouts,
        open: F,
    ) -> Result<Self>
    where
        F: FnOnce(Arc<dyn LineHandler>) -> Fut,
        Fut: Future<Output = Result<Arc<dyn Transport>>>,
    {
        let (signals, _) = watch::channel(MotionSignals::default());
        let shared = Arc::new(Shared {
            state: RwLock::new(ControllerState::default()),
            signals,
            translator,
            events: EventDispatcher::default(),
        });

        let handler: Arc<dyn LineHandler> = Arc::new(StatusIngest {
            shared: shared.clone(),
        });
        let transport = open(handler).await?;

        let controller = Self {
            shared,
            transport,
            timeouts,
            motion: Mutex::new(()),
        };

        for _ in 0..STARTUP_STATUS_REQUESTS {
            controller.request_status().await?;
        }

        Ok(controller)
    }

    /// Home X, Y and Z against their switches
    pub async fn perform_mechanical_home(&self) -> Result<()> {
        self.ensure_no_fault()?;
        let _motion = self.claim_motion()?;

        tracing::info!("Homing machine");
        let baseline = self.signals();
        let mut rx = self.shared.signals.subscribe();

        self.send_gcode(HOME_ALL_AXES).await?;
        self.wait_started(&mut rx, baseline).await;
        self.wait_finished(&mut rx, baseline).await;

        self.shared.state.write().homed = true;
        self.shared.events.publish(ControllerEvent::Homed);
        tracing::info!("Homing complete");
        Ok(())
    }

    /// Move to the destination described by `cmd`
    ///
    /// Always waits for the motion to start; with `sync` also waits for it to
    /// finish. Preconditions are checked in order: fault, homed, idle.
    pub async fn move_to(&self, cmd: &CoordCmd, sync: bool) -> Result<()> {
        self.ensure_no_fault()?;

        if !self.is_homed() {
            return Err(ControllerError::NotHomed.into());
        }
        let _motion = self.claim_motion()?;

        // Status is only trusted once the motion lock is held
        let (current, status) = {
            let state = self.shared.state.read();
            (state.position, state.status)
        };
        if !status.is_idle() {
            return Err(busy(status).into());
        }

        let translator = &self.shared.translator;
        let destination = cmd.resolve(current);
        if !translator.bounds_check(destination) {
            tracing::warn!(%destination, "Rejecting move outside travel bounds");
            return Err(ControllerError::OutOfBounds {
                target: destination.to_string(),
                min: translator.min().to_string(),
                max: translator.max().to_string(),
            }
            .into());
        }

        let inner = translator.to_inner(destination);
        if !inner.is_finite() {
            return Err(ControllerError::NonFiniteCoordinate {
                coordinate: inner.to_string(),
            }
            .into());
        }

        tracing::info!(%cmd, %destination, sync, "Moving");
        let baseline = self.signals();
        let mut rx = self.shared.signals.subscribe();

        self.send_gcode(&CommandCreator::motion_gcode(cmd, inner))
            .await?;
        self.wait_started(&mut rx, baseline).await;
        if sync {
            self.wait_finished(&mut rx, baseline).await;
        }
        Ok(())
    }

    /// Feed-hold and flush the current motion, then wait for Idle
    pub async fn cancel_move(&self) -> Result<()> {
        self.ensure_no_fault()?;

        let (homed, status) = {
            let state = self.shared.state.read();
            (state.homed, state.status)
        };
        if !homed {
            tracing::info!("Ignoring cancel: machine not homed");
            return Ok(());
        }
        if status.is_idle() {
            return Ok(());
        }

        tracing::info!(%status, "Cancelling motion");
        let mut rx = self.shared.signals.subscribe();
        self.send_raw(RealTimeCommand::FeedHoldFlush.as_str()).await?;

        wait_signal(
            &mut rx,
            self.timeouts.movement_finish,
            |s| s.status.is_idle(),
            "Machine did not return to idle after cancel",
        )
        .await;
        Ok(())
    }

    /// Vacuum pump on
    pub async fn turn_pump_on(&self) -> Result<()> {
        self.accessory(AccessoryCommand::PumpOn).await
    }

    /// Vacuum pump off
    pub async fn turn_pump_off(&self) -> Result<()> {
        self.accessory(AccessoryCommand::PumpOff).await
    }

    /// Lower the pickup solenoid
    pub async fn engage_solenoid(&self) -> Result<()> {
        self.accessory(AccessoryCommand::SolenoidEngage).await
    }

    /// Raise the pickup solenoid
    pub async fn disengage_solenoid(&self) -> Result<()> {
        self.accessory(AccessoryCommand::SolenoidDisengage).await
    }

    /// Clear the latched fault and the homed flag
    pub fn reset(&self) {
        let was_latched = {
            let mut state = self.shared.state.write();
            state.homed = false;
            std::mem::replace(&mut state.fault_latched, false)
        };
        tracing::info!("Controller reset; homing required");
        if was_latched {
            self.shared.events.publish(ControllerEvent::FaultCleared);
        }
    }

    /// Ask the controller for a status report
    pub async fn request_status(&self) -> Result<()> {
        self.send_raw(&CommandCreator::status_request()).await
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> MachineSnapshot {
        let state = self.shared.state.read();
        MachineSnapshot {
            position: state.position,
            status: state.status,
            homed: state.homed,
            fault_latched: state.fault_latched,
            connection_lost: state.connection_lost.clone(),
        }
    }

    /// Last reported logical position
    pub fn position(&self) -> Coord {
        self.shared.state.read().position
    }

    /// Last reported status
    pub fn status(&self) -> MachineStatus {
        self.shared.state.read().status
    }

    pub fn is_homed(&self) -> bool {
        self.shared.state.read().homed
    }

    pub fn is_fault_latched(&self) -> bool {
        self.shared.state.read().fault_latched
    }

    /// Lower logical travel bound
    pub fn min(&self) -> Coord {
        self.shared.translator.min()
    }

    /// Upper logical travel bound
    pub fn max(&self) -> Coord {
        self.shared.translator.max()
    }

    /// Current movement signals
    pub fn signals(&self) -> MotionSignals {
        *self.shared.signals.borrow()
    }

    /// Subscribe to controller events
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.shared.events.subscribe()
    }

    fn ensure_no_fault(&self) -> Result<()> {
        if self.shared.state.read().fault_latched {
            return Err(ControllerError::LatchedFault.into());
        }
        Ok(())
    }

    fn claim_motion(&self) -> Result<tokio::sync::MutexGuard<'_, ()>> {
        self.motion
            .try_lock()
            .map_err(|_| Error::from(busy(self.status())))
    }

    async fn accessory(&self, command: AccessoryCommand) -> Result<()> {
        self.ensure_no_fault()?;
        tracing::info!(%command, "Accessory");
        self.send_gcode(command.gcode()).await
    }

    async fn send_gcode(&self, gcode: &str) -> Result<()> {
        self.send_raw(&CommandCreator::gcode_frame(gcode)).await
    }

    async fn send_raw(&self, line: &str) -> Result<()> {
        let lost = self.shared.state.read().connection_lost.clone();
        if let Some(reason) = lost {
            return Err(ConnectionError::ConnectionLost { reason }.into());
        }
        tracing::debug!(line, "Sending");
        self.transport.write_line(line).await
    }

    async fn wait_started(&self, rx: &mut watch::Receiver<MotionSignals>, baseline: MotionSignals) {
        let bound = self.timeouts.movement_start;
        wait_signal(rx, bound, |s| s.started > baseline.started, "Movement never started").await;
    }

    async fn wait_finished(&self, rx: &mut watch::Receiver<MotionSignals>, baseline: MotionSignals) {
        let bound = self.timeouts.movement_finish;
        wait_signal(rx, bound, |s| s.finished > baseline.finished, "Movement never finished")
            .await;
    }
}

impl std::fmt::Debug for MotionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionController")
            .field("state", &self.snapshot())
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

/// Wait for `done` to hold; a timeout is only logged
async fn wait_signal(
    rx: &mut watch::Receiver<MotionSignals>,
    bound: Duration,
    done: impl FnMut(&MotionSignals) -> bool,
    on_timeout: &str,
) {
    match tokio::time::timeout(bound, rx.wait_for(done))
        .await
        .map(|r| r.is_ok())
    {
        Ok(true) => {}
        Ok(false) => tracing::warn!("Status channel closed while waiting for motion"),
        Err(_) => tracing::warn!(timeout_ms = bound.as_millis() as u64, "{}", on_timeout),
    }
}

fn busy(status: MachineStatus) -> ControllerError {
    ControllerError::Busy {
        status: status.to_string(),
    }
}
