use std::collections::BTreeMap;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use prize_dash_core::events::UiEvent;
use prize_dash_core::input::{GamepadSnapshot, GamepadSource};
use prize_dash_core::session::Session;
use prize_dash_core::simulation::{RenderSink, RenderSnapshot};
use prize_dash_core::store::{Phase, SessionState};
use prize_dash_core::time::Millis;

use crate::commands::HostCommand;

/// Broadcasts sent from the session loop to whoever drives the host.
#[derive(Debug, Clone)]
pub enum HostBroadcast {
    Ui(UiEvent),
    /// MessagePack-encoded [`RenderSnapshot`].
    Frame(Bytes),
    /// The loop has exited.
    Stopped,
}

/// Decode a frame produced by the session loop.
pub fn decode_frame(data: &[u8]) -> Result<RenderSnapshot, rmp_serde::decode::Error> {
    rmp_serde::from_slice(data)
}

/// Gamepads driven by host commands instead of real devices.
#[derive(Debug, Clone, Default)]
pub struct VirtualGamepads {
    pads: BTreeMap<usize, GamepadSnapshot>,
}

impl VirtualGamepads {
    pub fn connect(&mut self, index: usize) {
        self.pads
            .entry(index)
            .or_insert_with(|| GamepadSnapshot::new(index));
    }

    pub fn disconnect(&mut self, index: usize) -> bool {
        self.pads.remove(&index).is_some()
    }

    pub fn set_button(&mut self, index: usize, button: usize, pressed: bool) {
        if let Some(pad) = self.pads.get_mut(&index) {
            *pad = std::mem::take(pad).with_button(button, pressed);
        } else {
            tracing::debug!(index, "Button change for a gamepad that is not connected");
        }
    }

    pub fn set_axes(&mut self, index: usize, x: f32, y: f32) {
        if let Some(pad) = self.pads.get_mut(&index) {
            pad.axes = [x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0)];
        }
    }
}

impl GamepadSource for VirtualGamepads {
    fn gamepads(&self) -> Vec<GamepadSnapshot> {
        self.pads.values().cloned().collect()
    }
}

/// Encodes frames with MessagePack and forwards them on the broadcast channel.
struct ChannelRenderer {
    tx: mpsc::UnboundedSender<HostBroadcast>,
    buf: Vec<u8>,
}

impl RenderSink for ChannelRenderer {
    fn draw(&mut self, frame: &RenderSnapshot) {
        self.buf.clear();
        match rmp_serde::encode::write_named(&mut self.buf, frame) {
            Ok(()) => {
                let _ = self
                    .tx
                    .send(HostBroadcast::Frame(Bytes::copy_from_slice(&self.buf)));
            },
            Err(e) => tracing::error!(error = %e, "Failed to encode frame"),
        }
    }
}

/// Loop timing, taken from the host configuration.
#[derive(Debug, Clone, Copy)]
pub struct LoopTiming {
    pub frame_period: Duration,
    pub input_poll: Duration,
    pub discovery_poll: Duration,
}

impl LoopTiming {
    pub fn new(frame_rate_hz: f64, session: &Session) -> Self {
        let config = session.config();
        Self {
            frame_period: Duration::from_secs_f64(1.0 / frame_rate_hz),
            input_poll: Duration::from_millis(config.input_poll_ms),
            discovery_poll: Duration::from_millis(config.discovery_poll_ms),
        }
    }
}

/// Spawn the session loop as a tokio task.
/// Returns the command sender and broadcast receiver.
pub fn spawn_session(
    mut session: Session,
    timing: LoopTiming,
) -> (
    mpsc::UnboundedSender<HostCommand>,
    mpsc::UnboundedReceiver<HostBroadcast>,
    JoinHandle<()>,
) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (broadcast_tx, broadcast_rx) = mpsc::unbounded_channel();

    let ui_tx = broadcast_tx.clone();
    session.subscribe(move |_: &SessionState, events: &[UiEvent]| {
        for event in events {
            let _ = ui_tx.send(HostBroadcast::Ui(event.clone()));
        }
    });

    let handle = tokio::spawn(async move {
        run_session_loop(session, timing, cmd_rx, broadcast_tx).await;
    });

    (cmd_tx, broadcast_rx, handle)
}

/// Single-task cooperative loop: frames, input polls, discovery, session
/// timers and commands all run here, one at a time.
async fn run_session_loop(
    mut session: Session,
    timing: LoopTiming,
    mut cmd_rx: mpsc::UnboundedReceiver<HostCommand>,
    broadcast_tx: mpsc::UnboundedSender<HostBroadcast>,
) {
    let epoch = Instant::now();
    let clock = move || epoch.elapsed().as_millis() as Millis;

    let mut renderer = ChannelRenderer {
        tx: broadcast_tx.clone(),
        buf: Vec::with_capacity(1024),
    };
    let mut pads = VirtualGamepads::default();

    let mut frames = tokio::time::interval(timing.frame_period);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut input_poll = tokio::time::interval(timing.input_poll);
    input_poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut discovery = tokio::time::interval(timing.discovery_poll);
    discovery.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(frame_period = ?timing.frame_period, "Session loop running");

    loop {
        let deadline = session
            .next_timer_deadline()
            .map(|ms| epoch + Duration::from_millis(ms));

        tokio::select! {
            _ = frames.tick() => {
                if session.state().phase == Phase::Playing
                    && !session.frame(clock(), &pads.gamepads(), &mut renderer)
                {
                    tracing::debug!("Frame loop idle until the next round");
                }
            }
            _ = input_poll.tick() => {
                session.poll_gamepads(&pads.gamepads(), clock());
            }
            _ = discovery.tick() => {
                session.discover_gamepads(&pads.gamepads());
            }
            _ = async {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            } => {
                session.run_due_timers(clock());
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(HostCommand::Stop) | None => break,
                    Some(cmd) => apply_command(&mut session, &mut pads, cmd, clock()),
                }
            }
        }
    }

    tracing::info!("Session loop stopped");
    let _ = broadcast_tx.send(HostBroadcast::Stopped);
}

fn apply_command(session: &mut Session, pads: &mut VirtualGamepads, cmd: HostCommand, now: Millis) {
    let result = match cmd {
        HostCommand::Select { slot, character } => session.select_character(slot, character, now),
        HostCommand::Deselect { slot } => session.deselect(slot),
        HostCommand::Mode(mode) => session.select_mode(mode),
        HostCommand::Start => session.start(now),
        HostCommand::Exit => {
            session.exit();
            Ok(())
        },
        HostCommand::RequestExit => {
            session.request_exit();
            Ok(())
        },
        HostCommand::CancelExit => {
            session.cancel_exit();
            Ok(())
        },
        HostCommand::ConfirmExit => {
            session.confirm_exit();
            Ok(())
        },
        HostCommand::KeyDown(code) => {
            session.key_down(&code, now);
            Ok(())
        },
        HostCommand::KeyUp(code) => {
            session.key_up(&code);
            Ok(())
        },
        HostCommand::Action { slot, action } => {
            session.handle_menu_action(slot, action, now);
            Ok(())
        },
        HostCommand::PadConnected { index } => {
            pads.connect(index);
            session.gamepad_connected(index);
            Ok(())
        },
        HostCommand::PadDisconnected { index } => {
            if pads.disconnect(index) {
                session.gamepad_disconnected(index);
            }
            Ok(())
        },
        HostCommand::PadButton {
            index,
            button,
            pressed,
        } => {
            pads.set_button(index, button, pressed);
            Ok(())
        },
        HostCommand::PadAxes { index, x, y } => {
            pads.set_axes(index, x, y);
            Ok(())
        },
        HostCommand::Resize { width, height } => {
            session.resize(width, height, now);
            Ok(())
        },
        HostCommand::Stop => Ok(()),
    };
    if let Err(e) = result {
        tracing::info!(error = %e, "Command rejected");
    }
}
