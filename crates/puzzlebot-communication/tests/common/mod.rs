//! Shared test fixtures: an in-process TinyG simulator used as a transport

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use puzzlebot_communication::{LineHandler, MotionController, MotionTimeouts, Transport};
use puzzlebot_core::{
    ConnectionError, Coord, CoordSystemBuilder, CoordTranslator, Error, Result,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const STATUS_REQUEST: &str = r#"{"sr":null}"#;

/// Machine-space travel limits used throughout the tests
pub fn machine_min() -> Coord {
    Coord::new(0.0, 0.0, -30.0, 0.0)
}

pub fn machine_max() -> Coord {
    Coord::new(595.0, 360.0, 0.0, 365.0)
}

pub fn identity() -> Box<dyn CoordTranslator> {
    CoordSystemBuilder::identity(machine_min(), machine_max()).unwrap()
}

/// Short bounds so timeout paths finish quickly
pub fn fast_timeouts() -> MotionTimeouts {
    MotionTimeouts::from_millis(50, 200)
}

/// How the simulator answers commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Status reports follow every command immediately
    Responsive,
    /// Moves report Run and never finish until `!%`
    HoldMotion,
    /// Nothing is ever answered
    Silent,
}

struct Sim {
    stat: i64,
    position: Coord,
}

/// Fake TinyG answering on the calling task
pub struct FakeTinyG {
    handler: Arc<dyn LineHandler>,
    sent: Mutex<Vec<String>>,
    sim: Mutex<Sim>,
    mode: Mutex<Mode>,
    connected: AtomicBool,
}

impl FakeTinyG {
    pub fn new(handler: Arc<dyn LineHandler>, mode: Mode) -> Self {
        Self {
            handler,
            sent: Mutex::new(Vec::new()),
            sim: Mutex::new(Sim {
                stat: 1,
                position: Coord::default(),
            }),
            mode: Mutex::new(mode),
            connected: AtomicBool::new(true),
        }
    }

    /// Every line written so far
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    /// Lines written after the three startup status requests
    pub fn commands(&self) -> Vec<String> {
        self.sent().into_iter().skip(3).collect()
    }

    pub fn last_command(&self) -> Option<String> {
        self.sent.lock().last().cloned()
    }

    pub fn set_mode(&self, mode: Mode) {
        *self.mode.lock() = mode;
    }

    /// Deliver a raw line as if it came off the wire
    pub fn inject(&self, line: &str) {
        self.handler.on_line(line);
    }

    /// Simulate the peer closing the connection
    pub fn drop_link(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.handler.on_connection_lost(ConnectionError::ConnectionLost {
            reason: "connection closed by peer".to_string(),
        });
    }

    fn report(&self, stat: i64) {
        let position = {
            let mut sim = self.sim.lock();
            sim.stat = stat;
            sim.position
        };
        self.inject(&status_line(stat, position));
    }

    fn simulate(&self, line: &str) {
        if line == "!%" {
            if self.sim.lock().stat == 5 {
                self.report(6);
            }
            self.report(3);
            return;
        }

        let frame: serde_json::Value = match serde_json::from_str(line) {
            Ok(frame) => frame,
            Err(_) => return,
        };

        if frame.get("sr").is_some() {
            let (stat, position) = {
                let sim = self.sim.lock();
                (sim.stat, sim.position)
            };
            self.inject(&format!(
                r#"{{"r":{},"f":[1,0,10]}}"#,
                status_line(stat, position)
            ));
            return;
        }

        let gcode = match frame.get("gc").and_then(|gc| gc.as_str()) {
            Some(gcode) => gcode.to_string(),
            None => return,
        };

        if gcode.starts_with("G28.2") {
            self.report(9);
            {
                let mut sim = self.sim.lock();
                let a = sim.position.a;
                sim.position = Coord::new(0.0, 0.0, 0.0, a);
            }
            self.report(3);
        } else if let Some(words) = gcode.strip_prefix("G0") {
            let target = apply_words(self.sim.lock().position, words);
            if *self.mode.lock() == Mode::HoldMotion {
                self.report(5);
                return;
            }
            self.report(5);
            self.sim.lock().position = target;
            self.report(3);
        } else {
            self.inject(&format!(r#"{{"r":{{"gc":"{}"}},"f":[1,0,4]}}"#, gcode));
        }
    }
}

#[async_trait]
impl Transport for FakeTinyG {
    async fn write_line(&self, line: &str) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::from(ConnectionError::ConnectionLost {
                reason: "fake closed".to_string(),
            }));
        }
        self.sent.lock().push(line.to_string());
        if *self.mode.lock() != Mode::Silent {
            self.simulate(line);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

pub fn status_line(stat: i64, p: Coord) -> String {
    format!(
        r#"{{"sr":{{"stat":{},"posx":{},"posy":{},"posz":{},"posa":{}}}}}"#,
        stat, p.x, p.y, p.z, p.a
    )
}

fn apply_words(mut position: Coord, words: &str) -> Coord {
    for word in words.split_whitespace() {
        let (letter, value) = word.split_at(1);
        let value: f64 = match value.parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        match letter {
            "X" => position.x = value,
            "Y" => position.y = value,
            "Z" => position.z = value,
            "A" => position.a = value,
            _ => {}
        }
    }
    position
}

/// Parse `G0 X.. Y..` out of a `{"gc":...}` frame into axis/value pairs
pub fn motion_words(frame: &str) -> Vec<(char, f64)> {
    let frame: serde_json::Value = serde_json::from_str(frame).unwrap();
    let gcode = frame["gc"].as_str().unwrap();
    gcode
        .strip_prefix("G0")
        .unwrap()
        .split_whitespace()
        .map(|word| {
            let (letter, value) = word.split_at(1);
            (letter.chars().next().unwrap(), value.parse().unwrap())
        })
        .collect()
}

/// Build a controller on top of a fresh simulator
pub async fn fake_controller(
    translator: Box<dyn CoordTranslator>,
    mode: Mode,
) -> (MotionController, Arc<FakeTinyG>) {
    let slot: Arc<Mutex<Option<Arc<FakeTinyG>>>> = Arc::new(Mutex::new(None));
    let fill = slot.clone();
    let controller = MotionController::with_transport(translator, fast_timeouts(), move |handler| {
        async move {
            let fake = Arc::new(FakeTinyG::new(handler, mode));
            *fill.lock() = Some(fake.clone());
            Ok(fake as Arc<dyn Transport>)
        }
    })
    .await
    .unwrap();
    let fake = slot.lock().take().unwrap();
    (controller, fake)
}

/// Responsive simulator, identity pipeline, already homed
pub async fn homed_controller(mode: Mode) -> (MotionController, Arc<FakeTinyG>) {
    let (controller, fake) = fake_controller(identity(), Mode::Responsive).await;
    controller.perform_mechanical_home().await.unwrap();
    fake.set_mode(mode);
    (controller, fake)
}

pub fn assert_coord_eq(actual: Coord, expected: Coord) {
    let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
    assert!(
        close(actual.x, expected.x)
            && close(actual.y, expected.y)
            && close(actual.z, expected.z)
            && close(actual.a, expected.a),
        "expected {}, got {}",
        expected,
        actual
    );
}
