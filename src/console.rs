//! Line-oriented operator console
//!
//! One command per line:
//!
//! ```text
//! home
//! move [rel] x=<mm> y=<mm> z=<mm> a=<deg>
//! nudge <dir> [amount]
//! jog <dir>
//! stop
//! pump on|off
//! solenoid on|off
//! reset
//! status
//! help
//! quit
//! ```
//!
//! Directions are `left`, `right`, `top`, `bottom`, `up`, `down`, `cw`, `ccw`.

use anyhow::{anyhow, bail, Context};
use puzzlebot_communication::{JogController, JogDirection, MotionController};
use puzzlebot_core::{CoordCmd, MoveType};
use std::str::FromStr;

pub const HELP: &str = "\
commands:
  home                                  mechanical home of X, Y and Z
  move [rel] x=.. y=.. z=.. a=..        absolute (or relative) move, any subset of axes
  nudge <dir> [amount]                  short synchronous step
  jog <dir>                             run towards the travel limit
  stop                                  cancel the current motion
  pump on|off                           vacuum pump
  solenoid on|off                       pickup solenoid
  reset                                 clear a latched fault (homing required again)
  status                                print position and state
  quit
directions: left right top bottom up down cw ccw";

/// Parsed console command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Home,
    Move(CoordCmd),
    Nudge(JogDirection, Option<f64>),
    Jog(JogDirection),
    Stop,
    Pump(bool),
    Solenoid(bool),
    Reset,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| anyhow!("empty command"))?
            .to_ascii_lowercase();
        let rest: Vec<&str> = words.collect();

        let command = match verb.as_str() {
            "home" => Self::Home,
            "move" => Self::Move(parse_move(&rest)?),
            "nudge" => {
                let direction = direction(rest.first())?;
                let amount = match rest.get(1) {
                    Some(word) => Some(
                        word.parse::<f64>()
                            .with_context(|| format!("invalid nudge amount '{}'", word))?,
                    ),
                    None => None,
                };
                Self::Nudge(direction, amount)
            }
            "jog" => Self::Jog(direction(rest.first())?),
            "stop" => Self::Stop,
            "pump" => Self::Pump(switch(rest.first())?),
            "solenoid" => Self::Solenoid(switch(rest.first())?),
            "reset" => Self::Reset,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => bail!("unknown command '{}'; try 'help'", other),
        };
        Ok(command)
    }
}

fn direction(word: Option<&&str>) -> anyhow::Result<JogDirection> {
    let word = word.ok_or_else(|| anyhow!("missing direction"))?;
    Ok(word.parse::<JogDirection>()?)
}

fn switch(word: Option<&&str>) -> anyhow::Result<bool> {
    match word.map(|w| w.to_ascii_lowercase()).as_deref() {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        _ => bail!("expected 'on' or 'off'"),
    }
}

fn parse_move(words: &[&str]) -> anyhow::Result<CoordCmd> {
    let (move_type, words) = match words.first() {
        Some(w) if w.eq_ignore_ascii_case("rel") => (MoveType::Incremental, &words[1..]),
        _ => (MoveType::Absolute, words),
    };

    let mut axes = [None; 4];
    for word in words {
        let (axis, value) = word
            .split_once('=')
            .ok_or_else(|| anyhow!("expected <axis>=<value>, got '{}'", word))?;
        let slot = match axis.to_ascii_lowercase().as_str() {
            "x" => 0,
            "y" => 1,
            "z" => 2,
            "a" => 3,
            other => bail!("unknown axis '{}'", other),
        };
        let value: f64 = value
            .parse()
            .with_context(|| format!("invalid value for {}: '{}'", axis, value))?;
        axes[slot] = Some(value);
    }

    let [x, y, z, a] = axes;
    let cmd = match move_type {
        MoveType::Absolute => CoordCmd::absolute(x, y, z, a)?,
        MoveType::Incremental => CoordCmd::incremental(x, y, z, a)?,
    };
    Ok(cmd)
}

/// Run one command; returns text to print, if any
pub async fn execute(
    machine: &MotionController,
    jog: &JogController<'_>,
    command: Command,
) -> anyhow::Result<Option<String>> {
    match command {
        Command::Home => machine.perform_mechanical_home().await?,
        Command::Move(cmd) => machine.move_to(&cmd, true).await?,
        Command::Nudge(direction, Some(amount)) => jog.nudge(direction, amount).await?,
        Command::Nudge(direction, None) => jog.nudge_default(direction).await?,
        Command::Jog(direction) => jog.start_jog(direction).await?,
        Command::Stop => jog.stop_jog().await?,
        Command::Pump(true) => machine.turn_pump_on().await?,
        Command::Pump(false) => machine.turn_pump_off().await?,
        Command::Solenoid(true) => machine.engage_solenoid().await?,
        Command::Solenoid(false) => machine.disengage_solenoid().await?,
        Command::Reset => machine.reset(),
        Command::Status => return Ok(Some(status_text(machine))),
        Command::Help => return Ok(Some(HELP.to_string())),
        Command::Quit => {}
    }
    Ok(None)
}

fn status_text(machine: &MotionController) -> String {
    let snapshot = machine.snapshot();
    let mut text = format!(
        "{} [{}] homed={} fault={}",
        snapshot.position, snapshot.status, snapshot.homed, snapshot.fault_latched
    );
    if let Some(reason) = snapshot.connection_lost {
        text.push_str(&format!(" link lost: {}", reason));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzlebot_core::Axis;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("home".parse::<Command>().unwrap(), Command::Home);
        assert_eq!("  STOP ".parse::<Command>().unwrap(), Command::Stop);
        assert_eq!("pump on".parse::<Command>().unwrap(), Command::Pump(true));
        assert_eq!(
            "solenoid OFF".parse::<Command>().unwrap(),
            Command::Solenoid(false)
        );
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_move() {
        let cmd = "move x=10 a=-45.5".parse::<Command>().unwrap();
        let Command::Move(cmd) = cmd else {
            panic!("expected a move");
        };
        assert_eq!(cmd.move_type(), MoveType::Absolute);
        assert_eq!(cmd.get(Axis::X), Some(10.0));
        assert_eq!(cmd.get(Axis::Y), None);
        assert_eq!(cmd.get(Axis::A), Some(-45.5));

        let Command::Move(cmd) = "move rel Y=2".parse::<Command>().unwrap() else {
            panic!("expected a move");
        };
        assert_eq!(cmd.move_type(), MoveType::Incremental);
        assert_eq!(cmd.get(Axis::Y), Some(2.0));
    }

    #[test]
    fn test_parse_jog_and_nudge() {
        assert_eq!(
            "jog ccw".parse::<Command>().unwrap(),
            Command::Jog(JogDirection::Ccw)
        );
        assert_eq!(
            "nudge top".parse::<Command>().unwrap(),
            Command::Nudge(JogDirection::Top, None)
        );
        assert_eq!(
            "nudge left 1.5".parse::<Command>().unwrap(),
            Command::Nudge(JogDirection::Left, Some(1.5))
        );
    }

    #[test]
    fn test_parse_errors() {
        for line in [
            "",
            "fly",
            "move",
            "move x",
            "move q=1",
            "move x=abc",
            "jog",
            "jog sideways",
            "nudge up far",
            "pump maybe",
        ] {
            assert!(line.parse::<Command>().is_err(), "{:?} should not parse", line);
        }
    }
}
