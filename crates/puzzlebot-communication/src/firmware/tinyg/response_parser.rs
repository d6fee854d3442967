//! TinyG Response Parser
//!
//! This module provides parsing of TinyG JSON responses and status reports.
//! Only two shapes matter to the motion controller: status reports (`sr`)
//! and error reports (`er`). Everything else decodes to [`TinyGReport::Other`].

use puzzlebot_core::{Coord, MachineStatus, ProtocolError};
use serde_json::{Map, Value};

/// Decoded status report; the position is in the controller's inner space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    /// Machine status from `stat`
    pub status: MachineStatus,
    /// Raw `posx`/`posy`/`posz`/`posa`
    pub position: Coord,
}

/// Parsed TinyG frame
#[derive(Debug, Clone, PartialEq)]
pub enum TinyGReport {
    /// Status report
    Status(StatusReport),
    /// Error report; its presence alone is the signal
    Fault(Value),
    /// Acknowledgements, settings and anything else
    Other(Value),
}

/// TinyG response parser
#[derive(Debug, Default, Clone, Copy)]
pub struct TinyGResponseParser;

impl TinyGResponseParser {
    /// Parse one trimmed line
    pub fn parse(line: &str) -> Result<TinyGReport, ProtocolError> {
        let json: Value =
            serde_json::from_str(line.trim()).map_err(|e| ProtocolError::ResponseParseError {
                reason: e.to_string(),
            })?;

        let obj = json
            .as_object()
            .ok_or_else(|| ProtocolError::ResponseParseError {
                reason: "response is not a JSON object".to_string(),
            })?;

        // Replies to requests arrive wrapped in an {"r": {...}} envelope
        let sr = obj
            .get("sr")
            .or_else(|| obj.get("r").and_then(|r| r.get("sr")));
        if let Some(sr) = sr {
            return Self::parse_status_report(sr).map(TinyGReport::Status);
        }

        if obj.contains_key("er") {
            return Ok(TinyGReport::Fault(json));
        }

        Ok(TinyGReport::Other(json))
    }

    /// Decode the body of an `sr` object
    pub fn parse_status_report(sr: &Value) -> Result<StatusReport, ProtocolError> {
        let sr = sr
            .as_object()
            .ok_or_else(|| ProtocolError::ResponseParseError {
                reason: "status report is not an object".to_string(),
            })?;

        let code = sr
            .get("stat")
            .and_then(status_code)
            .ok_or(ProtocolError::MissingField { field: "stat" })?;
        let status = MachineStatus::from_code(code)?;

        let position = Coord::new(
            number(sr, "posx")?,
            number(sr, "posy")?,
            number(sr, "posz")?,
            number(sr, "posa")?,
        );

        Ok(StatusReport { status, position })
    }
}

fn status_code(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

fn number(obj: &Map<String, Value>, field: &'static str) -> Result<f64, ProtocolError> {
    obj.get(field)
        .and_then(Value::as_f64)
        .ok_or(ProtocolError::MissingField { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_report() {
        let report = TinyGResponseParser::parse(
            r#"{"sr":{"stat":5,"posx":10.5,"posy":20,"posz":-1.25,"posa":90}}"#,
        )
        .unwrap();
        assert_eq!(
            report,
            TinyGReport::Status(StatusReport {
                status: MachineStatus::Run,
                position: Coord::new(10.5, 20.0, -1.25, 90.0),
            })
        );
    }

    #[test]
    fn test_parse_enveloped_status_report() {
        let report = TinyGResponseParser::parse(
            r#"{"r":{"sr":{"stat":3,"posx":0,"posy":0,"posz":0,"posa":0}},"f":[1,0,8]}"#,
        )
        .unwrap();
        assert!(matches!(
            report,
            TinyGReport::Status(StatusReport {
                status: MachineStatus::Stop,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_fault() {
        let report = TinyGResponseParser::parse(r#"{"er":{}}"#).unwrap();
        assert!(matches!(report, TinyGReport::Fault(_)));

        let report =
            TinyGResponseParser::parse(r#"{"er":{"fb":440.2,"st":27,"msg":"Limit hit"}}"#)
                .unwrap();
        assert!(matches!(report, TinyGReport::Fault(_)));
    }

    #[test]
    fn test_parse_other() {
        let report = TinyGResponseParser::parse(r#"{"r":{"gc":"M3"},"f":[1,0,4]}"#).unwrap();
        assert!(matches!(report, TinyGReport::Other(_)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            TinyGResponseParser::parse("not json"),
            Err(ProtocolError::ResponseParseError { .. })
        ));
        assert!(matches!(
            TinyGResponseParser::parse("[1,2,3]"),
            Err(ProtocolError::ResponseParseError { .. })
        ));
        assert_eq!(
            TinyGResponseParser::parse(r#"{"sr":{"stat":3,"posx":0,"posy":0,"posz":0}}"#),
            Err(ProtocolError::MissingField { field: "posa" })
        );
        assert_eq!(
            TinyGResponseParser::parse(r#"{"sr":{"posx":0,"posy":0,"posz":0,"posa":0}}"#),
            Err(ProtocolError::MissingField { field: "stat" })
        );
        assert_eq!(
            TinyGResponseParser::parse(
                r#"{"sr":{"stat":77,"posx":0,"posy":0,"posz":0,"posa":0}}"#
            ),
            Err(ProtocolError::UnknownStatus { code: 77 })
        );
    }
}
