//! Command interface exposed to the parent.

use crate::mode::Mode;
use serde::{Deserialize, Serialize};

/// Receives pointer offsets from the parent (parallax).
///
/// Implementations must never fail or panic.
pub trait PositionController {
    fn update_position(&mut self, offset_x: f64, offset_y: f64);
}

/// One input from the parent or the user, for scripted playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum VizCommand {
    SetMode { mode: Mode },
    UpdatePosition { x: f64, y: f64 },
    SpinWheel,
    SpinGears,
    HoverPart { index: usize },
    UnhoverPart { index: usize },
    SelectSwatch { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_json() {
        let cmd: VizCommand =
            serde_json::from_str(r#"{"command": "set_mode", "mode": "speed"}"#).unwrap();
        assert_eq!(cmd, VizCommand::SetMode { mode: Mode::Speed });

        let json = serde_json::to_string(&VizCommand::SpinWheel).unwrap();
        assert_eq!(json, r#"{"command":"spin_wheel"}"#);
    }
}
