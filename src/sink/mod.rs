pub mod log;
pub mod motor_map;
pub mod osc;

pub use log::LogSink;
pub use motor_map::{Motor, MotorMap, MotorPort};
pub use osc::{OscSink, OSC_DEFAULT_ADDR};

use anyhow::Result;

use crate::control::ActuatorCommand;

/// アクチュエーター指令の出力先
///
/// Stop を受けたモーターは停止させる。実際の駆動時間などはシンク側の責任。
pub trait ActuatorSink {
    fn apply(&mut self, commands: &[ActuatorCommand]) -> Result<()>;
}
