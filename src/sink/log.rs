use anyhow::Result;

use super::motor_map::MotorMap;
use super::ActuatorSink;
use crate::control::ActuatorCommand;

/// ハードウェアに送らず、指令をログに出すだけのシンク（--dry-run 用）
#[derive(Debug, Default)]
pub struct LogSink {
    map: MotorMap,
    /// 直近に受け取った指令
    last: Vec<ActuatorCommand>,
    applied: usize,
}

impl LogSink {
    pub fn new(map: MotorMap) -> Self {
        Self {
            map,
            last: Vec::new(),
            applied: 0,
        }
    }

    pub fn last(&self) -> &[ActuatorCommand] {
        &self.last
    }

    /// これまでに受け取った指令の総数
    pub fn applied(&self) -> usize {
        self.applied
    }
}

impl ActuatorSink for LogSink {
    fn apply(&mut self, commands: &[ActuatorCommand]) -> Result<()> {
        for command in commands {
            let motors: Vec<String> = self.map.motors(command.axis).iter().map(|m| m.to_string()).collect();
            tracing::info!("{} -> [{}]", command, motors.join(", "));
        }
        self.last = commands.to_vec();
        self.applied += commands.len();
        Ok(())
    }
}
