use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::config::{MotorBinding, MotorsConfig};
use crate::control::Axis;
use crate::error::ControlError;

/// ブリックの出力ポート
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorPort {
    A,
    B,
    C,
    D,
}

impl MotorPort {
    pub fn as_str(self) -> &'static str {
        match self {
            MotorPort::A => "A",
            MotorPort::B => "B",
            MotorPort::C => "C",
            MotorPort::D => "D",
        }
    }
}

impl FromStr for MotorPort {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(MotorPort::A),
            "B" => Ok(MotorPort::B),
            "C" => Ok(MotorPort::C),
            "D" => Ok(MotorPort::D),
            _ => Err(ControlError::invalid_config(format!("unknown motor port: {:?}", s))),
        }
    }
}

impl fmt::Display for MotorPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 物理モーター1台
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Motor {
    pub brick: u8,
    pub port: MotorPort,
}

impl fmt::Display for Motor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.brick, self.port)
    }
}

/// 軸 → 物理モーターの対応（検証済み）
#[derive(Debug, Clone, PartialEq)]
pub struct MotorMap {
    motors: HashMap<Axis, Vec<Motor>>,
}

impl MotorMap {
    /// 全軸が割り当て済みで、同じモーターを複数軸で共有していないこと
    pub fn from_config(config: &MotorsConfig) -> Result<Self, ControlError> {
        let bindings = [
            (Axis::X, &config.x),
            (Axis::Y, &config.y),
            (Axis::Z, &config.z),
            (Axis::Gripper, &config.gripper),
        ];

        let mut motors = HashMap::new();
        let mut owner: HashMap<Motor, Axis> = HashMap::new();
        for (axis, binding) in bindings {
            let binding = binding
                .as_ref()
                .ok_or_else(|| ControlError::invalid_config(format!("no motor mapped for axis {}", axis)))?;
            let resolved = Self::resolve(axis, binding)?;
            for motor in &resolved {
                if let Some(other) = owner.insert(*motor, axis) {
                    return Err(ControlError::invalid_config(format!(
                        "motor {} is mapped to both {} and {}",
                        motor, other, axis
                    )));
                }
            }
            motors.insert(axis, resolved);
        }
        Ok(Self { motors })
    }

    fn resolve(axis: Axis, binding: &MotorBinding) -> Result<Vec<Motor>, ControlError> {
        if binding.ports.is_empty() {
            return Err(ControlError::invalid_config(format!("axis {} has no ports", axis)));
        }
        binding
            .ports
            .iter()
            .map(|p| -> Result<Motor, ControlError> {
                Ok(Motor {
                    brick: binding.brick,
                    port: p.parse()?,
                })
            })
            .collect()
    }

    pub fn motors(&self, axis: Axis) -> &[Motor] {
        self.motors.get(&axis).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 使用しているブリック番号（重複なし・昇順）
    pub fn bricks(&self) -> Vec<u8> {
        let mut bricks: Vec<u8> = self.motors.values().flatten().map(|m| m.brick).collect();
        bricks.sort_unstable();
        bricks.dedup();
        bricks
    }
}

impl Default for MotorMap {
    fn default() -> Self {
        let m = |brick, port| Motor { brick, port };
        let motors = HashMap::from([
            (Axis::X, vec![m(0, MotorPort::A)]),
            (Axis::Y, vec![m(0, MotorPort::B), m(0, MotorPort::C)]),
            (Axis::Z, vec![m(0, MotorPort::D)]),
            (Axis::Gripper, vec![m(1, MotorPort::A)]),
        ]);
        Self { motors }
    }
}
