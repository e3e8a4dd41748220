use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::control::DEFAULT_PRECISION;
use crate::error::ControlError;
use crate::sink::OSC_DEFAULT_ADDR;
use crate::skeleton::Side;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub gripper: GripperConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub motors: MotorsConfig,
}

/// グリッパー軸の変位をどちらの腕から取るか
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GripperReference {
    /// 操作中の腕
    #[default]
    Active,
    Left,
    Right,
}

impl GripperReference {
    pub fn resolve(self, active: Side) -> Side {
        match self {
            GripperReference::Active => active,
            GripperReference::Left => Side::Left,
            GripperReference::Right => Side::Right,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    /// Tポーズ判定の許容誤差（メートル）
    #[serde(default = "default_precision")]
    pub precision: f32,
    /// 変位 → 速度のゲイン
    #[serde(default = "default_gain")]
    pub gain: f32,
    /// この絶対値未満の速度は停止扱い
    #[serde(default = "default_dead_zone")]
    pub dead_zone: i32,
    /// グリッパー軸の感度除数
    #[serde(default = "default_gripper_divisor")]
    pub gripper_divisor: i32,
    #[serde(default)]
    pub gripper_reference: GripperReference,
    #[serde(default)]
    pub initial_side: Side,
    /// 前フレームからこの時間が空いたらキャリブレーションを解除（未設定なら解除しない）
    #[serde(default)]
    pub pose_loss_timeout_ms: Option<u64>,
}

fn default_precision() -> f32 { DEFAULT_PRECISION }
fn default_gain() -> f32 { 100.0 }
fn default_dead_zone() -> i32 { 10 }
fn default_gripper_divisor() -> i32 { 2 }

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            gain: default_gain(),
            dead_zone: default_dead_zone(),
            gripper_divisor: default_gripper_divisor(),
            gripper_reference: GripperReference::default(),
            initial_side: Side::default(),
            pose_loss_timeout_ms: None,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ControlError> {
        if !self.precision.is_finite() || self.precision <= 0.0 {
            return Err(ControlError::invalid_config(format!(
                "precision must be a positive number, got {}",
                self.precision
            )));
        }
        if !self.gain.is_finite() || self.gain <= 0.0 {
            return Err(ControlError::invalid_config(format!(
                "gain must be a positive number, got {}",
                self.gain
            )));
        }
        if !(0..=100).contains(&self.dead_zone) {
            return Err(ControlError::invalid_config(format!(
                "dead_zone must be within 0..=100, got {}",
                self.dead_zone
            )));
        }
        if self.gripper_divisor <= 0 {
            return Err(ControlError::invalid_config(format!(
                "gripper_divisor must be >= 1, got {}",
                self.gripper_divisor
            )));
        }
        if self.pose_loss_timeout_ms == Some(0) {
            return Err(ControlError::invalid_config("pose_loss_timeout_ms must be > 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GripperConfig {
    /// 開閉時の速度（絶対値）
    #[serde(default = "default_gripper_speed")]
    pub speed: i32,
    /// 開閉パルスの長さ
    #[serde(default = "default_gripper_pulse_ms")]
    pub pulse_ms: u64,
}

fn default_gripper_speed() -> i32 { 5 }
fn default_gripper_pulse_ms() -> u64 { 300 }

impl Default for GripperConfig {
    fn default() -> Self {
        Self {
            speed: default_gripper_speed(),
            pulse_ms: default_gripper_pulse_ms(),
        }
    }
}

impl GripperConfig {
    pub fn validate(&self) -> Result<(), ControlError> {
        if !(1..=100).contains(&self.speed) {
            return Err(ControlError::invalid_config(format!(
                "gripper speed must be within 1..=100, got {}",
                self.speed
            )));
        }
        if self.pulse_ms == 0 {
            return Err(ControlError::invalid_config("gripper pulse_ms must be > 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SinkConfig {
    /// ブリッジプロセスの OSC 受信アドレス
    #[serde(default = "default_sink_addr")]
    pub addr: String,
    /// 速度指令1回あたりのステップ時間
    #[serde(default = "default_step_ms")]
    pub step_ms: u64,
    /// 起動時にブリックのビープを鳴らす
    #[serde(default = "default_startup_tone")]
    pub startup_tone: bool,
}

fn default_sink_addr() -> String { OSC_DEFAULT_ADDR.to_string() }
fn default_step_ms() -> u64 { 1000 }
fn default_startup_tone() -> bool { true }

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            addr: default_sink_addr(),
            step_ms: default_step_ms(),
            startup_tone: default_startup_tone(),
        }
    }
}

/// 軸 1 本ぶんのモーター割り当て
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct MotorBinding {
    #[serde(default)]
    pub brick: u8,
    pub ports: Vec<String>,
}

impl MotorBinding {
    fn new(brick: u8, ports: &[&str]) -> Self {
        Self {
            brick,
            ports: ports.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// 軸 → モーターの対応。欠けた軸は検証で弾く
#[derive(Debug, Deserialize, Clone)]
pub struct MotorsConfig {
    pub x: Option<MotorBinding>,
    pub y: Option<MotorBinding>,
    pub z: Option<MotorBinding>,
    pub gripper: Option<MotorBinding>,
}

impl Default for MotorsConfig {
    fn default() -> Self {
        Self {
            x: Some(MotorBinding::new(0, &["A"])),
            y: Some(MotorBinding::new(0, &["B", "C"])),
            z: Some(MotorBinding::new(0, &["D"])),
            gripper: Some(MotorBinding::new(1, &["A"])),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// ファイルが無ければ既定値。読めるのに壊れている場合はエラー
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// 起動時に一度だけ呼ぶ。モーター割り当ては MotorMap 側で検証する
    pub fn validate(&self) -> Result<(), ControlError> {
        self.controller.validate()?;
        self.gripper.validate()?;
        if self.sink.step_ms == 0 {
            return Err(ControlError::invalid_config("sink step_ms must be > 0"));
        }
        Ok(())
    }
}
