use std::time::{Duration, Instant};

use super::calibration::{is_t_pose, CalibrationState};
use super::command::{ActuatorCommand, Axis, Speed};
use super::scale::SpeedScale;
use crate::config::{Config, GripperReference};
use crate::error::ControlError;
use crate::skeleton::{ArmJoint, JointSample, Side, SkeletonFrame};

/// 1フレームの計算に使うジョイント
struct ArmSamples<'a> {
    shoulder: &'a JointSample,
    elbow: Option<&'a JointSample>,
    wrist: &'a JointSample,
    /// グリッパー軸用（参照腕の肩・手首）
    reference: (&'a JointSample, &'a JointSample),
}

/// 骨格フレーム → アーム指令の変換器
///
/// 状態は Uncalibrated / Calibrated の2つ。T ポーズを検出すると Calibrated になり、
/// 次のフレームから速度指令を出す。Calibrated から戻るのは `set_side`、`reset`、
/// ポーズ喪失タイムアウト（設定時のみ）だけ。
#[derive(Debug, Clone, PartialEq)]
pub struct PoseController {
    state: CalibrationState,
    scale: SpeedScale,
    gripper_scale: SpeedScale,
    gripper_reference: GripperReference,
    gripper_speed: i32,
    gripper_pulse: Duration,
    pose_loss_timeout: Option<Duration>,
}

impl PoseController {
    pub fn new(precision: f32) -> Result<Self, ControlError> {
        let mut config = Config::default();
        config.controller.precision = precision;
        Self::from_config(&config)
    }

    /// 設定から作成。不正な値はここで弾く
    pub fn from_config(config: &Config) -> Result<Self, ControlError> {
        config.controller.validate()?;
        config.gripper.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &Config) -> Self {
        let c = &config.controller;
        let scale = SpeedScale::new(c.gain, c.dead_zone);
        Self {
            state: CalibrationState::new(c.initial_side, c.precision),
            scale,
            gripper_scale: scale.with_divisor(c.gripper_divisor),
            gripper_reference: c.gripper_reference,
            gripper_speed: config.gripper.speed,
            gripper_pulse: Duration::from_millis(config.gripper.pulse_ms),
            pose_loss_timeout: c.pose_loss_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    pub fn is_calibrated(&self) -> bool {
        self.state.calibrated
    }

    pub fn active_side(&self) -> Side {
        self.state.active_side
    }

    /// 操作する腕を切り替える。キャリブレーションはやり直し
    pub fn set_side(&mut self, side: Side) {
        tracing::info!(
            "Active arm: {} -> {} (calibration reset)",
            self.state.active_side,
            side
        );
        self.state.active_side = side;
        self.state.reset();
    }

    pub fn reset(&mut self) {
        if self.state.calibrated {
            tracing::info!("Calibration reset");
        }
        self.state.reset();
    }

    /// グリッパー開閉パルス。未キャリブレーションなら None
    pub fn set_gripper(&self, closed: bool) -> Option<ActuatorCommand> {
        if !self.state.calibrated {
            tracing::debug!("Gripper toggle ignored: not calibrated");
            return None;
        }
        let speed = if closed { self.gripper_speed } else { -self.gripper_speed };
        Some(ActuatorCommand::new(Axis::Gripper, Speed::from_value(speed)).with_duration(self.gripper_pulse))
    }

    pub fn process(&mut self, frame: &SkeletonFrame) -> Result<Vec<ActuatorCommand>, ControlError> {
        self.process_at(frame, Instant::now())
    }

    /// 1フレーム処理する
    ///
    /// 未キャリブレーションなら T ポーズ判定だけ行い空の指令列を返す。
    /// 判定に成功したフレーム自体は指令を出さない。
    /// エラー時は状態を変更しない。
    pub fn process_at(
        &mut self,
        frame: &SkeletonFrame,
        now: Instant,
    ) -> Result<Vec<ActuatorCommand>, ControlError> {
        let timed_out = self.pose_lost(now);
        let calibrated = self.state.calibrated && !timed_out;
        let samples = self.collect(frame, calibrated)?;

        if self.state.calibrated && timed_out {
            tracing::warn!("Pose lost for longer than {:?}, calibration dropped", self.pose_loss_timeout);
            self.state.calibrated = false;
        }
        self.state.last_frame = Some(now);

        if calibrated {
            return Ok(self.commands(&samples));
        }

        if let Some(elbow) = samples.elbow {
            if is_t_pose(samples.shoulder, elbow, samples.wrist, self.state.precision) {
                self.state.calibrated = true;
                tracing::info!("T-pose detected, {} arm calibrated", self.state.active_side);
            }
        }
        Ok(Vec::new())
    }

    fn pose_lost(&self, now: Instant) -> bool {
        match (self.pose_loss_timeout, self.state.last_frame) {
            (Some(timeout), Some(last)) => now.saturating_duration_since(last) > timeout,
            _ => false,
        }
    }

    /// 必要なジョイントを先にすべて検証する
    fn collect<'a>(&self, frame: &'a SkeletonFrame, calibrated: bool) -> Result<ArmSamples<'a>, ControlError> {
        let side = self.state.active_side;
        let shoulder = frame.require_arm(side, ArmJoint::Shoulder)?;
        let elbow = if calibrated {
            None
        } else {
            Some(frame.require_arm(side, ArmJoint::Elbow)?)
        };
        let wrist = frame.require_arm(side, ArmJoint::Wrist)?;

        let reference_side = self.gripper_reference.resolve(side);
        let reference = if !calibrated || reference_side == side {
            (shoulder, wrist)
        } else {
            (
                frame.require_arm(reference_side, ArmJoint::Shoulder)?,
                frame.require_arm(reference_side, ArmJoint::Wrist)?,
            )
        };

        tracing::trace!(
            side = %side,
            shoulder = ?shoulder.position,
            elbow = ?elbow.map(|e| e.position),
            wrist = ?wrist.position,
            hand = ?frame.get(ArmJoint::Hand.on(side)).map(|h| h.position),
            "arm joints"
        );

        Ok(ArmSamples {
            shoulder,
            elbow,
            wrist,
            reference,
        })
    }

    fn commands(&self, samples: &ArmSamples<'_>) -> Vec<ActuatorCommand> {
        let dx = samples.shoulder.x() - samples.wrist.x();
        let dy = samples.shoulder.y() - samples.wrist.y();
        let dz = samples.shoulder.z() - samples.wrist.z();
        let (ref_shoulder, ref_wrist) = samples.reference;
        let dg = ref_shoulder.x() - ref_wrist.x();

        vec![
            ActuatorCommand::new(Axis::X, self.scale.apply(dx)),
            ActuatorCommand::new(Axis::Y, self.scale.apply(dy)),
            ActuatorCommand::new(Axis::Z, self.scale.apply(dz)),
            ActuatorCommand::new(Axis::Gripper, self.gripper_scale.apply(dg)),
        ]
    }
}

impl Default for PoseController {
    fn default() -> Self {
        Self::build(&Config::default())
    }
}
