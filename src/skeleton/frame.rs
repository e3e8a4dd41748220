use std::collections::HashMap;

use serde::Deserialize;

use super::joint::{ArmJoint, JointKind, JointSample, Side};
use crate::error::{ControlError, MissingReason};

/// 1体分・1時刻分のジョイント集合
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "RawFrame")]
pub struct SkeletonFrame {
    joints: [Option<JointSample>; JointKind::COUNT],
}

impl SkeletonFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, joint: JointKind, sample: JointSample) {
        self.joints[joint as usize] = Some(sample);
    }

    pub fn remove(&mut self, joint: JointKind) -> Option<JointSample> {
        self.joints[joint as usize].take()
    }

    /// Builder 形式で追加
    pub fn with(mut self, joint: JointKind, sample: JointSample) -> Self {
        self.set(joint, sample);
        self
    }

    pub fn get(&self, joint: JointKind) -> Option<&JointSample> {
        self.joints[joint as usize].as_ref()
    }

    /// 計算に使うジョイントを取り出す。欠損・未追跡・非有限値はエラー
    pub fn require(&self, joint: JointKind) -> Result<&JointSample, ControlError> {
        let sample = self
            .get(joint)
            .ok_or(ControlError::missing(joint, MissingReason::Absent))?;
        if !sample.is_usable() {
            return Err(ControlError::missing(joint, MissingReason::NotTracked));
        }
        if !sample.is_finite() {
            return Err(ControlError::missing(joint, MissingReason::NonFinite));
        }
        Ok(sample)
    }

    pub fn require_arm(&self, side: Side, joint: ArmJoint) -> Result<&JointSample, ControlError> {
        self.require(joint.on(side))
    }
}

/// JSON 上の表現。ジョイント名は文字列キー
#[derive(Debug, Deserialize)]
struct RawFrame {
    joints: HashMap<String, JointSample>,
}

/// 20 ジョイント以外の名前（HandTipRight、Neck など新しいセンサーの追加分）は読み捨てる
impl From<RawFrame> for SkeletonFrame {
    fn from(raw: RawFrame) -> Self {
        let mut frame = SkeletonFrame::new();
        for (name, sample) in raw.joints {
            match JointKind::from_name(&name) {
                Some(joint) => frame.set(joint, sample),
                None => tracing::trace!("Ignoring unknown joint {}", name),
            }
        }
        frame
    }
}
