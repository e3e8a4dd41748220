use std::fmt;

use thiserror::Error;

use crate::skeleton::JointKind;

/// 必須ジョイントが使えない理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    /// フレームに含まれていない
    Absent,
    /// センサーが追跡していない
    NotTracked,
    /// 座標に NaN / inf が含まれる
    NonFinite,
}

impl fmt::Display for MissingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MissingReason::Absent => "absent from frame",
            MissingReason::NotTracked => "not tracked",
            MissingReason::NonFinite => "non-finite position",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("Missing joint {joint}: {reason}")]
    MissingJoint {
        joint: JointKind,
        reason: MissingReason,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ControlError {
    pub fn missing(joint: JointKind, reason: MissingReason) -> Self {
        ControlError::MissingJoint { joint, reason }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        ControlError::InvalidConfiguration(msg.into())
    }
}
