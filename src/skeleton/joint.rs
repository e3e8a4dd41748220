use std::fmt;

use serde::Deserialize;

/// センサー骨格の 20 ジョイント
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum JointKind {
    HipCenter = 0,
    Spine = 1,
    ShoulderCenter = 2,
    Head = 3,
    ShoulderLeft = 4,
    ElbowLeft = 5,
    WristLeft = 6,
    HandLeft = 7,
    ShoulderRight = 8,
    ElbowRight = 9,
    WristRight = 10,
    HandRight = 11,
    HipLeft = 12,
    KneeLeft = 13,
    AnkleLeft = 14,
    FootLeft = 15,
    HipRight = 16,
    KneeRight = 17,
    AnkleRight = 18,
    FootRight = 19,
}

impl JointKind {
    pub const COUNT: usize = 20;

    pub const ALL: [JointKind; JointKind::COUNT] = [
        Self::HipCenter,
        Self::Spine,
        Self::ShoulderCenter,
        Self::Head,
        Self::ShoulderLeft,
        Self::ElbowLeft,
        Self::WristLeft,
        Self::HandLeft,
        Self::ShoulderRight,
        Self::ElbowRight,
        Self::WristRight,
        Self::HandRight,
        Self::HipLeft,
        Self::KneeLeft,
        Self::AnkleLeft,
        Self::FootLeft,
        Self::HipRight,
        Self::KneeRight,
        Self::AnkleRight,
        Self::FootRight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::HipCenter => "HipCenter",
            Self::Spine => "Spine",
            Self::ShoulderCenter => "ShoulderCenter",
            Self::Head => "Head",
            Self::ShoulderLeft => "ShoulderLeft",
            Self::ElbowLeft => "ElbowLeft",
            Self::WristLeft => "WristLeft",
            Self::HandLeft => "HandLeft",
            Self::ShoulderRight => "ShoulderRight",
            Self::ElbowRight => "ElbowRight",
            Self::WristRight => "WristRight",
            Self::HandRight => "HandRight",
            Self::HipLeft => "HipLeft",
            Self::KneeLeft => "KneeLeft",
            Self::AnkleLeft => "AnkleLeft",
            Self::FootLeft => "FootLeft",
            Self::HipRight => "HipRight",
            Self::KneeRight => "KneeRight",
            Self::AnkleRight => "AnkleRight",
            Self::FootRight => "FootRight",
        }
    }

    /// 名前から逆引き（大文字小文字は区別する）
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|j| j.name() == name)
    }
}

impl fmt::Display for JointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 操作に使う腕
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    #[default]
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// 腕の関節（左右共通）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmJoint {
    Shoulder,
    Elbow,
    Wrist,
    Hand,
}

impl ArmJoint {
    /// 指定した側のジョイントへ変換
    pub fn on(self, side: Side) -> JointKind {
        match (side, self) {
            (Side::Left, ArmJoint::Shoulder) => JointKind::ShoulderLeft,
            (Side::Left, ArmJoint::Elbow) => JointKind::ElbowLeft,
            (Side::Left, ArmJoint::Wrist) => JointKind::WristLeft,
            (Side::Left, ArmJoint::Hand) => JointKind::HandLeft,
            (Side::Right, ArmJoint::Shoulder) => JointKind::ShoulderRight,
            (Side::Right, ArmJoint::Elbow) => JointKind::ElbowRight,
            (Side::Right, ArmJoint::Wrist) => JointKind::WristRight,
            (Side::Right, ArmJoint::Hand) => JointKind::HandRight,
        }
    }
}

/// ジョイントの追跡状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum TrackingState {
    #[default]
    Tracked,
    Inferred,
    NotTracked,
}

/// 単一ジョイントのサンプル
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct JointSample {
    /// センサー空間の座標 (x, y, z)、メートル
    pub position: [f32; 3],
    #[serde(default)]
    pub tracking_state: TrackingState,
}

impl JointSample {
    pub fn new(position: [f32; 3], tracking_state: TrackingState) -> Self {
        Self {
            position,
            tracking_state,
        }
    }

    pub fn tracked(x: f32, y: f32, z: f32) -> Self {
        Self::new([x, y, z], TrackingState::Tracked)
    }

    pub fn x(&self) -> f32 {
        self.position[0]
    }

    pub fn y(&self) -> f32 {
        self.position[1]
    }

    pub fn z(&self) -> f32 {
        self.position[2]
    }

    /// Inferred も計算に使える
    pub fn is_usable(&self) -> bool {
        self.tracking_state != TrackingState::NotTracked
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
    }
}
