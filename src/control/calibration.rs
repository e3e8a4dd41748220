use std::time::Instant;

use crate::skeleton::{JointSample, Side};

/// 既定の T ポーズ許容誤差（メートル）
pub const DEFAULT_PRECISION: f32 = 0.05;

/// PoseController が保持するキャリブレーション状態
///
/// `calibrated` は一度 true になると、サイド切替・明示的リセット・
/// ポーズ喪失タイムアウト以外では false に戻らない。
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationState {
    pub active_side: Side,
    pub calibrated: bool,
    pub precision: f32,
    /// 最後に処理できたフレームの時刻
    pub last_frame: Option<Instant>,
}

impl CalibrationState {
    pub fn new(active_side: Side, precision: f32) -> Self {
        Self {
            active_side,
            calibrated: false,
            precision,
            last_frame: None,
        }
    }

    pub fn reset(&mut self) {
        self.calibrated = false;
        self.last_frame = None;
    }
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self::new(Side::default(), DEFAULT_PRECISION)
    }
}

/// shoulder - precision <= value <= shoulder + precision
fn within_band(shoulder: f32, value: f32, precision: f32) -> bool {
    shoulder - precision <= value && value <= shoulder + precision
}

/// 腕を横に伸ばした T ポーズか
///
/// Y 軸と Z 軸それぞれで、肘と手首の両方が肩の ±precision 以内にあること。
/// X 軸（腕の伸びる方向）は見ない。
pub fn is_t_pose(
    shoulder: &JointSample,
    elbow: &JointSample,
    wrist: &JointSample,
    precision: f32,
) -> bool {
    let level = |joint: &JointSample| {
        within_band(shoulder.y(), joint.y(), precision) && within_band(shoulder.z(), joint.z(), precision)
    };
    level(elbow) && level(wrist)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t_pose_within_precision() {
        let shoulder = JointSample::tracked(0.0, 0.0, 0.0);
        let elbow = JointSample::tracked(0.0, 0.02, 0.01);
        let wrist = JointSample::tracked(0.0, 0.01, 0.02);
        assert!(is_t_pose(&shoulder, &elbow, &wrist, 0.05));
    }

    #[test]
    fn test_t_pose_ignores_x() {
        let shoulder = JointSample::tracked(0.2, 0.4, 2.0);
        let elbow = JointSample::tracked(0.5, 0.41, 2.01);
        let wrist = JointSample::tracked(0.8, 0.39, 1.99);
        assert!(is_t_pose(&shoulder, &elbow, &wrist, 0.05));
    }

    #[test]
    fn test_t_pose_wrist_too_low() {
        let shoulder = JointSample::tracked(0.0, 0.0, 0.0);
        let elbow = JointSample::tracked(0.0, 0.0, 0.0);
        let wrist = JointSample::tracked(0.0, -0.3, 0.0);
        assert!(!is_t_pose(&shoulder, &elbow, &wrist, 0.05));
    }

    #[test]
    fn test_t_pose_elbow_forward() {
        let shoulder = JointSample::tracked(0.0, 0.0, 2.0);
        let elbow = JointSample::tracked(0.0, 0.0, 1.8);
        let wrist = JointSample::tracked(0.0, 0.0, 2.0);
        assert!(!is_t_pose(&shoulder, &elbow, &wrist, 0.05));
    }

    #[test]
    fn test_t_pose_wrist_behind_shoulder() {
        let shoulder = JointSample::tracked(0.2, 0.4, 2.0);
        let elbow = JointSample::tracked(0.5, 0.4, 2.0);
        let wrist = JointSample::tracked(0.8, 0.4, 2.1);
        assert!(!is_t_pose(&shoulder, &elbow, &wrist, 0.05));
        // x の差は見ない
        let wrist = JointSample::tracked(-3.0, 0.4, 2.0);
        assert!(is_t_pose(&shoulder, &elbow, &wrist, 0.05));
    }

    #[test]
    fn test_t_pose_band_is_inclusive() {
        let shoulder = JointSample::tracked(0.0, 0.5, 0.5);
        let elbow = JointSample::tracked(0.0, 0.5, 0.5);
        let wrist = JointSample::tracked(0.0, 0.25, 0.5);
        assert!(is_t_pose(&shoulder, &elbow, &wrist, 0.25));
        assert!(!is_t_pose(&shoulder, &elbow, &wrist, 0.2));
    }

    #[test]
    fn test_state_reset() {
        let mut state = CalibrationState::default();
        state.calibrated = true;
        state.last_frame = Some(Instant::now());
        state.reset();
        assert!(!state.calibrated);
        assert!(state.last_frame.is_none());
        assert_eq!(state.precision, DEFAULT_PRECISION);
        assert_eq!(state.active_side, Side::Right);
    }
}
