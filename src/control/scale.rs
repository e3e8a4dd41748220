use super::command::{Speed, MAX_SPEED};

/// 変位 → 速度の変換パラメータ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedScale {
    /// 変位（メートル）に掛けるゲイン
    pub gain: f32,
    /// この絶対値未満は Stop
    pub dead_zone: i32,
    /// 切り捨て後の値をこの数で割る（グリッパーは 2）
    pub divisor: i32,
}

impl SpeedScale {
    pub const DEFAULT_GAIN: f32 = 100.0;
    pub const DEFAULT_DEAD_ZONE: i32 = 10;

    pub fn new(gain: f32, dead_zone: i32) -> Self {
        Self {
            gain,
            dead_zone,
            divisor: 1,
        }
    }

    pub fn with_divisor(mut self, divisor: i32) -> Self {
        self.divisor = divisor;
        self
    }

    /// raw * gain を切り捨て → divisor で割る → クランプ → デッドゾーン
    pub fn apply(&self, raw: f32) -> Speed {
        // `as` は範囲外を飽和させ、NaN は 0 になる
        let scaled = (raw * self.gain).trunc() as i32;
        let value = (scaled / self.divisor).clamp(-MAX_SPEED, MAX_SPEED);
        if value.abs() < self.dead_zone {
            Speed::Stop
        } else {
            Speed::from_value(value)
        }
    }
}

impl Default for SpeedScale {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GAIN, Self::DEFAULT_DEAD_ZONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_in_range() {
        let s = SpeedScale::default();
        assert_eq!(s.apply(0.5), Speed::Run(50));
        assert_eq!(s.apply(-0.5), Speed::Run(-50));
    }

    #[test]
    fn test_scale_dead_zone() {
        let s = SpeedScale::default();
        // 0.05 * 100 = 5 < 10
        assert_eq!(s.apply(0.05), Speed::Stop);
        assert_eq!(s.apply(-0.09), Speed::Stop);
        assert_eq!(s.apply(0.0), Speed::Stop);
    }

    #[test]
    fn test_scale_dead_zone_boundary() {
        let s = SpeedScale::default();
        assert_eq!(s.apply(0.15), Speed::Run(15));
        assert_eq!(s.apply(-0.15), Speed::Run(-15));
    }

    #[test]
    fn test_scale_clamp() {
        let s = SpeedScale::default();
        assert_eq!(s.apply(2.0), Speed::Run(100));
        assert_eq!(s.apply(-2.0), Speed::Run(-100));
        assert_eq!(s.apply(f32::MAX), Speed::Run(100));
    }

    #[test]
    fn test_scale_truncates_toward_zero() {
        let s = SpeedScale::default();
        assert_eq!(s.apply(0.257), Speed::Run(25));
        assert_eq!(s.apply(-0.257), Speed::Run(-25));
    }

    #[test]
    fn test_gripper_half_sensitivity() {
        let s = SpeedScale::default().with_divisor(2);
        assert_eq!(s.apply(0.5), Speed::Run(25));
        // 0.3 * 100 / 2 = 15
        assert_eq!(s.apply(0.3), Speed::Run(15));
        // 0.15 * 100 / 2 = 7 → デッドゾーン
        assert_eq!(s.apply(0.15), Speed::Stop);
        // 4.0 * 100 / 2 = 200 → 100
        assert_eq!(s.apply(4.0), Speed::Run(100));
    }

    #[test]
    fn test_output_always_bounded() {
        let s = SpeedScale::default();
        let mut raw = -3.0f32;
        while raw <= 3.0 {
            let v = s.apply(raw).value();
            assert!((-100..=100).contains(&v), "raw={} gave {}", raw, v);
            if (raw * 100.0).trunc().abs() < 10.0 {
                assert_eq!(s.apply(raw), Speed::Stop);
            }
            raw += 0.013;
        }
    }
}
