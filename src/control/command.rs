use std::fmt;
use std::time::Duration;

/// 速度の上限（絶対値）
pub const MAX_SPEED: i32 = 100;

/// アームの独立した運動軸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// 水平回転
    X,
    /// 昇降（モーター2台）
    Y,
    /// 伸縮
    Z,
    /// グリッパー
    Gripper,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::X, Axis::Y, Axis::Z, Axis::Gripper];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
            Axis::Gripper => "gripper",
        };
        f.write_str(s)
    }
}

/// モーター速度。0 は常に Stop で表す
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Stop,
    Run(i32),
}

impl Speed {
    /// 範囲外は [-100, 100] に丸め、0 は Stop にする
    pub fn from_value(value: i32) -> Self {
        match value.clamp(-MAX_SPEED, MAX_SPEED) {
            0 => Speed::Stop,
            v => Speed::Run(v),
        }
    }

    /// Stop は 0
    pub fn value(self) -> i32 {
        match self {
            Speed::Stop => 0,
            Speed::Run(v) => v,
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speed::Stop => f.write_str("stop"),
            Speed::Run(v) => write!(f, "{:+}", v),
        }
    }
}

/// 1軸分のアクチュエーター指令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorCommand {
    pub axis: Axis,
    pub speed: Speed,
    /// None ならシンク側の既定ステップ時間
    pub duration: Option<Duration>,
}

impl ActuatorCommand {
    pub fn new(axis: Axis, speed: Speed) -> Self {
        Self {
            axis,
            speed,
            duration: None,
        }
    }

    pub fn stop(axis: Axis) -> Self {
        Self::new(axis, Speed::Stop)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

impl fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.axis, self.speed)?;
        if let Some(d) = self.duration {
            write!(f, " ({}ms)", d.as_millis())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_from_value_clamps() {
        assert_eq!(Speed::from_value(250), Speed::Run(100));
        assert_eq!(Speed::from_value(-250), Speed::Run(-100));
        assert_eq!(Speed::from_value(42), Speed::Run(42));
    }

    #[test]
    fn test_speed_zero_is_stop() {
        assert_eq!(Speed::from_value(0), Speed::Stop);
        assert_eq!(Speed::Stop.value(), 0);
    }

    #[test]
    fn test_command_display() {
        let cmd = ActuatorCommand::new(Axis::X, Speed::Run(50));
        assert_eq!(cmd.to_string(), "x=+50");
        let cmd = ActuatorCommand::new(Axis::Gripper, Speed::Run(-5))
            .with_duration(Duration::from_millis(300));
        assert_eq!(cmd.to_string(), "gripper=-5 (300ms)");
        assert_eq!(ActuatorCommand::stop(Axis::Y).to_string(), "y=stop");
    }
}
