use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::command::ActuatorCommand;
use super::controller::PoseController;
use super::input::ControlInput;
use crate::error::ControlError;
use crate::skeleton::{Side, SkeletonFrame};

/// フレームスレッドと操作 UI から共有する PoseController
///
/// 全操作が同じロックを取るので、`process` と `set_side` / `set_gripper` は
/// 交互に安全に呼べる。
#[derive(Clone)]
pub struct SharedController {
    inner: Arc<Mutex<PoseController>>,
}

impl SharedController {
    pub fn new(controller: PoseController) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    // 状態は単純な値で、各操作はロック中に整合した状態へ戻すので poison は無視してよい
    fn lock(&self) -> MutexGuard<'_, PoseController> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn process(&self, frame: &SkeletonFrame) -> Result<Vec<ActuatorCommand>, ControlError> {
        self.lock().process(frame)
    }

    pub fn set_side(&self, side: Side) {
        self.lock().set_side(side);
    }

    pub fn set_gripper(&self, closed: bool) -> Option<ActuatorCommand> {
        self.lock().set_gripper(closed)
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    /// 操作入力を反映する。グリッパー操作ならその指令を返す（Quit は呼び出し側が扱う）
    pub fn control(&self, input: ControlInput) -> Option<ActuatorCommand> {
        let mut controller = self.lock();
        match input {
            ControlInput::Side(side) => {
                controller.set_side(side);
                None
            }
            ControlInput::Gripper { closed } => controller.set_gripper(closed),
            ControlInput::Reset => {
                controller.reset();
                None
            }
            ControlInput::Quit => None,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.lock().is_calibrated()
    }

    pub fn active_side(&self) -> Side {
        self.lock().active_side()
    }
}
