pub mod calibration;
pub mod command;
pub mod controller;
pub mod input;
pub mod scale;
pub mod shared;

pub use calibration::{is_t_pose, CalibrationState, DEFAULT_PRECISION};
pub use command::{ActuatorCommand, Axis, Speed, MAX_SPEED};
pub use controller::PoseController;
pub use input::ControlInput;
pub use scale::SpeedScale;
pub use shared::SharedController;
