pub mod frame;
pub mod joint;

pub use frame::SkeletonFrame;
pub use joint::{ArmJoint, JointKind, JointSample, Side, TrackingState};
