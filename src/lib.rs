pub mod config;
pub mod control;
pub mod error;
pub mod feed;
pub mod sink;
pub mod skeleton;
