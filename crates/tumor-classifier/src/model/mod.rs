mod block;
mod config;
mod net;

pub use block::{BasicBlock, Downsample, Stage};
pub use config::TumorNetConfig;
pub use net::{TumorNet, TumorNetRecord};
