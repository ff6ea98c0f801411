#![forbid(unsafe_code)]

pub mod error;
pub mod gate;
pub mod model;
pub mod quiz;
pub mod scoring;
pub mod shuffle;
pub mod streak;
pub mod time;

pub use error::Error;
pub use time::Clock;
