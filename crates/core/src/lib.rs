#![forbid(unsafe_code)]

pub mod aggregate;
pub mod completion;
pub mod keys;
pub mod model;
pub mod scoring;
pub mod session_codec;
pub mod shuffle;
pub mod time;

pub use time::Clock;
