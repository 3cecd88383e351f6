//! Core engine plumbing

mod time;

pub use time::Time;
