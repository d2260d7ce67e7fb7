// Public API for the terminal binary and integration tests

pub mod banks;
pub mod config;
pub mod prefs;
pub mod reveal;
pub mod round;
pub mod state;
pub mod storage;
pub mod timer;
pub mod transfer;
pub mod types;
pub mod words;
