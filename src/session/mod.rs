pub mod controller;
pub mod hooks;

pub use controller::{SessionController, SessionError};
pub use hooks::{Difficulty, MoveStrategy, NoopObserver, SessionConfig, StateObserver};
