pub mod agent;
pub mod observer;
pub mod sink;

pub use agent::*;
pub use observer::*;
pub use sink::*;
