pub mod agents;
pub mod factory;
pub mod renderers;
pub mod webhook;
