//! Application layer - command handlers orchestrating the ports.

pub mod handlers;
