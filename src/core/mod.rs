pub mod app;
pub mod bus;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gateway;
pub mod hints;
pub mod paths;
pub mod retry;
pub mod sequencer;
pub mod snapshot;
pub mod switch;
pub mod view;

#[cfg(test)]
mod testing;
