//! Interactive console for exploring and calling a deployed contract
//! through its ABI.

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod modules;
pub mod ui;

pub use app::{App, Backends, Flow};
