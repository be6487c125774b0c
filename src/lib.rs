//! Task list library
//!
//! A SQLite-backed task store and the controller that mediates between a
//! front end and that store.

pub mod cli;
pub mod config;
pub mod controller;
pub mod db;
pub mod error;
pub mod format;
pub mod observable;
pub mod store;
pub mod types;
