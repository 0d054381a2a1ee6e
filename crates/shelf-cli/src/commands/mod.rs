//! Command handlers

pub mod book;
pub mod config;
pub mod stats;
pub mod status;
