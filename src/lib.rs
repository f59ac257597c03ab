//! Rotunda inbox core: tone classification, alert thresholds and the
//! backend client around them.

pub mod alerts;
pub mod api;
pub mod config;
pub mod error;
pub mod inbox;
pub mod state;
pub mod tone;
