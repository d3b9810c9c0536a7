//! Data models.

pub mod activity;
pub mod buyer;
pub mod config;
pub mod distributor;
pub mod document;
pub mod inventory;
