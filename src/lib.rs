//! Skywatch Library
//!
//! This module exposes the cache, poller, data and CLI modules for use in
//! integration tests.

pub mod cache;
pub mod cli;
pub mod data;
pub mod poller;
