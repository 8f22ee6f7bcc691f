// src/lib.rs

//! Booksy Tracker Library
//!
//! Probes Booksy city/category listing pages, remembers which combinations
//! were already reported, and ships a PDF of newly opened ones by mail and
//! to remote storage.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
