// src/lib.rs

//! Classifieds crawler library
//!
//! Discovers listing URLs from a marketplace search, enriches each listing
//! from its detail page and filters the results into a deduplicated store.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod renderer;
pub mod services;
pub mod storage;
pub mod utils;
