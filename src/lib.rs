// src/lib.rs

//! tramboard: live tram departure board library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
