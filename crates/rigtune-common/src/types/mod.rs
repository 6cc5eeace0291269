//! Core data types for Rigtune

pub mod action;
pub mod mode;
pub mod sample;
