//! Agent Comms - adaptive communication and progress orchestration
//!
//! This crate sits between an autonomous agent and the person it works for.
//! It tracks milestone progress, runs multi-round feedback sessions, adapts
//! tone and length to the reader, and plans handoffs once a task finishes.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
