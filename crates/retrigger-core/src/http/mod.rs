//! HTTP client for the Drone build server API

pub mod client;

pub use client::DroneClient;
