//! Wedding Video Generation Backend
//!
//! This library provides the core functionality for the wedding-video-gen
//! service, which orchestrates Runway image-to-video generation, final
//! video composition and delivery to the couple.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
