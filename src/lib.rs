//! YOLO detection over HTTP, plus the dataset probe that exercises it.
//!
//! Laid out as domain / application (use cases + ports) / adapters
//! (axum, ONNX Runtime, reqwest, filesystem).

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
