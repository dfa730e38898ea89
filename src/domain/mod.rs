pub mod auth;
pub mod class_index;
pub mod detection;
pub mod errors;
pub mod model;
pub mod summary;
