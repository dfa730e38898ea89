pub mod client;
pub mod fs;
pub mod http;
pub mod onnx;
