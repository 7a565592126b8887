// src/capture/mod.rs
//! Image intake: files, stdin and data URIs turned into request-ready payloads.

pub mod encoder;

pub use encoder::{load_image_file, read_image_from, EncodedImage};
