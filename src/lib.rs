#![allow(clippy::needless_return, clippy::similar_names, clippy::inline_always)]
#![warn(clippy::correctness, clippy::perf, clippy::pedantic, clippy::inline_always)]
#[macro_use]
extern crate log;

pub use crate::api::{jsc_compress, jsc_decompress, CompressStatus};
pub use crate::compressor::{ChromaSubsampling, CompressParams, Compressor};
pub use crate::decompressor::Decompressor;
pub use crate::errors::{JscError, JscResult};
pub use crate::image::{ColorSpace, ComponentSpec, ImageInfo};

mod api;
pub mod arena;
pub mod bitstream;
pub mod coef_controller;
mod color_convert;
pub mod compressor;
pub mod consts;
mod dcoefc;
mod dmain;
mod dpost;
pub mod decompressor;
pub mod downsample;
pub mod entropy;
pub mod errors;
pub mod fdct;
mod huffman;
pub mod idct;
pub mod image;
pub mod markers;
pub mod preprocess;
pub mod progress;
pub mod quant;
pub mod upsample;
