//! Decoder for baseline sequential JPEG images.
//!
//! [`decode`] turns a complete JPEG file into a [`PixelGrid`] of RGB pixels.
//! Only 8-bit Huffman-coded baseline frames (SOF0) with one or three
//! components are accepted; everything else fails with a [`DecodeError`].

mod bitstream;
mod color;
mod constants;
mod decoder;
mod error;
mod huffman;
mod idct;
mod image;
mod jpeg;
mod tables;

pub mod bmp;

pub use crate::bitstream::BitReader;
pub use crate::color::{ycbcr_to_rgb, Upsampling};
pub use crate::constants::{Marker, ZIGZAG_TO_NATURAL};
pub use crate::decoder::{
    decode, decode_block, decode_with_options, resolve_scan, DecodeOptions, DecodedBlock, ScanComponent,
};
pub use crate::error::{DecodeError, ErrorKind, Result, TableClass};
pub use crate::huffman::{canonical_codes, HuffmanTree};
pub use crate::idct::{inverse_dct, Tile};
pub use crate::image::{PixelGrid, Rgb};
pub use crate::jpeg::{Component, Frame, Jpeg, ParserState, ScanChannel, ScanHeader, SegmentParser};
pub use crate::tables::{QuantizationTable, TableStore};
