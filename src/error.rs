use std::fmt;

use thiserror::Error;

/// Which of the two Huffman table namespaces a selector refers to.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum TableClass {
    DC,
    AC,
}

impl fmt::Display for TableClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableClass::DC => write!(f, "DC"),
            TableClass::AC => write!(f, "AC"),
        }
    }
}

/// Coarse classification of a decode failure.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The bytes do not form a supported baseline JPEG.
    Format,
    /// A table or component was referenced before being defined.
    Referential,
    /// The input ended early.
    Truncation,
    /// Segments arrived in an order the format forbids.
    Order,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Not a JPEG file (missing SOI marker)")]
    MissingSoi,
    #[error("Malformed JPEG: {0}")]
    Malformed(String),
    #[error("Unsupported JPEG: {0}")]
    Unsupported(String),
    #[error("Invalid Huffman code in entropy-coded data")]
    InvalidHuffmanCode,
    #[error("Quantization table {0} was never defined")]
    MissingQuantizationTable(u8),
    #[error("{class} Huffman table {index} was never defined")]
    MissingHuffmanTable { class: TableClass, index: u8 },
    #[error("Scan references unknown component id {0}")]
    UnknownComponent(u8),
    #[error("Unexpected end of data: {0}")]
    Truncated(&'static str),
    #[error("Scan header encountered before frame header")]
    ScanBeforeFrame,
    #[error("Frame header appears more than once")]
    DuplicateFrame,
    #[error("Image ended without a decodable scan")]
    NoScan,
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::MissingSoi
            | DecodeError::Malformed(_)
            | DecodeError::Unsupported(_)
            | DecodeError::InvalidHuffmanCode => ErrorKind::Format,
            DecodeError::MissingQuantizationTable(_)
            | DecodeError::MissingHuffmanTable { .. }
            | DecodeError::UnknownComponent(_) => ErrorKind::Referential,
            DecodeError::Truncated(_) => ErrorKind::Truncation,
            DecodeError::ScanBeforeFrame | DecodeError::DuplicateFrame | DecodeError::NoScan => {
                ErrorKind::Order
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
