//! Binary array schema (`.hlar`) and integrity utilities
//!
//! Every backing array is stored as one little-endian file:
//!
//! | offset | size | field |
//! |--------|------|-------|
//! | 0 | 4 | magic `HLAR` |
//! | 4 | 4 | schema version (`u32`, current: 1) |
//! | 8 | 1 | element type (0 = `f64`, 1 = `i64`) |
//! | 9 | 1 | number of dimensions |
//! | 10 | 2 | reserved |
//! | 12 | 4 | CRC32 of the data section |
//! | 16 | 8 | element count (`u64`) |
//! | 24 | 8 × ndim | shape (`u64` per axis) |
//! | … | 8 × count | row-major data |
//!
//! Integer payloads (index tables, snip lists) are widened to `f64` on decode.

use crate::{
    error::{Result, StorageError},
    magic,
    traits::RawArray,
};

use ndarray::IxDyn;

/// Size of the fixed part of the header, in bytes
pub const HEADER_SIZE: usize = 24;

/// Current schema version
pub const ARRAY_VERSION: u32 = 1;

/// File extension used by [`FileReader`](crate::FileReader)
pub const ARRAY_EXTENSION: &str = "hlar";

const ELEMENT_SIZE: usize = 8;

/// On-disk element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    /// IEEE-754 double
    F64,
    /// Signed 64-bit integer
    I64,
}

impl DType {
    fn code(self) -> u8 {
        match self {
            DType::F64 => 0,
            DType::I64 => 1,
        }
    }

    fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(DType::F64),
            1 => Ok(DType::I64),
            other => Err(StorageError::invalid_format(format!(
                "unknown element type code {}",
                other
            ))),
        }
    }
}

/// Parsed `.hlar` header
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayHeader {
    /// Schema version
    pub version: u32,
    /// Element type
    pub dtype: DType,
    /// Array shape, outermost axis first
    pub shape: Vec<usize>,
    /// CRC32 of the data section
    pub data_checksum: u32,
    /// Number of elements in the data section
    pub element_count: u64,
}

impl ArrayHeader {
    /// Byte offset of the data section
    pub fn data_offset(&self) -> usize {
        HEADER_SIZE + ELEMENT_SIZE * self.shape.len()
    }

    /// Length of the data section in bytes; `None` when it cannot be addressed
    pub fn data_len(&self) -> Option<usize> {
        usize::try_from(self.element_count)
            .ok()?
            .checked_mul(ELEMENT_SIZE)
    }
}

/// Validate magic number for a binary format
pub fn validate_magic(data: &[u8], expected: [u8; 4]) -> Result<()> {
    if data.len() < 4 {
        return Err(StorageError::invalid_format("Data too short for magic number"));
    }

    let found = [data[0], data[1], data[2], data[3]];
    if found != expected {
        return Err(StorageError::InvalidMagic { expected, found });
    }

    Ok(())
}

/// Calculate CRC32 checksum
pub fn calculate_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Validate checksum
pub fn validate_checksum(data: &[u8], expected: u32) -> Result<()> {
    let computed = calculate_checksum(data);
    if computed != expected {
        return Err(StorageError::ChecksumMismatch { expected, computed });
    }
    Ok(())
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

fn le_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

/// Parse and sanity-check the header at the start of `bytes`
pub fn parse_header(bytes: &[u8]) -> Result<ArrayHeader> {
    if bytes.len() < HEADER_SIZE {
        return Err(StorageError::invalid_format(format!(
            "Array file too small: {} bytes",
            bytes.len()
        )));
    }

    validate_magic(bytes, magic::HLAR)?;

    let version = le_u32(bytes, 4);
    if version != ARRAY_VERSION {
        return Err(StorageError::UnsupportedVersion {
            version,
            supported: ARRAY_VERSION,
        });
    }

    let dtype = DType::from_code(bytes[8])?;
    let ndim = bytes[9] as usize;
    let data_checksum = le_u32(bytes, 12);
    let element_count = le_u64(bytes, 16);

    let shape_end = HEADER_SIZE + ELEMENT_SIZE * ndim;
    if bytes.len() < shape_end {
        return Err(StorageError::invalid_format("Array shape truncated"));
    }

    let shape: Vec<usize> = (0..ndim)
        .map(|axis| le_u64(bytes, HEADER_SIZE + ELEMENT_SIZE * axis) as usize)
        .collect();

    let expected = shape
        .iter()
        .try_fold(1u64, |acc, &n| acc.checked_mul(n as u64))
        .ok_or_else(|| {
            StorageError::invalid_format(format!("Array shape {:?} overflows the element count", shape))
        })?;
    if expected != element_count {
        return Err(StorageError::invalid_format(format!(
            "Inconsistent element count: shape {:?} implies {}, header says {}",
            shape, expected, element_count
        )));
    }

    Ok(ArrayHeader {
        version,
        dtype,
        shape,
        data_checksum,
        element_count,
    })
}

/// Decode a complete `.hlar` buffer into an array, verifying its checksum
pub fn decode_array(bytes: &[u8]) -> Result<RawArray> {
    let header = parse_header(bytes)?;

    let start = header.data_offset();
    let end = header
        .data_len()
        .and_then(|len| start.checked_add(len))
        .ok_or_else(|| {
            StorageError::invalid_format(format!(
                "Array data of {} elements exceeds the addressable size",
                header.element_count
            ))
        })?;
    if bytes.len() < end {
        return Err(StorageError::invalid_format(format!(
            "Array data truncated: need {} bytes, got {}",
            end,
            bytes.len()
        )));
    }

    let data = &bytes[start..end];
    validate_checksum(data, header.data_checksum)?;

    let values: Vec<f64> = data
        .chunks_exact(ELEMENT_SIZE)
        .map(|chunk| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            match header.dtype {
                DType::F64 => f64::from_le_bytes(buf),
                DType::I64 => i64::from_le_bytes(buf) as f64,
            }
        })
        .collect();

    RawArray::from_shape_vec(IxDyn(&header.shape), values)
        .map_err(|e| StorageError::invalid_format(format!("Bad array shape: {}", e)))
}

/// Encode an array as a `.hlar` buffer.
///
/// Only used to produce fixtures and test data; catalogs are read-only.
/// With [`DType::I64`] values are truncated toward zero.
pub fn encode_array(array: &RawArray, dtype: DType) -> Vec<u8> {
    let ndim = array.ndim();
    let mut data = Vec::with_capacity(array.len() * ELEMENT_SIZE);
    for &value in array.iter() {
        match dtype {
            DType::F64 => data.extend_from_slice(&value.to_le_bytes()),
            DType::I64 => data.extend_from_slice(&(value as i64).to_le_bytes()),
        }
    }

    let mut out = Vec::with_capacity(HEADER_SIZE + ELEMENT_SIZE * ndim + data.len());
    out.extend_from_slice(&magic::HLAR);
    out.extend_from_slice(&ARRAY_VERSION.to_le_bytes());
    out.push(dtype.code());
    out.push(ndim as u8);
    out.extend_from_slice(&[0u8; 2]);
    out.extend_from_slice(&calculate_checksum(&data).to_le_bytes());
    out.extend_from_slice(&(array.len() as u64).to_le_bytes());
    for &n in array.shape() {
        out.extend_from_slice(&(n as u64).to_le_bytes());
    }
    out.extend_from_slice(&data);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, Array2};
    use proptest::prelude::*;

    /// Header bytes for an arbitrary shape and count, with no data section
    fn raw_header(shape: &[u64], element_count: u64) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&magic::HLAR);
        out.extend_from_slice(&ARRAY_VERSION.to_le_bytes());
        out.push(DType::F64.code());
        out.push(shape.len() as u8);
        out.extend_from_slice(&[0u8; 2]);
        out.extend_from_slice(&calculate_checksum(&[]).to_le_bytes());
        out.extend_from_slice(&element_count.to_le_bytes());
        for &n in shape {
            out.extend_from_slice(&n.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_validate_magic() {
        assert!(validate_magic(b"HLAR....", magic::HLAR).is_ok());
        assert!(matches!(
            validate_magic(b"NOPE", magic::HLAR),
            Err(StorageError::InvalidMagic { .. })
        ));
        assert!(validate_magic(b"HL", magic::HLAR).is_err());
    }

    #[test]
    fn test_checksum() {
        let data = b"catalog";
        let sum = calculate_checksum(data);
        assert!(validate_checksum(data, sum).is_ok());
        assert!(validate_checksum(data, sum ^ 1).is_err());
    }

    #[test]
    fn test_header_layout() {
        let array = arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).into_dyn();
        let bytes = encode_array(&array, DType::F64);
        assert_eq!(bytes.len(), HEADER_SIZE + 2 * 8 + 6 * 8);

        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.version, ARRAY_VERSION);
        assert_eq!(header.dtype, DType::F64);
        assert_eq!(header.shape, vec![2, 3]);
        assert_eq!(header.element_count, 6);
        assert_eq!(header.data_offset(), HEADER_SIZE + 16);
    }

    #[test]
    fn test_decode_preserves_nan_and_layout() {
        let array = arr2(&[[1.5, f64::NAN], [-1.0, 1e12]]).into_dyn();
        let decoded = decode_array(&encode_array(&array, DType::F64)).unwrap();
        assert_eq!(decoded.shape(), &[2, 2]);
        assert_eq!(decoded[[0, 0]], 1.5);
        assert!(decoded[[0, 1]].is_nan());
        assert_eq!(decoded[[1, 0]], -1.0);
        assert_eq!(decoded[[1, 1]], 1e12);
    }

    #[test]
    fn test_integer_payload_widens() {
        let array = arr1(&[3.0, -1.0, 7.9]).into_dyn();
        let decoded = decode_array(&encode_array(&array, DType::I64)).unwrap();
        assert_eq!(decoded.as_slice().unwrap(), &[3.0, -1.0, 7.0]);
    }

    #[test]
    fn test_corrupted_data_detected() {
        let array = arr1(&[1.0, 2.0]).into_dyn();
        let mut bytes = encode_array(&array, DType::F64);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert!(matches!(
            decode_array(&bytes),
            Err(StorageError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_truncated_data_detected() {
        let array = arr1(&[1.0, 2.0, 3.0]).into_dyn();
        let bytes = encode_array(&array, DType::F64);
        let err = decode_array(&bytes[..bytes.len() - 8]).unwrap_err();
        assert!(matches!(err, StorageError::InvalidFormat { .. }));
    }

    #[test]
    fn test_unsupported_version() {
        let array = arr1(&[1.0]).into_dyn();
        let mut bytes = encode_array(&array, DType::F64);
        bytes[4] = 9;
        assert!(matches!(
            parse_header(&bytes),
            Err(StorageError::UnsupportedVersion { version: 9, .. })
        ));
    }

    #[test]
    fn test_inconsistent_count() {
        let array = arr1(&[1.0, 2.0]).into_dyn();
        let mut bytes = encode_array(&array, DType::F64);
        bytes[16] = 5;
        assert!(parse_header(&bytes).is_err());
    }

    #[test]
    fn test_overflowing_shape_is_invalid() {
        let bytes = raw_header(&[1 << 33, 1 << 33], 0);
        assert!(matches!(
            parse_header(&bytes),
            Err(StorageError::InvalidFormat { .. })
        ));
        assert!(matches!(
            decode_array(&bytes),
            Err(StorageError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_unaddressable_data_is_invalid() {
        let bytes = raw_header(&[1 << 61], 1 << 61);
        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.data_len(), None);
        assert!(matches!(
            decode_array(&bytes),
            Err(StorageError::InvalidFormat { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_decode_matches_encoded_matrix(
            rows in 1usize..6,
            cols in 1usize..6,
            seed in prop::collection::vec(-1.0e12f64..1.0e12, 36),
        ) {
            let values: Vec<f64> = seed.into_iter().take(rows * cols).collect();
            let array = Array2::from_shape_vec((rows, cols), values).unwrap().into_dyn();
            let decoded = decode_array(&encode_array(&array, DType::F64)).unwrap();
            prop_assert_eq!(decoded, array);
        }

        #[test]
        fn prop_truncation_is_an_error(cut in 0usize..(HEADER_SIZE + 2 * 8 + 4 * 8)) {
            let array = arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn();
            let bytes = encode_array(&array, DType::F64);
            prop_assert!(decode_array(&bytes[..cut]).is_err());
        }
    }
}
