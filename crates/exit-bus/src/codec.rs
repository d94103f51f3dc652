use core::fmt;

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use quorumbus_core_types::Timestamp;

/// The only supported payload format: a packed list of 64-byte records.
pub const DATA_FORMAT_LIST: u64 = 1;

/// Size of one packed exit request record, in bytes.
pub const RECORD_SIZE: usize = 64;

const MODULE_ID_BYTES: usize = 3;
const NODE_OPERATOR_BYTES: usize = 5;
const VALIDATOR_INDEX_BYTES: usize = 8;

/// A 48-byte BLS validator public key.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValidatorPubkey([u8; Self::LENGTH]);

impl ValidatorPubkey {
    /// Length of a validator public key in bytes.
    pub const LENGTH: usize = 48;

    /// Wrap raw key bytes.
    pub const fn new(value: [u8; Self::LENGTH]) -> Self {
        Self(value)
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }
}

impl TryFrom<&[u8]> for ValidatorPubkey {
    type Error = CodecError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let key: [u8; Self::LENGTH] = bytes
            .try_into()
            .map_err(|_| CodecError::InvalidPubkeyLength(bytes.len()))?;

        Ok(Self(key))
    }
}

impl fmt::Display for ValidatorPubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ValidatorPubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValidatorPubkey({self})")
    }
}

/// One validator exit request, the unit of the packed list payload.
///
/// Wire layout of a record, all fields big-endian:
/// 3-byte module id ‖ 5-byte node operator id ‖ 8-byte validator index ‖
/// 48-byte public key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExitRequest {
    /// Staking module the validator belongs to. Zero is invalid.
    pub module_id: u32,

    /// Node operator within the module.
    pub node_operator_id: u64,

    /// Index of the validator on the reported chain.
    pub validator_index: u64,

    /// The validator's public key.
    pub pubkey: ValidatorPubkey,
}

impl ExitRequest {
    /// Append this request's packed record to a buffer.
    ///
    /// Fails if a field does not fit its wire width.
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> Result<(), CodecError> {
        if u64::from(self.module_id) >= 1 << (MODULE_ID_BYTES * 8) {
            return Err(CodecError::FieldOverflow {
                field: "module_id",
                value: u64::from(self.module_id),
            });
        }

        if self.node_operator_id >= 1 << (NODE_OPERATOR_BYTES * 8) {
            return Err(CodecError::FieldOverflow {
                field: "node_operator_id",
                value: self.node_operator_id,
            });
        }

        let mut record = [0; RECORD_SIZE];
        BigEndian::write_uint(&mut record[..MODULE_ID_BYTES], u64::from(self.module_id), MODULE_ID_BYTES);
        BigEndian::write_uint(
            &mut record[MODULE_ID_BYTES..MODULE_ID_BYTES + NODE_OPERATOR_BYTES],
            self.node_operator_id,
            NODE_OPERATOR_BYTES,
        );
        BigEndian::write_u64(
            &mut record[MODULE_ID_BYTES + NODE_OPERATOR_BYTES..RECORD_SIZE - ValidatorPubkey::LENGTH],
            self.validator_index,
        );
        record[RECORD_SIZE - ValidatorPubkey::LENGTH..].copy_from_slice(self.pubkey.as_bytes());

        buf.extend_from_slice(&record);
        Ok(())
    }

    /// Encode a list of requests as a packed payload.
    pub fn encode_list(requests: &[ExitRequest]) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::with_capacity(requests.len() * RECORD_SIZE);

        for request in requests {
            request.encode_into(&mut buf)?;
        }

        Ok(buf)
    }

    fn decode_record(record: &[u8]) -> Result<Self, CodecError> {
        debug_assert_eq!(record.len(), RECORD_SIZE);

        let module_id = BigEndian::read_uint(&record[..MODULE_ID_BYTES], MODULE_ID_BYTES) as u32;
        let node_operator_id = BigEndian::read_uint(
            &record[MODULE_ID_BYTES..MODULE_ID_BYTES + NODE_OPERATOR_BYTES],
            NODE_OPERATOR_BYTES,
        );
        let validator_index = BigEndian::read_u64(
            &record[MODULE_ID_BYTES + NODE_OPERATOR_BYTES
                ..MODULE_ID_BYTES + NODE_OPERATOR_BYTES + VALIDATOR_INDEX_BYTES],
        );
        let pubkey = ValidatorPubkey::try_from(&record[RECORD_SIZE - ValidatorPubkey::LENGTH..])?;

        Ok(Self {
            module_id,
            node_operator_id,
            validator_index,
            pubkey,
        })
    }
}

/// Number of records in a packed payload, checking alignment.
pub fn request_count(data: &[u8]) -> Result<u64, CodecError> {
    if data.len() % RECORD_SIZE != 0 {
        return Err(CodecError::InvalidDataLength(data.len()));
    }

    Ok((data.len() / RECORD_SIZE) as u64)
}

/// Decode the record at the given entry index of a packed payload.
pub fn decode_at(data: &[u8], index: u64) -> Result<ExitRequest, CodecError> {
    let total = request_count(data)?;

    if index >= total {
        return Err(CodecError::IndexOutOfRange { index, total });
    }

    let start = index as usize * RECORD_SIZE;
    ExitRequest::decode_record(&data[start..start + RECORD_SIZE])
}

/// Decode a whole packed payload in record order.
pub fn decode_list(data: &[u8]) -> Result<Vec<ExitRequest>, CodecError> {
    request_count(data)?;

    data.chunks_exact(RECORD_SIZE)
        .map(ExitRequest::decode_record)
        .collect()
}

/// The notification emitted for one delivered exit request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ValidatorExitRequest {
    /// Position of the record within its payload.
    pub index: u64,

    /// The delivered request.
    pub request: ExitRequest,

    /// When the request was delivered.
    pub timestamp: Timestamp,
}

/// Packed payload decoding and encoding failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The declared format is not the packed list format.
    #[error("unsupported exit requests data format {0}")]
    UnsupportedDataFormat(u64),

    /// The payload length is not a multiple of the record size.
    #[error("invalid exit requests data length {0}, expected a multiple of {RECORD_SIZE}")]
    InvalidDataLength(usize),

    /// The entry index points past the end of the payload.
    #[error("exit data index {index} out of range, payload has {total} requests")]
    IndexOutOfRange {
        /// The requested entry index.
        index: u64,
        /// Number of records in the payload.
        total: u64,
    },

    /// A public key was built from a wrong-size byte slice.
    #[error("invalid public key length {0}, expected {len}", len = ValidatorPubkey::LENGTH)]
    InvalidPubkeyLength(usize),

    /// A field value does not fit its wire width.
    #[error("{field} value {value} does not fit its wire width")]
    FieldOverflow {
        /// Name of the overflowing field.
        field: &'static str,
        /// The overflowing value.
        value: u64,
    },
}
