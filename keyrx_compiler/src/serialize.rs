//! Serializes a compiled `Config` to the `.krx` binary format using `rkyv`
//! for zero-copy deserialization at runtime.

use keyrx_core::config::Config;
use sha2::{Digest, Sha256};

use crate::error::{DeserializeError, SerializeError};

/// Magic bytes for the KRX file format: "KRX\n"
pub const KRX_MAGIC: [u8; 4] = [0x4B, 0x52, 0x58, 0x0A];

/// Current KRX format version
pub const KRX_VERSION: u32 = 1;

/// Size of the KRX file header in bytes.
pub const HEADER_SIZE: usize = 48;

/// Serializes a `Config` to the `.krx` binary format.
///
/// Layout:
/// - 4 bytes: magic (`KRX_MAGIC`)
/// - 4 bytes: format version (`KRX_VERSION`, little-endian)
/// - 32 bytes: SHA256 hash of the data section
/// - 8 bytes: size of the data section (little-endian)
/// - N bytes: `rkyv`-serialized `Config`
pub fn serialize(config: &Config) -> Result<Vec<u8>, SerializeError> {
    let data = rkyv::to_bytes::<_, 4096>(config).map_err(|e| SerializeError::RkyvError(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(&data);
    let hash: [u8; 32] = hasher.finalize().into();

    let size = data.len() as u64;

    let mut output = Vec::with_capacity(HEADER_SIZE + data.len());
    output.extend_from_slice(&KRX_MAGIC);
    output.extend_from_slice(&KRX_VERSION.to_le_bytes());
    output.extend_from_slice(&hash);
    output.extend_from_slice(&size.to_le_bytes());
    output.extend_from_slice(&data);

    Ok(output)
}

/// Deserializes and validates a `.krx` binary file, returning a zero-copy
/// reference to the archived `Config`.
///
/// Validates magic, version, declared size, and data hash before touching
/// `rkyv::archived_root`, which is unsafe and can panic on a malformed
/// archive; the call is wrapped in `catch_unwind` so a corrupted or
/// adversarial file surfaces as `DeserializeError` rather than aborting.
pub fn deserialize(bytes: &[u8]) -> Result<&rkyv::Archived<Config>, DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::RkyvError(format!(
            "file too small: expected at least {HEADER_SIZE} bytes, got {}",
            bytes.len()
        )));
    }

    let magic = &bytes[0..4];
    let version_bytes = &bytes[4..8];
    let embedded_hash = &bytes[8..40];
    let size_bytes = &bytes[40..48];
    let data = &bytes[48..];

    let magic_array: [u8; 4] = magic.try_into().unwrap();
    if magic_array != KRX_MAGIC {
        return Err(DeserializeError::InvalidMagic { expected: KRX_MAGIC, got: magic_array });
    }

    let version = u32::from_le_bytes(version_bytes.try_into().unwrap());
    if version != KRX_VERSION {
        return Err(DeserializeError::VersionMismatch { expected: KRX_VERSION, got: version });
    }

    let expected_size = u64::from_le_bytes(size_bytes.try_into().unwrap()) as usize;
    if data.len() != expected_size {
        return Err(DeserializeError::RkyvError(format!(
            "size mismatch: header says {expected_size} bytes, got {} bytes",
            data.len()
        )));
    }

    if data.len() < 16 {
        return Err(DeserializeError::RkyvError(format!(
            "data section too small: got {} bytes, need at least 16 for a valid rkyv archive",
            data.len()
        )));
    }

    let mut hasher = Sha256::new();
    hasher.update(data);
    let computed_hash: [u8; 32] = hasher.finalize().into();
    let embedded_hash_array: [u8; 32] = embedded_hash.try_into().unwrap();

    if computed_hash != embedded_hash_array {
        return Err(DeserializeError::HashMismatch { expected: embedded_hash_array, computed: computed_hash });
    }

    // TODO(security): migrate to rkyv::check_archived_root once Config and its
    // nested types implement CheckBytes, so malformed archives produce an
    // error instead of relying on catch_unwind.
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| unsafe { rkyv::archived_root::<Config>(data) }))
        .map_err(|_| DeserializeError::RkyvError("malformed archive structure".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyrx_core::config::{keys, Descriptor, GlobalConfig, Layer, LayerType, ModMask, Version};

    fn create_test_config() -> Config {
        Config {
            version: Version::current(),
            layers: vec![Layer {
                name: "main".to_string(),
                kind: LayerType::Layout,
                mods: ModMask::NONE,
                keymap: {
                    let mut keymap = vec![Descriptor::NULL; 256];
                    keymap[keys::A as usize] = Descriptor::keysequence(keys::B, ModMask::NONE);
                    keymap
                },
                chords: Vec::new(),
                constituents: Vec::new(),
            }],
            descriptors: Vec::new(),
            macros: Vec::new(),
            commands: Vec::new(),
            global: GlobalConfig::default(),
            default_layout: Some(0),
        }
    }

    #[test]
    fn serialize_produces_valid_header() {
        let bytes = serialize(&create_test_config()).unwrap();
        assert!(bytes.len() >= HEADER_SIZE);
        assert_eq!(&bytes[0..4], &KRX_MAGIC);
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), KRX_VERSION);
        let size = u64::from_le_bytes(bytes[40..48].try_into().unwrap()) as usize;
        assert_eq!(size, bytes.len() - HEADER_SIZE);
    }

    #[test]
    fn round_trip_preserves_layer_data() {
        let bytes = serialize(&create_test_config()).unwrap();
        let archived = deserialize(&bytes).expect("deserialization failed");
        assert_eq!(archived.layers.len(), 1);
        assert_eq!(archived.layers[0].name.as_str(), "main");
    }

    #[test]
    fn serialization_is_deterministic() {
        let config = create_test_config();
        assert_eq!(serialize(&config).unwrap(), serialize(&config).unwrap());
    }

    #[test]
    fn deserialize_rejects_bad_magic() {
        let mut bytes = serialize(&create_test_config()).unwrap();
        bytes[0] = 0x00;
        assert!(matches!(deserialize(&bytes), Err(DeserializeError::InvalidMagic { .. })));
    }

    #[test]
    fn deserialize_rejects_bad_version() {
        let mut bytes = serialize(&create_test_config()).unwrap();
        bytes[4..8].copy_from_slice(&0xFFFFFFFFu32.to_le_bytes());
        assert!(matches!(deserialize(&bytes), Err(DeserializeError::VersionMismatch { .. })));
    }

    #[test]
    fn deserialize_rejects_tampered_hash() {
        let mut bytes = serialize(&create_test_config()).unwrap();
        bytes[8] = !bytes[8];
        assert!(matches!(deserialize(&bytes), Err(DeserializeError::HashMismatch { .. })));
    }

    #[test]
    fn deserialize_rejects_truncated_file() {
        let bytes = serialize(&create_test_config()).unwrap();
        assert!(matches!(deserialize(&bytes[..30]), Err(DeserializeError::RkyvError(_))));
    }

    #[test]
    fn deserialize_rejects_corrupted_data_section() {
        let mut bytes = serialize(&create_test_config()).unwrap();
        let data_start = HEADER_SIZE + 10;
        if bytes.len() > data_start {
            bytes[data_start] = !bytes[data_start];
        }
        assert!(matches!(deserialize(&bytes), Err(DeserializeError::HashMismatch { .. })));
    }

    #[test]
    fn header_constants_match_the_format() {
        assert_eq!(KRX_MAGIC, [0x4B, 0x52, 0x58, 0x0A]);
        assert_eq!(KRX_VERSION, 1);
        assert_eq!(HEADER_SIZE, 48);
    }
}
