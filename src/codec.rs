//! SCALE encoding primitives
//!
//! Only the subset the `ethWallet` payload and extrinsic need: compact
//! integers, fixed-width little-endian integers, and length-prefixed byte
//! vectors. Output must match `parity-scale-codec` byte for byte.
//!
//! ## Compact Integer Modes
//!
//! ```text
//! 0 ..= 2^6 - 1    single byte      value << 2
//! 2^6 ..= 2^14 - 1 two bytes (LE)   (value << 2) | 0b01
//! 2^14 ..= 2^30 - 1 four bytes (LE) (value << 2) | 0b10
//! 2^30 ..          big integer      ((n - 4) << 2) | 0b11, then n LE bytes
//! ```

/// Append the compact encoding of `value`
pub fn encode_compact_to(value: u128, out: &mut Vec<u8>) {
    match value {
        0..=0x3f => out.push((value as u8) << 2),
        0x40..=0x3fff => out.extend_from_slice(&(((value as u16) << 2) | 0b01).to_le_bytes()),
        0x4000..=0x3fff_ffff => {
            out.extend_from_slice(&(((value as u32) << 2) | 0b10).to_le_bytes())
        }
        _ => {
            let bytes = value.to_le_bytes();
            let significant = bytes.len() - (value.leading_zeros() as usize / 8);
            out.push((((significant - 4) as u8) << 2) | 0b11);
            out.extend_from_slice(&bytes[..significant]);
        }
    }
}

/// Compact encoding of `value`
pub fn encode_compact(value: u128) -> Vec<u8> {
    let mut out = Vec::with_capacity(17);
    encode_compact_to(value, &mut out);
    out
}

/// Append a `u32` in little-endian
pub fn encode_u32_to(value: u32, out: &mut Vec<u8>) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Append a `Vec<u8>`: compact length followed by the bytes
pub fn encode_bytes_to(bytes: &[u8], out: &mut Vec<u8>) {
    encode_compact_to(bytes.len() as u128, out);
    out.extend_from_slice(bytes);
}
