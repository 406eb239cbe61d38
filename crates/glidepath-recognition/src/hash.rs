//! Short content hash for cache keys.

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Shift-add string hash seeded with 5381, folded to 31 bits and written
/// little-end first in a 64-symbol alphabet.
///
/// Input is consumed as UTF-16 code units from last to first, so keys match
/// those computed by in-page scripts for the same string.
pub fn content_hash(input: &str) -> String {
    let mut hash: u32 = 5381;
    let units: Vec<u16> = input.encode_utf16().collect();
    for unit in units.into_iter().rev() {
        hash = hash
            .wrapping_add(hash.wrapping_shl(5))
            .wrapping_add(u32::from(unit));
    }

    let mut value = hash & 0x7FFF_FFFF;
    let mut out = String::new();
    loop {
        out.push(char::from(ALPHABET[(value & 0x3F) as usize]));
        value >>= 6;
        if value == 0 {
            break;
        }
    }
    out
}
