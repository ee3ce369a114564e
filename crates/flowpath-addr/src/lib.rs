//! Packed IPv4 address codec.
//!
//! The monitoring API encodes IPv4 addresses as 32-bit integers with the
//! least significant byte holding the first dotted-decimal octet. Flow path
//! steps reuse the same numeric field for 64-bit switch identifiers: any
//! value above [`PACKED_IP_MAX`] is a switch id, everything else is a
//! packed address.

use thiserror::Error;

/// Largest value that still denotes a packed IPv4 address in a path step.
pub const PACKED_IP_MAX: u64 = 0xFFFF_FFFF;

/// The null address; hops decoding to it are never considered resolved.
pub const NULL_ADDR: &str = "0.0.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed IPv4 address: {text:?}")]
pub struct MalformedAddress {
    pub text: String,
}

/// Render a packed address as dotted decimal. Inputs wider than 32 bits are
/// masked to their low 32 bits first.
pub fn decode(packed: u64) -> String {
    let octets = ((packed & PACKED_IP_MAX) as u32).to_le_bytes();
    format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3])
}

/// Pack a dotted-decimal address into its 32-bit wire form. Requires exactly
/// four all-digit octets, each in `[0, 255]`.
pub fn encode(text: &str) -> Result<u32, MalformedAddress> {
    let mut octets = [0u8; 4];
    let mut count = 0;

    for part in text.split('.') {
        if count == 4 {
            return Err(malformed(text));
        }
        if part.is_empty() || part.len() > 3 || !part.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed(text));
        }
        octets[count] = part.parse().map_err(|_| malformed(text))?;
        count += 1;
    }

    if count != 4 {
        return Err(malformed(text));
    }

    Ok(u32::from_le_bytes(octets))
}

/// Whether a path-step value names a switch rather than a packed address.
pub fn is_switch_id(node: u64) -> bool {
    node > PACKED_IP_MAX
}

fn malformed(text: &str) -> MalformedAddress {
    MalformedAddress {
        text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_known_vectors() {
        assert_eq!(decode(1728161984), "192.168.1.103");
        assert_eq!(decode(604088512), "192.168.1.36");
        assert_eq!(decode(3232235777), "1.1.168.192");
        assert_eq!(decode(0), "0.0.0.0");
    }

    #[test]
    fn decode_masks_oversized_input() {
        // low 32 bits are 0x3BBF08B1
        assert_eq!(decode(1062258083825841), "177.8.191.59");
        assert_eq!(decode(u64::MAX), "255.255.255.255");
    }

    #[test]
    fn encode_known_vectors() {
        assert_eq!(encode("192.168.1.103"), Ok(1728161984));
        assert_eq!(encode("192.168.1.36"), Ok(604088512));
        assert_eq!(encode("1.1.168.192"), Ok(3232235777));
        assert_eq!(encode("0.0.0.0"), Ok(0));
        assert_eq!(encode("255.255.255.255"), Ok(0xFFFF_FFFF));
    }

    #[test]
    fn round_trip_decode_encode() {
        for packed in [0u32, 1, 0x0100_000A, 167880896, 0xFFFF_FFFF, 0x8000_0001] {
            assert_eq!(encode(&decode(u64::from(packed))), Ok(packed));
        }
    }

    #[test]
    fn round_trip_encode_decode() {
        for text in ["10.0.0.1", "192.168.1.103", "177.8.191.59", "0.0.0.0"] {
            let packed = encode(text).unwrap();
            assert_eq!(decode(u64::from(packed)), text);
        }
    }

    #[test]
    fn encode_rejects_malformed_input() {
        for text in [
            "",
            "1.2.3",
            "1.2.3.4.5",
            "256.1.1.1",
            "1.2.3.1000",
            "a.b.c.d",
            "1.2.3.",
            ".1.2.3",
            "1..2.3",
            "1.2.3.4 ",
            "+1.2.3.4",
            "1.2.3.-4",
        ] {
            assert_eq!(encode(text), Err(MalformedAddress { text: text.to_string() }), "{text:?}");
        }
    }

    #[test]
    fn switch_id_threshold_is_exclusive() {
        assert!(!is_switch_id(0));
        assert!(!is_switch_id(167880896));
        assert!(!is_switch_id(PACKED_IP_MAX));
        assert!(is_switch_id(PACKED_IP_MAX + 1));
        assert!(is_switch_id(u64::MAX));
    }
}
