//! Frame checksum
//!
//! A single XOR fold seeded with the LENGTH byte and run over every payload
//! byte in wire order. The same routine produces the trailing byte on encode
//! and checks it on receive.

/// Compute the checksum for a frame with the given length byte and payload
pub fn checksum(length: u8, payload: &[u8]) -> u8 {
    payload.iter().fold(length, |acc, &byte| acc ^ byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_is_length() {
        assert_eq!(checksum(0, &[]), 0);
        assert_eq!(checksum(0x2A, &[]), 0x2A);
    }

    #[test]
    fn test_handshake_challenge() {
        // LEN=4, payload [0, 1, 2, 3]: 4 ^ 0 ^ 1 ^ 2 ^ 3 = 4
        assert_eq!(checksum(4, &[0, 1, 2, 3]), 4);
    }

    #[test]
    fn test_handshake_reply() {
        // 4 ^ 0 ^ 3 ^ 1 ^ 4 = 2
        assert_eq!(checksum(4, &[0, 3, 1, 4]), 2);
    }

    #[test]
    fn test_single_bit_flip_detected() {
        let payload = [0, 3, 1, 4];
        let mut flipped = payload;
        flipped[2] ^= 0x01;
        assert_ne!(checksum(4, &payload), checksum(4, &flipped));
    }

    #[test]
    fn test_length_participates() {
        let payload = [0x65, 0x10, 0x20];
        assert_ne!(checksum(3, &payload), checksum(4, &payload));
    }
}
