//! CRC-16/CCITT checksum used by Prime file and screenshot records.
//!
//! Polynomial: 0x1021, Initial: 0x0000, No reflection, No final XOR

const POLY: u16 = 0x1021;

/// MSB-first lookup table, one entry per leading byte
static TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Calculate the CRC-16/CCITT checksum of `data`. Empty input yields 0.
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(0u16, |crc, &byte| {
        TABLE[((crc >> 8) as u8 ^ byte) as usize] ^ (crc << 8)
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Bit-by-bit reference, no table
    fn crc16_bitwise(data: &[u8]) -> u16 {
        let mut crc: u16 = 0;
        for byte in data {
            crc ^= (*byte as u16) << 8;
            for _ in 0..8 {
                if crc & 0x8000 != 0 {
                    crc = (crc << 1) ^ POLY;
                } else {
                    crc <<= 1;
                }
            }
        }
        crc
    }

    #[test]
    fn table_matches_known_entries() {
        assert_eq!(TABLE[0x00], 0x0000);
        assert_eq!(TABLE[0x01], 0x1021);
        assert_eq!(TABLE[0x10], 0x1231);
        assert_eq!(TABLE[0x80], 0x9188);
        assert_eq!(TABLE[0xFF], 0x1EF0);
    }

    #[test]
    fn check_value() {
        assert_eq!(crc16(b"123456789"), 0x31C3);
    }

    #[test]
    fn empty_is_initial_value() {
        assert_eq!(crc16(&[]), 0);
    }

    proptest! {
        #[test]
        fn table_agrees_with_bitwise(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(crc16(&data), crc16_bitwise(&data));
        }

        #[test]
        fn agrees_with_xmodem(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let xmodem = ::crc::Crc::<u16>::new(&::crc::CRC_16_XMODEM);
            prop_assert_eq!(crc16(&data), xmodem.checksum(&data));
        }

        #[test]
        fn stable_across_calls(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(crc16(&data), crc16(&data));
        }

        #[test]
        fn zero_length_prefix_is_zero(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assert_eq!(crc16(&data[..0]), 0);
        }
    }
}
