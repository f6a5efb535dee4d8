//! Packed EIP-4337 validation data.
//!
//! A validation word is laid out as `validAfter (48 bits) ‖ validUntil (48 bits) ‖ authorizer
//! (160 bits)`, most significant first. An authorizer of `0` means the signature checked out and
//! `1` means it did not.

use alloy::primitives::{address, Address, U256};

/// Authorizer value marking a failed validation.
pub const SIG_VALIDATION_FAILED: Address = address!("0000000000000000000000000000000000000001");

/// Decoded validation data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationData {
    /// Whether the signature (or any other business check) failed.
    pub sig_failed: bool,
    /// Last timestamp the operation is valid for, 0 for no expiry.
    pub valid_until: u64,
    /// First timestamp the operation is valid for.
    pub valid_after: u64,
}

impl ValidationData {
    /// Successful validation without a time range. Packs to `0`.
    pub const fn success() -> Self {
        Self { sig_failed: false, valid_until: 0, valid_after: 0 }
    }

    /// Failed validation without a time range. Packs to `1`.
    pub const fn failed() -> Self {
        Self { sig_failed: true, valid_until: 0, valid_after: 0 }
    }

    /// Returns a copy restricted to the given validity window.
    pub const fn with_time_range(mut self, valid_until: u64, valid_after: u64) -> Self {
        self.valid_until = valid_until;
        self.valid_after = valid_after;
        self
    }

    /// Returns a copy marked as failed, keeping the time range.
    pub const fn into_failed(mut self) -> Self {
        self.sig_failed = true;
        self
    }

    /// Returns true if validation passed.
    pub const fn is_success(&self) -> bool {
        !self.sig_failed
    }

    /// Last timestamp the operation is valid for, with "no expiry" mapped to `u64::MAX`.
    pub const fn expires_at(&self) -> u64 {
        if self.valid_until == 0 {
            u64::MAX
        } else {
            self.valid_until
        }
    }

    /// Packs into a validation word. Timestamps are truncated to 48 bits.
    ///
    /// ```
    /// use alloy::primitives::U256;
    /// use hermod_precompile::validation_data::ValidationData;
    ///
    /// assert_eq!(ValidationData::success().pack(), U256::ZERO);
    /// assert_eq!(ValidationData::failed().pack(), U256::from(1));
    /// ```
    pub fn pack(&self) -> U256 {
        let mut word = [0u8; 32];
        word[..6].copy_from_slice(&self.valid_after.to_be_bytes()[2..]);
        word[6..12].copy_from_slice(&self.valid_until.to_be_bytes()[2..]);
        if self.sig_failed {
            word[12..].copy_from_slice(SIG_VALIDATION_FAILED.as_slice());
        }
        U256::from_be_bytes(word)
    }

    /// Parses a validation word. Any authorizer other than `0` is treated as a failure, as this
    /// precompile does not hand out aggregator authorizations.
    pub fn parse(data: U256) -> Self {
        let word: [u8; 32] = data.to_be_bytes();

        let mut buf = [0u8; 8];
        buf[2..].copy_from_slice(&word[..6]);
        let valid_after = u64::from_be_bytes(buf);

        let mut buf = [0u8; 8];
        buf[2..].copy_from_slice(&word[6..12]);
        let valid_until = u64::from_be_bytes(buf);

        let authorizer = Address::from_slice(&word[12..]);

        Self { sig_failed: !authorizer.is_zero(), valid_until, valid_after }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_layout() {
        let data = ValidationData::failed().with_time_range(0x0102_0304_0506, 0x0a0b_0c0d_0e0f);
        let word: [u8; 32] = data.pack().to_be_bytes();

        assert_eq!(&word[..6], &[0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f]);
        assert_eq!(&word[6..12], &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert_eq!(word[31], 1);
        assert!(word[12..31].iter().all(|byte| *byte == 0));
    }

    #[test]
    fn test_parse_inverts_pack() {
        let cases = [
            ValidationData::success(),
            ValidationData::failed(),
            ValidationData::success().with_time_range(1_700_000_000, 1_600_000_000),
            ValidationData::failed().with_time_range(5, 0),
        ];

        for case in cases {
            assert_eq!(ValidationData::parse(case.pack()), case);
        }
    }

    #[test]
    fn test_time_range_alone_is_not_a_failure() {
        let data = ValidationData::success().with_time_range(10, 1);
        assert_ne!(data.pack(), U256::ZERO);
        assert!(ValidationData::parse(data.pack()).is_success());
    }

    #[test]
    fn test_expires_at() {
        assert_eq!(ValidationData::success().expires_at(), u64::MAX);
        assert_eq!(ValidationData::success().with_time_range(42, 0).expires_at(), 42);
    }

    #[test]
    fn test_into_failed_keeps_range() {
        let data = ValidationData::success().with_time_range(42, 7).into_failed();
        assert!(!data.is_success());
        assert_eq!((data.valid_until, data.valid_after), (42, 7));
    }
}
