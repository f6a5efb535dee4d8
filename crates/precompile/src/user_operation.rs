//! The `UserOperation` entity and the hashes derived from it.

use alloy::{
    primitives::{aliases::U192, keccak256, Address, Bytes, B256, U256},
    sol,
    sol_types::SolValue,
};

use crate::{
    codec::{Reader, WORD},
    error::Error,
};

/// Gas added to the declared limits when estimating a simulated operation.
pub const SIMULATION_EXECUTION_OVERHEAD: u64 = 21_000;

/// Length of the paymaster address prefix of `paymasterAndData`.
const PAYMASTER_ADDRESS_LEN: usize = 20;

/// Length of an ECDSA signature in `r ‖ s ‖ v` form.
pub const SIGNATURE_LEN: usize = 65;

/// Length of a VerifyingPaymaster `paymasterAndData`: address, two validity words, signature.
pub const PAYMASTER_DATA_LEN: usize = PAYMASTER_ADDRESS_LEN + 2 * WORD + SIGNATURE_LEN;

sol! {
    /// A user operation as submitted to the EntryPoint (v0.6 field set).
    #[derive(Debug, Default, PartialEq, Eq)]
    struct UserOperation {
        address sender;
        uint256 nonce;
        bytes initCode;
        bytes callData;
        uint256 callGasLimit;
        uint256 verificationGasLimit;
        uint256 preVerificationGas;
        uint256 maxFeePerGas;
        uint256 maxPriorityFeePerGas;
        bytes paymasterAndData;
        bytes signature;
    }
}

impl UserOperation {
    /// Hash of the operation as seen by `entry_point` on `chain_id`. The signature is not part
    /// of the hash.
    pub fn hash(&self, entry_point: Address, chain_id: u64) -> B256 {
        keccak256(
            (keccak256(self.pack_for_hash()), entry_point, U256::from(chain_id)).abi_encode(),
        )
    }

    fn pack_for_hash(&self) -> Vec<u8> {
        (
            self.sender,
            self.nonce,
            keccak256(&self.initCode),
            keccak256(&self.callData),
            self.callGasLimit,
            self.verificationGasLimit,
            self.preVerificationGas,
            self.maxFeePerGas,
            self.maxPriorityFeePerGas,
            keccak256(&self.paymasterAndData),
        )
            .abi_encode()
    }

    /// Sum of the three declared gas limits, or `None` if it does not fit in 256 bits.
    pub fn total_gas(&self) -> Option<U256> {
        self.callGasLimit
            .checked_add(self.verificationGasLimit)?
            .checked_add(self.preVerificationGas)
    }

    /// Funds the operation must have available before execution:
    /// `(callGasLimit + verificationGasLimit + preVerificationGas) * maxFeePerGas`.
    pub fn required_prefund(&self) -> Result<U256, Error> {
        self.total_gas()
            .and_then(|gas| gas.checked_mul(self.maxFeePerGas))
            .ok_or(Error::ArithmeticOverflow("prefund"))
    }

    /// Gas estimate reported by simulation: the declared limits plus
    /// [`SIMULATION_EXECUTION_OVERHEAD`].
    pub fn gas_estimate(&self) -> Result<U256, Error> {
        self.total_gas()
            .and_then(|gas| gas.checked_add(U256::from(SIMULATION_EXECUTION_OVERHEAD)))
            .ok_or(Error::ArithmeticOverflow("gas estimate"))
    }

    /// The nonce key, i.e. the upper 192 bits of the nonce.
    pub fn nonce_key(&self) -> U192 {
        (self.nonce >> 64usize).to::<U192>()
    }

    /// The sequence number under [`Self::nonce_key`], i.e. the lower 64 bits of the nonce.
    pub fn nonce_sequence(&self) -> u64 {
        self.nonce.as_limbs()[0]
    }

    /// Returns true if the operation names a paymaster to sponsor it.
    pub fn has_paymaster(&self) -> bool {
        !self.paymasterAndData.is_empty()
    }

    /// The paymaster named by `paymasterAndData`, if it is long enough to hold an address.
    pub fn paymaster(&self) -> Option<Address> {
        self.paymasterAndData.get(..PAYMASTER_ADDRESS_LEN).map(Address::from_slice)
    }
}

/// Builds a full 256-bit nonce from its key and sequence.
pub fn compose_nonce(key: U192, sequence: u64) -> U256 {
    (U256::from(key) << 64) | U256::from(sequence)
}

/// `paymasterAndData` in the VerifyingPaymaster layout:
/// `paymaster(20) ‖ validUntil word ‖ validAfter word ‖ signature(65)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymasterData {
    /// The sponsoring paymaster.
    pub paymaster: Address,
    /// Last timestamp the sponsorship is valid for, 0 for no expiry.
    pub valid_until: u64,
    /// First timestamp the sponsorship is valid for.
    pub valid_after: u64,
    /// Signature of the paymaster's signer over [`PaymasterData::hash`].
    pub signature: Bytes,
}

impl PaymasterData {
    /// Parses `paymasterAndData`. Returns `None` unless it is exactly [`PAYMASTER_DATA_LEN`]
    /// bytes long with both validity words fitting in 48 bits.
    pub fn parse(paymaster_and_data: &[u8]) -> Option<Self> {
        if paymaster_and_data.len() != PAYMASTER_DATA_LEN {
            return None;
        }

        let paymaster = Address::from_slice(&paymaster_and_data[..PAYMASTER_ADDRESS_LEN]);
        let mut reader = Reader::new(&paymaster_and_data[PAYMASTER_ADDRESS_LEN..]);
        let valid_until = reader.u48("validUntil").ok()?;
        let valid_after = reader.u48("validAfter").ok()?;
        let signature = Bytes::copy_from_slice(reader.remaining());

        Some(Self { paymaster, valid_until, valid_after, signature })
    }

    /// Encodes the data back into a `paymasterAndData` blob.
    pub fn encode(&self) -> Bytes {
        let mut out = Vec::with_capacity(PAYMASTER_ADDRESS_LEN + 2 * WORD + self.signature.len());
        out.extend_from_slice(self.paymaster.as_slice());
        out.extend_from_slice(&U256::from(self.valid_until).to_be_bytes::<WORD>());
        out.extend_from_slice(&U256::from(self.valid_after).to_be_bytes::<WORD>());
        out.extend_from_slice(&self.signature);
        out.into()
    }

    /// The hash the paymaster's signer signs for `op` on `chain_id`.
    pub fn hash(&self, op: &UserOperation, chain_id: u64) -> B256 {
        keccak256(
            (
                op.sender,
                op.nonce,
                keccak256(&op.initCode),
                keccak256(&op.callData),
                op.callGasLimit,
                op.verificationGasLimit,
                op.preVerificationGas,
                op.maxFeePerGas,
                op.maxPriorityFeePerGas,
                U256::from(chain_id),
                self.paymaster,
                U256::from(self.valid_until),
                U256::from(self.valid_after),
            )
                .abi_encode(),
        )
    }

    /// Returns true if the sponsorship window closed before `timestamp`.
    pub fn is_expired(&self, timestamp: u64) -> bool {
        self.valid_until != 0 && self.valid_until < timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const ENTRY_POINT: Address = address!("5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");

    fn sample() -> UserOperation {
        UserOperation {
            sender: address!("1306b01bc3e4ad202612d3843387e94737673f53"),
            nonce: U256::from(8942),
            initCode: Bytes::from_static(b"0x6942069420694206942069420"),
            callData: Bytes::from_static(b"0x0000000000000000000000000000000000000000080085"),
            callGasLimit: U256::from(10_000),
            verificationGasLimit: U256::from(100_000),
            preVerificationGas: U256::from(100),
            maxFeePerGas: U256::from(99_999),
            maxPriorityFeePerGas: U256::from(9_999_999),
            paymasterAndData: Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
            signature: Bytes::from_static(&[0x01; 65]),
        }
    }

    #[test]
    fn test_hash_is_stable() {
        let op = sample();
        assert_eq!(op.hash(ENTRY_POINT, 1), op.clone().hash(ENTRY_POINT, 1));
    }

    #[test]
    fn test_hash_excludes_signature() {
        let op = sample();
        let mut resigned = op.clone();
        resigned.signature = Bytes::from_static(&[0x02; 65]);
        assert_eq!(op.hash(ENTRY_POINT, 1), resigned.hash(ENTRY_POINT, 1));
    }

    #[test]
    fn test_hash_binds_domain() {
        let op = sample();
        let base = op.hash(ENTRY_POINT, 1);
        assert_ne!(base, op.hash(ENTRY_POINT, 5));
        assert_ne!(base, op.hash(Address::ZERO, 1));
    }

    #[test]
    fn test_hash_is_sensitive_to_each_field() {
        let base = sample();
        let reference = base.hash(ENTRY_POINT, 1);

        let mutations: Vec<Box<dyn Fn(&mut UserOperation)>> = vec![
            Box::new(|op| op.sender = Address::repeat_byte(0x42)),
            Box::new(|op| op.nonce += U256::from(1)),
            Box::new(|op| op.initCode = Bytes::new()),
            Box::new(|op| op.callData = Bytes::from_static(&[0x00])),
            Box::new(|op| op.callGasLimit += U256::from(1)),
            Box::new(|op| op.verificationGasLimit += U256::from(1)),
            Box::new(|op| op.preVerificationGas += U256::from(1)),
            Box::new(|op| op.maxFeePerGas += U256::from(1)),
            Box::new(|op| op.maxPriorityFeePerGas += U256::from(1)),
            Box::new(|op| op.paymasterAndData = Bytes::new()),
        ];

        for (i, mutate) in mutations.iter().enumerate() {
            let mut op = base.clone();
            mutate(&mut op);
            assert_ne!(op.hash(ENTRY_POINT, 1), reference, "mutation {i} did not change the hash");
        }
    }

    #[test]
    fn test_required_prefund() {
        let op = sample();
        assert_eq!(op.required_prefund().expect("fits"), U256::from(110_100u64 * 99_999));
    }

    #[test]
    fn test_required_prefund_overflow() {
        let op = UserOperation {
            callGasLimit: U256::MAX,
            verificationGasLimit: U256::from(1),
            ..Default::default()
        };
        assert_eq!(op.required_prefund(), Err(Error::ArithmeticOverflow("prefund")));

        let op = UserOperation {
            callGasLimit: U256::MAX >> 1,
            maxFeePerGas: U256::from(3),
            ..Default::default()
        };
        assert_eq!(op.required_prefund(), Err(Error::ArithmeticOverflow("prefund")));
    }

    #[test]
    fn test_gas_estimate_adds_overhead() {
        let op = sample();
        assert_eq!(
            op.gas_estimate().expect("fits"),
            U256::from(110_100 + SIMULATION_EXECUTION_OVERHEAD)
        );
    }

    #[test]
    fn test_nonce_key_and_sequence() {
        let key = U192::from(0xabcdu64);
        let op = UserOperation { nonce: compose_nonce(key, 42), ..Default::default() };
        assert_eq!(op.nonce_key(), key);
        assert_eq!(op.nonce_sequence(), 42);

        let op = UserOperation { nonce: U256::MAX, ..Default::default() };
        assert_eq!(op.nonce_key(), U192::MAX);
        assert_eq!(op.nonce_sequence(), u64::MAX);
    }

    #[test]
    fn test_paymaster_address() {
        assert_eq!(UserOperation::default().paymaster(), None);

        let op = UserOperation {
            paymasterAndData: Bytes::from(vec![0x77; PAYMASTER_ADDRESS_LEN]),
            ..Default::default()
        };
        assert_eq!(op.paymaster(), Some(Address::repeat_byte(0x77)));
    }

    #[test]
    fn test_paymaster_data_parse() {
        let data = PaymasterData {
            paymaster: Address::repeat_byte(0x55),
            valid_until: 1_700_000_000,
            valid_after: 1_600_000_000,
            signature: Bytes::from(vec![0x1b; SIGNATURE_LEN]),
        };
        let encoded = data.encode();
        assert_eq!(encoded.len(), PAYMASTER_DATA_LEN);
        assert_eq!(PaymasterData::parse(&encoded), Some(data));

        // too short to carry a signature
        assert_eq!(PaymasterData::parse(&encoded[..PAYMASTER_DATA_LEN - 1]), None);

        // trailing bytes after the signature
        let mut padded = encoded.to_vec();
        padded.push(0x00);
        assert_eq!(PaymasterData::parse(&padded), None);
    }

    #[test]
    fn test_paymaster_data_expiry() {
        let data = PaymasterData {
            paymaster: Address::ZERO,
            valid_until: 100,
            valid_after: 0,
            signature: Bytes::new(),
        };
        assert!(!data.is_expired(100));
        assert!(data.is_expired(101));

        let unbounded = PaymasterData { valid_until: 0, ..data };
        assert!(!unbounded.is_expired(u64::MAX));
    }
}
