use alloy::primitives::{Address, U256};
use colored::Colorize;
use hermod_common::utils::{hex::ToLowerHex, strings::encode_hex_reduced};
use hermod_precompile::{gas::Method, validation_data::ValidationData, PrecompileOutput};

/// Splits `bytes` into 32-byte words. A trailing partial word is right-padded.
fn words(bytes: &[u8]) -> Vec<U256> {
    bytes
        .chunks(32)
        .map(|chunk| {
            let mut word = [0u8; 32];
            word[..chunk.len()].copy_from_slice(chunk);
            U256::from_be_bytes(word)
        })
        .collect()
}

/// Human readable form of a packed validation word.
fn describe_validation(word: U256) -> String {
    let data = ValidationData::parse(word);
    let status = if data.is_success() { "success" } else { "failed" };

    match (data.valid_after, data.valid_until) {
        (0, 0) => status.to_string(),
        (after, 0) => format!("{status}, valid after {after}"),
        (after, until) => format!("{status}, valid from {after} until {until}"),
    }
}

/// Labels the returned words of `method`. Each entry is a `(label, value)` pair.
pub fn describe(method: Option<Method>, output: &PrecompileOutput) -> Vec<(String, String)> {
    let words = words(&output.bytes);
    let word = |index: usize| words.get(index).copied().unwrap_or_default();

    match method {
        Some(Method::ValidateUserOp) => {
            vec![("validationData".to_string(), describe_validation(word(0)))]
        }
        Some(Method::ValidatePaymaster) => vec![
            ("validationData".to_string(), describe_validation(word(0))),
            ("context".to_string(), word(1).to_lower_hex()),
        ],
        Some(Method::SimulateValidation) => vec![
            ("accountValidation".to_string(), describe_validation(word(0))),
            ("paymasterValidation".to_string(), describe_validation(word(1))),
            ("gasEstimate".to_string(), word(2).to_string()),
        ],
        Some(Method::BatchValidate) => words
            .iter()
            .enumerate()
            .map(|(i, word)| (format!("result[{i}]"), describe_validation(*word)))
            .collect(),
        Some(Method::CreateAccount) => {
            vec![("account".to_string(), Address::from_word(word(0).into()).to_checksum(None))]
        }
        Some(Method::GetUserOpHash) => vec![("userOpHash".to_string(), word(0).to_lower_hex())],
        Some(Method::GetAccountNonce) => vec![("nonce".to_string(), word(0).to_string())],
        Some(Method::CalculatePrefund) => vec![("prefund".to_string(), word(0).to_string())],
        Some(Method::CalculateRewards) => vec![("reward".to_string(), word(0).to_string())],
        Some(Method::ProcessQueue) => vec![
            ("processed".to_string(), word(0).to_string()),
            ("totalReward".to_string(), word(1).to_string()),
            ("remaining".to_string(), word(2).to_string()),
        ],
        Some(Method::AggregateSignatures) => {
            vec![("aggregate".to_string(), output.bytes.to_lower_hex())]
        }
        None => words
            .iter()
            .enumerate()
            .map(|(i, word)| (format!("word[{i}]"), encode_hex_reduced(*word)))
            .collect(),
    }
}

/// Prints the result of a call.
pub fn print_output(method: Option<Method>, output: &PrecompileOutput) {
    let name = method.map(|m| m.name()).unwrap_or("<unknown>");

    println!("{} {}", "method:".bold().bright_white(), name.green());
    println!("{} {}", "gas used:".bold().bright_white(), output.gas_used);
    println!("{} {}", "output:".bold().bright_white(), output.bytes.to_lower_hex().dimmed());

    for (label, value) in describe(method, output) {
        println!("  {} {}", format!("{label}:").bold().bright_white(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Bytes;

    fn output(words: &[U256]) -> PrecompileOutput {
        let bytes: Vec<u8> = words.iter().flat_map(|word| word.to_be_bytes::<32>()).collect();
        PrecompileOutput { gas_used: 40_000, bytes: Bytes::from(bytes) }
    }

    #[test]
    fn test_describe_simulate_validation() {
        let expired = ValidationData::failed().with_time_range(1_700_000_000, 10).pack();
        let described = describe(
            Some(Method::SimulateValidation),
            &output(&[U256::ZERO, expired, U256::from(342_000)]),
        );

        assert_eq!(
            described,
            vec![
                ("accountValidation".to_string(), "success".to_string()),
                (
                    "paymasterValidation".to_string(),
                    "failed, valid from 10 until 1700000000".to_string()
                ),
                ("gasEstimate".to_string(), "342000".to_string()),
            ]
        );
    }

    #[test]
    fn test_describe_batch_and_account() {
        let described =
            describe(Some(Method::BatchValidate), &output(&[U256::ZERO, U256::from(1)]));
        assert_eq!(described[0], ("result[0]".to_string(), "success".to_string()));
        assert_eq!(described[1], ("result[1]".to_string(), "failed".to_string()));

        let account = Address::repeat_byte(0xab);
        let described =
            describe(Some(Method::CreateAccount), &output(&[account.into_word().into()]));
        assert_eq!(described, vec![("account".to_string(), account.to_checksum(None))]);
    }

    #[test]
    fn test_describe_unknown_method() {
        let described = describe(None, &output(&[U256::from(0x0808), U256::ZERO]));
        assert_eq!(
            described,
            vec![
                ("word[0]".to_string(), "0x808".to_string()),
                ("word[1]".to_string(), "0".to_string()),
            ]
        );
    }
}
