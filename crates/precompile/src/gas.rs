//! Static gas schedule, keyed by method selector.

use std::fmt;

use crate::codec::SELECTOR_LEN;

/// Gas charged for payloads that are too short to carry a selector, or whose selector is unknown.
pub const DEFAULT_GAS: u64 = 10_000;

/// The cheapest method in the schedule.
pub const MIN_GAS: u64 = 5_000;

/// Information about a precompile method, such as its name and required gas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodInfo {
    /// Name
    name: &'static str,
    /// Gas charged before the method runs.
    gas: u64,
}

impl MethodInfo {
    /// Creates a new method with the given name, charged at [`DEFAULT_GAS`].
    pub const fn new(name: &'static str) -> Self {
        Self { name, gas: DEFAULT_GAS }
    }

    /// Returns the name of the method.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the gas required to execute the method.
    #[inline]
    pub const fn gas(&self) -> u64 {
        self.gas
    }
}

impl From<u8> for MethodInfo {
    #[inline]
    fn from(selector: u8) -> Self {
        METHOD_INFO_JUMPTABLE[selector as usize].unwrap_or(MethodInfo::new("unknown"))
    }
}

/// Sets the gas required to execute the method.
#[inline]
pub const fn gas(mut info: MethodInfo, gas: u64) -> MethodInfo {
    info.gas = gas;
    info
}

macro_rules! methods {
    ($($val:literal => $konst:ident => $variant:ident($name:literal) => $($modifier:ident $(( $($modifier_arg:expr),* ))?),*);* $(;)?) => {
        // create a constant for each selector
        $(
            #[doc = concat!("The `", stringify!($val), "` (\"", $name, "\") selector.")]
            pub const $konst: u8 = $val;
        )*

        /// Maps each selector to its info.
        pub const METHOD_INFO_JUMPTABLE: [Option<MethodInfo>; 256] = {
            let mut map = [None; 256];
            let mut prev: u8 = 0;
            $(
                let val: u8 = $val;
                assert!(val > prev, "selectors must be sorted in ascending order");
                prev = val;
                let info = MethodInfo::new($name);
                $(
                let info = $modifier(info, $($($modifier_arg),*)?);
                )*
                map[$val] = Some(info);
            )*
            let _ = prev;
            map
        };

        /// The closed set of methods served by the precompile.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Method {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl Method {
            /// Every method, in selector order.
            pub const ALL: &'static [Method] = &[$(Method::$variant),*];

            /// Resolves a selector byte, returning `None` for selectors outside the schedule.
            pub const fn from_selector(selector: u8) -> Option<Self> {
                match selector {
                    $($val => Some(Method::$variant),)*
                    _ => None,
                }
            }

            /// Returns the selector byte of the method.
            pub const fn selector(&self) -> u8 {
                match self {
                    $(Method::$variant => $val,)*
                }
            }
        }
    }
}

methods! {
    0x01 => VALIDATE_USER_OP => ValidateUserOp("validateUserOp") => gas(50_000);
    0x02 => GET_USER_OP_HASH => GetUserOpHash("getUserOpHash") => gas(10_000);
    0x03 => CREATE_ACCOUNT => CreateAccount("createAccount") => gas(100_000);
    0x04 => GET_ACCOUNT_NONCE => GetAccountNonce("getAccountNonce") => gas(5_000);
    0x05 => VALIDATE_PAYMASTER => ValidatePaymaster("validatePaymaster") => gas(30_000);
    0x06 => CALCULATE_PREFUND => CalculatePrefund("calculatePrefund") => gas(15_000);
    0x07 => AGGREGATE_SIGNATURES => AggregateSignatures("aggregateSignatures") => gas(80_000);
    0x08 => SIMULATE_VALIDATION => SimulateValidation("simulateValidation") => gas(40_000);
    0x09 => BATCH_VALIDATE => BatchValidate("batchValidate") => gas(80_000);
    0x0a => CALCULATE_REWARDS => CalculateRewards("calculateRewards") => gas(20_000);
    0x0b => PROCESS_QUEUE => ProcessQueue("processQueue") => gas(60_000);
}

impl Method {
    /// Returns the schedule entry of the method.
    #[inline]
    pub fn info(&self) -> MethodInfo {
        MethodInfo::from(self.selector())
    }

    /// Returns the name of the method.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.info().name()
    }

    /// Returns true if the method writes execution-layer state. Every current method is a
    /// read/compute-only view; mutations are left to the calling contract.
    #[inline]
    pub const fn mutates_state(&self) -> bool {
        false
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the gas required to run `input`. Never fails: short payloads and unknown selectors
/// are charged [`DEFAULT_GAS`].
///
/// ```
/// use hermod_precompile::gas::{required_gas, DEFAULT_GAS};
///
/// assert_eq!(required_gas(&[0x00, 0x00, 0x00, 0x01]), 50_000);
/// assert_eq!(required_gas(&[0x00, 0x00]), DEFAULT_GAS);
/// assert_eq!(required_gas(&[0x00, 0x00, 0x00, 0x99]), DEFAULT_GAS);
/// ```
pub fn required_gas(input: &[u8]) -> u64 {
    if input.len() < SELECTOR_LEN {
        return DEFAULT_GAS;
    }

    MethodInfo::from(input[SELECTOR_LEN - 1]).gas()
}
