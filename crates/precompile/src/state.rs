//! Read-only access to execution-layer state.
//!
//! The precompile never writes state. Nonces, deposits, deployed code and the operation queue
//! are owned by the host's state database and by the on-chain collaborator contracts; the engine
//! only reads them through [`StateReader`].

use std::fmt::Debug;

use alloy::primitives::{aliases::U192, Address, Bytes, U256};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// A pending operation recorded by the queueing contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueuedOperation {
    /// Gas the operation consumed, as recorded at enqueue time.
    pub gas_used: U256,
    /// Gas price the operation pays.
    pub gas_price: U256,
    /// Executor tip, in percent of the gas cost.
    pub tip_multiplier: U256,
}

/// Read-only view of the state the precompile depends on.
pub trait StateReader: Debug {
    /// Sequence number of `account` under nonce `key`; `0` for an unused key.
    fn nonce(&self, account: Address, key: U192) -> U256;

    /// Deployed code at `address`, or `None` if nothing is deployed there.
    fn account_code(&self, address: Address) -> Option<Bytes>;

    /// Deposit held by the entry point on behalf of `holder` (an account or a paymaster).
    fn deposit_of(&self, holder: Address) -> U256;

    /// Signer registered by `account` (the owner of a smart account, or the verifying signer of a
    /// paymaster).
    fn signer_of(&self, account: Address) -> Option<Address>;

    /// Number of operations waiting in the queue.
    fn queue_len(&self) -> u64;

    /// The queued operation at `index`, counted from the head of the queue.
    fn queued_operation(&self, index: u64) -> Option<QueuedOperation>;
}

/// A single account entry of a [`StateFixture`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountFixture {
    /// Address of the account or paymaster.
    pub address: Address,
    /// Deployed code, if any.
    pub code: Option<Bytes>,
    /// Registered signer, if any.
    pub signer: Option<Address>,
    /// Entry point deposit.
    pub deposit: U256,
    /// Nonce sequences by key.
    pub nonces: Vec<NonceFixture>,
}

/// A `(key, sequence)` pair of an [`AccountFixture`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceFixture {
    /// Nonce key.
    pub key: U192,
    /// Sequence number under the key.
    pub nonce: U256,
}

/// Serializable description of a state, loaded by the CLI and by tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateFixture {
    /// Accounts and paymasters.
    pub accounts: Vec<AccountFixture>,
    /// Operation queue, head first.
    pub queue: Vec<QueuedOperation>,
}

/// An in-memory [`StateReader`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryState {
    nonces: HashMap<(Address, U192), U256>,
    code: HashMap<Address, Bytes>,
    deposits: HashMap<Address, U256>,
    signers: HashMap<Address, Address>,
    queue: Vec<QueuedOperation>,
}

impl InMemoryState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sequence of `account` under `key`.
    pub fn with_nonce(mut self, account: Address, key: U192, nonce: U256) -> Self {
        self.nonces.insert((account, key), nonce);
        self
    }

    /// Deploys `code` at `address`.
    pub fn with_code(mut self, address: Address, code: Bytes) -> Self {
        self.code.insert(address, code);
        self
    }

    /// Sets the entry point deposit of `holder`.
    pub fn with_deposit(mut self, holder: Address, deposit: U256) -> Self {
        self.deposits.insert(holder, deposit);
        self
    }

    /// Registers `signer` for `account`.
    pub fn with_signer(mut self, account: Address, signer: Address) -> Self {
        self.signers.insert(account, signer);
        self
    }

    /// Appends an operation to the tail of the queue.
    pub fn with_queued(mut self, operation: QueuedOperation) -> Self {
        self.queue.push(operation);
        self
    }
}

impl From<StateFixture> for InMemoryState {
    fn from(fixture: StateFixture) -> Self {
        let mut state = InMemoryState::new();

        for account in fixture.accounts {
            if let Some(code) = account.code {
                state.code.insert(account.address, code);
            }
            if let Some(signer) = account.signer {
                state.signers.insert(account.address, signer);
            }
            if !account.deposit.is_zero() {
                state.deposits.insert(account.address, account.deposit);
            }
            for entry in account.nonces {
                state.nonces.insert((account.address, entry.key), entry.nonce);
            }
        }
        state.queue = fixture.queue;

        state
    }
}

impl StateReader for InMemoryState {
    fn nonce(&self, account: Address, key: U192) -> U256 {
        self.nonces.get(&(account, key)).copied().unwrap_or_default()
    }

    fn account_code(&self, address: Address) -> Option<Bytes> {
        self.code.get(&address).cloned()
    }

    fn deposit_of(&self, holder: Address) -> U256 {
        self.deposits.get(&holder).copied().unwrap_or_default()
    }

    fn signer_of(&self, account: Address) -> Option<Address> {
        self.signers.get(&account).copied()
    }

    fn queue_len(&self) -> u64 {
        self.queue.len() as u64
    }

    fn queued_operation(&self, index: u64) -> Option<QueuedOperation> {
        usize::try_from(index).ok().and_then(|index| self.queue.get(index)).copied()
    }
}
