//! Queue processor: advisory drain reports over the external operation queue.

use alloy::primitives::{Bytes, U256};
use tracing::trace;

use crate::{
    codec::{clamp_count, Reader, Writer},
    context::CallContext,
    economics::reward,
    error::Error,
    state::StateReader,
};

/// Hard ceiling on the number of operations reported by one `processQueue` call.
pub const MAX_QUEUE_BATCH: usize = 10;

/// Outcome of draining the head of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueReport {
    /// Operations that would be drained.
    pub processed: u64,
    /// Sum of the rewards of the drained operations.
    pub total_reward: U256,
    /// Queue length after the drain.
    pub remaining: u64,
}

impl QueueReport {
    fn encode(&self) -> Bytes {
        Writer::with_words(3)
            .uint(U256::from(self.processed))
            .uint(self.total_reward)
            .uint(U256::from(self.remaining))
            .finish()
    }
}

/// Reports what draining up to `max_operations` entries from the head of the queue would do.
/// Nothing is dequeued.
pub fn drain_report(state: &dyn StateReader, max_operations: usize) -> Result<QueueReport, Error> {
    let len = state.queue_len();
    let processed = len.min(max_operations as u64);

    let mut total_reward = U256::ZERO;
    for index in 0..processed {
        let entry = state.queued_operation(index).ok_or_else(|| {
            Error::StateInconsistency(format!("queue of length {len} has no entry at {index}"))
        })?;
        let entry_reward = reward(entry.gas_used, entry.gas_price, entry.tip_multiplier)?;
        total_reward = total_reward
            .checked_add(entry_reward)
            .ok_or(Error::ArithmeticOverflow("total reward"))?;
    }

    Ok(QueueReport { processed, total_reward, remaining: len - processed })
}

/// `processQueue(uint256 maxOperations)`. Any trailing priority word is ignored.
pub fn process_queue(ctx: &CallContext<'_>, data: &[u8]) -> Result<Bytes, Error> {
    let mut reader = Reader::new(data);
    let max_operations = clamp_count(reader.uint("maxOperations")?, MAX_QUEUE_BATCH);

    let report = drain_report(ctx.state, max_operations)?;
    trace!(
        "queue drain: {} processed, {} remaining, total reward {}",
        report.processed,
        report.remaining,
        report.total_reward
    );

    Ok(report.encode())
}
