use std::hint::black_box;
use std::thread;
use std::time::Duration;

use crate::stress::error::StressError;

pub(crate) const CHUNK_SIZE: usize = 1024 * 1024;
pub(crate) const DEFAULT_HOLD: Duration = Duration::from_secs(10);

const FILLER: u8 = b'A';

/// Allocates `megabytes` in 1MB chunks, holds them for `hold` and releases them.
///
/// Every chunk is owned by a single vector local to this call, so nothing
/// outlives it: the chunks are dropped before `hold_memory` returns, on the
/// success path and on the error path alike.
pub(crate) fn hold_memory(megabytes: u32, hold: Duration) -> Result<(), StressError> {
    if megabytes == 0 {
        return Ok(());
    }

    let chunks = allocate(megabytes)?;
    debug!("Holding {}MB for {}s", chunks.len(), hold.as_secs());

    thread::sleep(hold);
    black_box(&chunks);
    drop(chunks);

    Ok(())
}

/// Every chunk is filled so the pages are committed, not just reserved.
pub(crate) fn allocate(megabytes: u32) -> Result<Vec<Vec<u8>>, StressError> {
    let mut chunks: Vec<Vec<u8>> = Vec::new();
    chunks
        .try_reserve_exact(megabytes as usize)
        .map_err(|err| allocation_failed(0, megabytes, err))?;

    for allocated in 0..megabytes {
        let mut chunk = Vec::new();
        chunk
            .try_reserve_exact(CHUNK_SIZE)
            .map_err(|err| allocation_failed(allocated, megabytes, err))?;
        chunk.resize(CHUNK_SIZE, FILLER);
        chunks.push(chunk);
    }

    Ok(chunks)
}

fn allocation_failed(allocated_mb: u32, requested_mb: u32, err: impl ToString) -> StressError {
    StressError::AllocationFailed {
        allocated_mb,
        requested_mb,
        reason: err.to_string(),
    }
}
