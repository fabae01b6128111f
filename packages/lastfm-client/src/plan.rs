//! Fetch planning for paginated track listings
//!
//! The upstream API caps any single response at a fixed number of items
//! (`per_request_cap`, 1000 for Last.fm), so a "give me N items" request
//! becomes one exploratory call followed by a planned set of page fetches.
//! The plan partitions the remaining need into bounded chunks: pages within
//! a chunk are dispatched concurrently, chunks run strictly in sequence,
//! which bounds peak fan-out to `chunk_size / per_request_cap` calls.

use crate::error::{LastfmError, LastfmResult};

/// A single planned page fetch
///
/// Immutable once built; one value per HTTP call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based upstream page number
    pub page: u64,
    /// Maximum items requested for this page
    pub limit: u64,
}

/// Plan for the page fetches remaining after the exploratory first call
///
/// Derived and transient: computed once per top-level operation from the
/// first response's metadata, then discarded after the merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    /// Final number of items the caller receives,
    /// `min(requested, true total)`
    pub effective_target: u64,
    /// Batches of page fetches; each inner batch is dispatched concurrently
    pub chunks: Vec<Vec<PageRequest>>,
}

impl FetchPlan {
    /// The exploratory first call of every listing operation
    ///
    /// Page 1, capped at the per-request maximum. Its response metadata
    /// carries the true total, which [`FetchPlan::for_remaining`] needs.
    pub fn first_page(requested: Option<u64>, per_request_cap: u64) -> PageRequest {
        PageRequest {
            page: 1,
            limit: requested.unwrap_or(per_request_cap).min(per_request_cap),
        }
    }

    /// Plan the follow-up fetches once the true total is known
    ///
    /// Follow-up pages all use `per_request_cap` as their limit. They are
    /// only planned when the first call was issued at exactly that limit,
    /// so every page is the same size and offsets stay contiguous: page
    /// numbers across the plan never repeat and never skip. That guarantee
    /// requires `chunk_size` to be a nonzero multiple of `per_request_cap`;
    /// anything else would put a chunk boundary inside an upstream page and
    /// is rejected as a configuration error.
    pub fn for_remaining(
        requested: Option<u64>,
        true_total: u64,
        per_request_cap: u64,
        chunk_size: u64,
    ) -> LastfmResult<Self> {
        if per_request_cap == 0 {
            return Err(LastfmError::Config(
                "per_request_cap must be greater than zero".to_string(),
            ));
        }
        if chunk_size == 0 || chunk_size % per_request_cap != 0 {
            return Err(LastfmError::Config(format!(
                "chunk_size ({}) must be a nonzero multiple of per_request_cap ({})",
                chunk_size, per_request_cap
            )));
        }

        let effective_target = requested.unwrap_or(true_total).min(true_total);
        let remaining = effective_target.saturating_sub(per_request_cap);

        let mut chunks = Vec::new();
        if remaining > 0 {
            let chunk_count = remaining.div_ceil(chunk_size);
            for chunk_index in 0..chunk_count {
                let items_in_chunk = chunk_size.min(remaining - chunk_index * chunk_size);
                let calls = items_in_chunk.div_ceil(per_request_cap);

                let mut pages = Vec::with_capacity(calls as usize);
                for call_index in 0..calls {
                    // +2: page 1 is already fetched and pages are 1-based
                    pages.push(PageRequest {
                        page: (chunk_index * chunk_size) / per_request_cap + call_index + 2,
                        limit: per_request_cap,
                    });
                }
                chunks.push(pages);
            }
        }

        Ok(Self {
            effective_target,
            chunks,
        })
    }

    /// Number of follow-up calls across all chunks
    pub fn follow_up_calls(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Largest number of calls any single chunk dispatches concurrently
    pub fn max_fan_out(&self) -> usize {
        self.chunks.iter().map(Vec::len).max().unwrap_or(0)
    }
}
