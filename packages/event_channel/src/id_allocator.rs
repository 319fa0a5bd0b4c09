use std::num::NonZeroU32;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::{Error, HandlerId, Result};

/// Hands out handler IDs that are nonzero and not used by any live handler of a channel.
///
/// IDs only need to be unique among the live handlers of one channel, so we draw a random
/// candidate from the ID space and, if it is taken, walk forward (wrapping around, skipping
/// zero) to the next free one. The walk is bounded by the number of live handlers.
#[derive(Debug)]
pub(crate) struct IdAllocator {
    rng: SmallRng,

    /// IDs are drawn from `1..=id_space`.
    id_space: NonZeroU32,
}

impl IdAllocator {
    /// Creates an allocator seeded from `seed` or, if `None`, from the thread-local RNG.
    pub(crate) fn new(seed: Option<u64>, id_space: NonZeroU32) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };

        Self { rng, id_space }
    }

    /// Allocates an ID that `is_live` reports as unused.
    ///
    /// `live_count` must be the number of IDs for which `is_live` returns `true`.
    pub(crate) fn allocate(
        &mut self,
        live_count: usize,
        is_live: impl Fn(HandlerId) -> bool,
    ) -> Result<HandlerId> {
        let capacity = self.id_space.get();

        if live_count >= usize::try_from(capacity).unwrap_or(usize::MAX) {
            return Err(Error::IdSpaceExhausted { capacity });
        }

        let drawn = self.rng.random_range(1..=capacity);
        let mut candidate = NonZeroU32::new(drawn).unwrap_or(NonZeroU32::MIN);

        for _ in 0..capacity {
            let id = HandlerId::new(candidate);

            if !is_live(id) {
                return Ok(id);
            }

            if candidate.get() == drawn {
                debug!(
                    handler_id = drawn,
                    live_count, "handler ID collision, probing for a free ID"
                );
            }

            candidate = self.next_candidate(candidate);
        }

        // Only reachable if `live_count` disagrees with `is_live`.
        Err(Error::IdSpaceExhausted { capacity })
    }

    fn next_candidate(&self, current: NonZeroU32) -> NonZeroU32 {
        if current >= self.id_space {
            NonZeroU32::MIN
        } else {
            current.saturating_add(1)
        }
    }
}
