//! Invoice number allocation
//!
//! Numbers are `PREFIX-SUFFIX`. The prefix is fixed for the lifetime of the
//! allocator; suffixes are drawn uniformly from `000000..=999999` and
//! rejected if the injected [`SuffixRegistry`] has already seen them.
//!
//! Rejection sampling stays cheap until the registry is close to full, so
//! draws are capped at [`MAX_RANDOM_DRAWS`]; past that the allocator walks
//! the space from a random offset and takes the first free slot. Allocation
//! therefore always terminates, and fails only when all 1,000,000 suffixes
//! are taken.

use crate::core::error::AllocationError;
use crate::core::number::{InvoiceNumber, InvoicePrefix, SUFFIX_SPACE, Suffix};
use crate::core::service::SuffixRegistry;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random draws attempted before falling back to a linear walk
pub const MAX_RANDOM_DRAWS: usize = 64;

/// Issues invoice numbers that never repeat a suffix within the registry's lifetime
pub struct InvoiceNumberAllocator {
    prefix: InvoicePrefix,
    registry: Box<dyn SuffixRegistry>,
    rng: StdRng,
}

impl InvoiceNumberAllocator {
    /// Create an allocator for one session prefix over `registry`
    pub fn new(prefix: InvoicePrefix, registry: impl SuffixRegistry + 'static) -> Self {
        Self::from_boxed(prefix, Box::new(registry))
    }

    /// Same as [`new`](Self::new) for a registry chosen at runtime
    pub fn from_boxed(prefix: InvoicePrefix, registry: Box<dyn SuffixRegistry>) -> Self {
        Self {
            prefix,
            registry,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the random source, e.g. with a seeded one in tests
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn prefix(&self) -> &InvoicePrefix {
        &self.prefix
    }

    pub fn registry(&self) -> &dyn SuffixRegistry {
        self.registry.as_ref()
    }

    /// Number of suffixes issued through the registry so far
    pub fn issued(&self) -> usize {
        self.registry.len()
    }

    /// Issue the next invoice number
    ///
    /// The new suffix is added to the registry and the registry is persisted.
    /// Persistence failures are logged and otherwise ignored: the number is
    /// still issued and remembered for the rest of this process.
    pub fn allocate(&mut self) -> Result<InvoiceNumber, AllocationError> {
        if self.registry.len() >= SUFFIX_SPACE as usize {
            return Err(AllocationError::Exhausted {
                capacity: SUFFIX_SPACE,
            });
        }

        let suffix = self.draw_free().ok_or(AllocationError::Exhausted {
            capacity: SUFFIX_SPACE,
        })?;
        self.registry.insert(suffix);

        if let Err(e) = self.registry.persist() {
            tracing::warn!(suffix = %suffix, error = %e, "failed to persist suffix registry");
        }

        let number = InvoiceNumber::new(self.prefix.clone(), suffix);
        tracing::debug!(invoice_number = %number, issued = self.registry.len(), "allocated invoice number");
        Ok(number)
    }

    fn draw_free(&mut self) -> Option<Suffix> {
        for _ in 0..MAX_RANDOM_DRAWS {
            let candidate = Suffix::wrapping(self.rng.gen_range(0..SUFFIX_SPACE));
            if !self.registry.contains(candidate) {
                return Some(candidate);
            }
        }

        let start = self.rng.gen_range(0..SUFFIX_SPACE);
        (0..SUFFIX_SPACE)
            .map(|offset| Suffix::wrapping(start + offset))
            .find(|candidate| !self.registry.contains(*candidate))
    }
}
