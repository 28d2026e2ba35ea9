//! Pool configuration parameters.

/// Search policy used when scanning the free list for a block.
///
/// `FirstFit` accepts the first free block that is large enough — O(1)
/// amortised in the common case. `BestFit` scans the whole chain and keeps
/// the smallest sufficient block, trading scan cost for less fragmentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FitPolicy {
    /// Accept the first free block whose size satisfies the request.
    #[default]
    FirstFit,
    /// Scan the full chain and pick the smallest sufficient free block.
    BestFit,
}

/// Configuration for a [`Pool`](crate::Pool).
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Usable arena capacity in bytes.
    ///
    /// Rounded up to [`PoolConfig::ALIGN`] at construction. Must be non-zero
    /// and no larger than [`PoolConfig::MAX_CAPACITY`].
    pub capacity: usize,

    /// Free-block search policy. Default: [`FitPolicy::FirstFit`].
    pub policy: FitPolicy,
}

impl PoolConfig {
    /// Allocation granularity in bytes.
    ///
    /// Requests and the pool capacity are rounded up to this boundary, so
    /// every block size is a positive multiple of it. This also bounds the
    /// descriptor slab: a pool of `capacity` bytes can never hold more than
    /// `capacity / ALIGN` blocks.
    pub const ALIGN: usize = 8;

    /// Largest supported arena capacity in bytes (1 GiB).
    ///
    /// Block offsets and sizes are stored as `u32`; capping well below
    /// `u32::MAX` keeps all internal arithmetic comfortably in range.
    pub const MAX_CAPACITY: usize = 1 << 30;

    /// Create a config for the given capacity with the default fit policy.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            policy: FitPolicy::FirstFit,
        }
    }

    /// Switch the free-block search policy.
    pub fn with_policy(mut self, policy: FitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The configured capacity rounded up to the allocation granularity.
    pub fn aligned_capacity(&self) -> usize {
        self.capacity.div_ceil(Self::ALIGN) * Self::ALIGN
    }
}
