//! Capacity growth settings shared by every container

use crate::Error;

/// Growth policy for a [`crate::GrowableBuffer`]
///
/// Capacities always have the form `default_capacity * grow_factor^k`, for
/// the smallest `k` that leaves room strictly past the requested length.
/// Requests whose capacity would exceed `max_capacity` fail with
/// [`Error::NoMemory`] without touching the allocator.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BufferConfig {
    /// Capacity for `k == 0`
    default_capacity: usize,
    /// Multiplier applied for each growth step
    grow_factor: usize,
    /// Largest capacity we are willing to allocate
    max_capacity: usize,
}

impl BufferConfig {
    /// Capacity used when nothing else is configured
    pub const DEFAULT_CAPACITY: usize = 8;

    /// Growth multiplier used when nothing else is configured
    pub const GROW_FACTOR: usize = 2;

    /// Start building a custom [`BufferConfig`].
    pub fn builder() -> BufferConfigBuilder {
        BufferConfigBuilder::new()
    }

    /// Capacity for `k == 0`.
    pub fn default_capacity(&self) -> usize {
        self.default_capacity
    }

    /// Multiplier applied for each growth step.
    pub fn grow_factor(&self) -> usize {
        self.grow_factor
    }

    /// Largest capacity a buffer may reach.
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Smallest allowed capacity that is strictly greater than `length`.
    ///
    /// Fails on arithmetic overflow or when the result would pass
    /// `max_capacity`.
    pub fn capacity_for(&self, length: usize) -> Result<usize, Error> {
        let mut capacity = self.default_capacity;
        while capacity <= length {
            capacity = capacity
                .checked_mul(self.grow_factor)
                .ok_or(Error::NoMemory)?;
        }
        if capacity > self.max_capacity {
            Err(Error::NoMemory)
        } else {
            Ok(capacity)
        }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            default_capacity: Self::DEFAULT_CAPACITY,
            grow_factor: Self::GROW_FACTOR,
            max_capacity: usize::MAX,
        }
    }
}

/// Builder for [`BufferConfig`] instances with custom settings
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BufferConfigBuilder {
    /// Settings so far, validated on [`Self::build()`]
    config: BufferConfig,
}

impl BufferConfigBuilder {
    /// Create a new [`BufferConfigBuilder`] with default settings.
    ///
    /// Immediately calling [`Self::build()`] would be equivalent to using
    /// [`BufferConfig::default()`].
    pub fn new() -> Self {
        Self {
            config: BufferConfig::default(),
        }
    }

    /// Select the capacity used for the smallest allocation.
    pub fn default_capacity(&mut self, capacity: usize) -> &mut Self {
        self.config.default_capacity = capacity;
        self
    }

    /// Select the multiplier applied for each growth step.
    pub fn grow_factor(&mut self, factor: usize) -> &mut Self {
        self.config.grow_factor = factor;
        self
    }

    /// Cap every future allocation at `capacity` slots.
    ///
    /// Requests past the cap behave exactly like a failed allocation.
    pub fn max_capacity(&mut self, capacity: usize) -> &mut Self {
        self.config.max_capacity = capacity;
        self
    }

    /// Check the settings and build a [`BufferConfig`].
    ///
    /// Returns [`Error::BadValue`] if the default capacity is zero, the grow
    /// factor is below two, or the cap is below the default capacity.
    pub fn build(&self) -> Result<BufferConfig, Error> {
        let c = self.config;
        if c.default_capacity == 0 || c.grow_factor < 2 || c.max_capacity < c.default_capacity {
            return Err(Error::BadValue);
        }
        Ok(c)
    }
}

impl Default for BufferConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::BufferConfig;
    use crate::Error;

    #[test]
    fn capacity_formula() {
        let c = BufferConfig::default();
        assert_eq!(c.capacity_for(0), Ok(8));
        assert_eq!(c.capacity_for(7), Ok(8));
        assert_eq!(c.capacity_for(8), Ok(16));
        assert_eq!(c.capacity_for(9), Ok(16));
        assert_eq!(c.capacity_for(100), Ok(128));
        assert_eq!(c.capacity_for(usize::MAX), Err(Error::NoMemory));
    }

    #[test]
    fn capped() {
        let c = BufferConfig::builder()
            .default_capacity(4)
            .grow_factor(3)
            .max_capacity(36)
            .build()
            .expect("valid config");
        assert_eq!(c.capacity_for(4), Ok(12));
        assert_eq!(c.capacity_for(35), Ok(36));
        assert_eq!(c.capacity_for(36), Err(Error::NoMemory));
    }

    #[test]
    fn rejects_bad_settings() {
        assert_eq!(
            BufferConfig::builder().default_capacity(0).build(),
            Err(Error::BadValue)
        );
        assert_eq!(
            BufferConfig::builder().grow_factor(1).build(),
            Err(Error::BadValue)
        );
        assert_eq!(
            BufferConfig::builder().max_capacity(2).build(),
            Err(Error::BadValue)
        );
    }
}
