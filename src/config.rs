//! Configuration types for FormStore.
//!
//! The [`Config`] struct controls store behavior:
//! - Artificial delay before deleting a question
//! - Debounce window for auto-saving question edits
//! - Whether saves are schema-checked
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use formstore::{Config, DeleteDelay};
//!
//! // Use defaults (no delete delay, 1s autosave window, drafts allowed)
//! let config = Config::default();
//!
//! // Reproduce the builder's simulated slow delete
//! let config = Config {
//!     delete_delay: DeleteDelay::simulated(),
//!     autosave_quiet_period: Duration::from_millis(500),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use rand::Rng;

use crate::error::FormStoreError;

/// Default debounce window for [`AutoSaver`](crate::AutoSaver).
pub const DEFAULT_AUTOSAVE_QUIET_PERIOD: Duration = Duration::from_millis(1000);

/// Store configuration options.
///
/// All fields have sensible defaults. Use struct update syntax to override
/// specific settings:
///
/// ```rust
/// use formstore::Config;
///
/// let config = Config {
///     strict_schema: true,
///     ..Default::default()
/// };
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Delay applied before `delete_question` reads the form.
    ///
    /// Default: none.
    pub delete_delay: DeleteDelay,

    /// How long an [`AutoSaver`](crate::AutoSaver) waits after the last
    /// edit before saving.
    ///
    /// Default: 1000 ms. Must be non-zero.
    pub autosave_quiet_period: Duration,

    /// Schema-check forms and questions before saving them.
    ///
    /// Off by default so that drafts (a freshly added question has an empty
    /// title) can be persisted while the author is still editing.
    pub strict_schema: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delete_delay: DeleteDelay::None,
            autosave_quiet_period: DEFAULT_AUTOSAVE_QUIET_PERIOD,
            strict_schema: false,
        }
    }
}

impl Config {
    /// Validates the configuration.
    ///
    /// Called automatically by `FormStore::open()`.
    ///
    /// # Errors
    /// Returns a configuration error if:
    /// - `autosave_quiet_period` is zero
    /// - a random delete delay has `min > max`
    pub fn validate(&self) -> Result<(), FormStoreError> {
        if self.autosave_quiet_period.is_zero() {
            return Err(FormStoreError::config(
                "autosave_quiet_period must be greater than 0",
            ));
        }

        if let DeleteDelay::Random { min, max } = self.delete_delay {
            if min > max {
                return Err(FormStoreError::config(format!(
                    "delete_delay min ({:?}) must not exceed max ({:?})",
                    min, max
                )));
            }
        }

        Ok(())
    }
}

/// Artificial latency before a question delete.
///
/// A builder UI can use this to show a pending state while a delete runs.
/// Defaults to no delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeleteDelay {
    /// Delete immediately.
    #[default]
    None,

    /// Always wait this long.
    Fixed(Duration),

    /// Wait a uniformly random duration in `min..=max`.
    Random {
        /// Shortest wait.
        min: Duration,
        /// Longest wait.
        max: Duration,
    },
}

impl DeleteDelay {
    /// Random delay of 500 to 1500 ms.
    pub const fn simulated() -> Self {
        Self::Random {
            min: Duration::from_millis(500),
            max: Duration::from_millis(1500),
        }
    }

    /// Picks the duration to wait for one delete.
    pub fn sample(&self) -> Duration {
        match *self {
            Self::None => Duration::ZERO,
            Self::Fixed(delay) => delay,
            Self::Random { min, max } if min >= max => min,
            Self::Random { min, max } => rand::thread_rng().gen_range(min..=max),
        }
    }

    /// Returns true if deletes happen immediately.
    pub fn is_none(&self) -> bool {
        match *self {
            Self::None => true,
            Self::Fixed(delay) => delay.is_zero(),
            Self::Random { max, .. } => max.is_zero(),
        }
    }
}
