//! Limits for configuration values.

use std::cmp;
use std::fmt::Debug;
use tracing::warn;

//------------ DefMinMax -----------------------------------------------------

/// The default, minimum, and maximum values for a config variable.
#[derive(Clone, Copy, Debug)]
pub struct DefMinMax<T> {
    def: T,
    min: T,
    max: T,
}

impl<T> DefMinMax<T> {
    /// Creates a new value.
    pub const fn new(def: T, min: T, max: T) -> Self {
        Self { def, min, max }
    }

    /// Returns the default value.
    pub fn default(self) -> T {
        self.def
    }

    pub fn min(self) -> T {
        self.min
    }

    pub fn max(self) -> T {
        self.max
    }

    /// Trims the given value to fit into the minimum/maximum range.
    ///
    /// If the value has to be changed, a warning naming the variable is
    /// logged.
    pub fn limit(self, name: &str, value: T) -> T
    where
        T: Ord + Copy + Debug,
    {
        let res = cmp::max(self.min, cmp::min(self.max, value));
        if res != value {
            warn!("{} {:?} out of range, using {:?}", name, value, res);
        }
        res
    }
}

//============ Testing =======================================================
