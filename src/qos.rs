//! Quality-of-service settings for writers and readers.

/// Default number of samples a best-effort reader keeps before dropping the oldest.
pub const DEFAULT_HISTORY_DEPTH: usize = 64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Reliability {
    /// Samples may be dropped when a reader falls behind.
    #[default]
    BestEffort,
    /// Samples are kept until taken.
    Reliable,
}

/// Per-endpoint QoS.
///
/// ## Example
///
/// ```
/// use sourced_rpc::{Qos, Reliability};
///
/// let qos = Qos::best_effort().with_history_depth(8);
/// assert_eq!(qos.reliability, Reliability::BestEffort);
/// assert_eq!(qos.history_depth, 8);
/// assert!(Qos::reliable().is_reliable());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Qos {
    pub reliability: Reliability,
    /// Queue bound for best-effort readers. Ignored by reliable readers.
    pub history_depth: usize,
}

impl Default for Qos {
    fn default() -> Self {
        Self::best_effort()
    }
}

impl Qos {
    pub fn best_effort() -> Self {
        Self {
            reliability: Reliability::BestEffort,
            history_depth: DEFAULT_HISTORY_DEPTH,
        }
    }

    pub fn reliable() -> Self {
        Self {
            reliability: Reliability::Reliable,
            history_depth: DEFAULT_HISTORY_DEPTH,
        }
    }

    /// A depth of zero is treated as one.
    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history_depth = depth.max(1);
        self
    }

    pub fn is_reliable(&self) -> bool {
        self.reliability == Reliability::Reliable
    }
}
