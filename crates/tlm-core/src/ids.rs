use core::fmt;
use core::num::NonZeroU32;

use crate::error::{TlmError, TlmResult};

/// Compact, stable identifier used for arena-backed objects.
///
/// - `u32` keeps handles small enough to embed in every port binding
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from a 0-based index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Create an Id from a slab length/position, failing when it does not fit.
    pub fn try_from_usize(index: usize) -> TlmResult<Self> {
        let index = u32::try_from(index).map_err(|_| TlmError::IndexOob {
            what: "id space exhausted",
            index,
            len: u32::MAX as usize,
        })?;
        if index == u32::MAX {
            return Err(TlmError::IndexOob {
                what: "id space exhausted",
                index: index as usize,
                len: u32::MAX as usize,
            });
        }
        Ok(Self::from_index(index))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// The 0-based index as a slice position.
    pub fn slot(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Index of a node in a system's node arena.
pub type NodeId = Id;
