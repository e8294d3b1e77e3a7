use deku::DekuError;

/// The descriptor map fields that carry a base offset checked by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseField {
    ComponentBase,
    RegionBase,
    MasterBase,
}

impl std::fmt::Display for BaseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::ComponentBase => write!(f, "ComponentBase"),
            Self::RegionBase => write!(f, "RegionBase"),
            Self::MasterBase => write!(f, "MasterBase"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Flash Descriptor Map size too small: expected {expected} bytes, got {actual}")]
    Size { expected: usize, actual: usize },
    #[error("Malformed flash descriptor map")]
    Malformed(#[from] DekuError),
}

/// A cross-field inconsistency found by [`DescriptorMap::validate`](crate::structures::descriptor_map::DescriptorMap::validate).
///
/// These are advisory: the map still decoded fine, the caller decides what to refuse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyError {
    #[error("{field} too large: expected at most {limit:#04x}, got {actual:#04x}")]
    BaseTooLarge {
        field: BaseField,
        limit: u8,
        actual: u8,
    },
    #[error("{first} must be different from {second}: both are at {shared:#04x}")]
    Overlap {
        first: BaseField,
        second: BaseField,
        shared: u8,
    },
}
