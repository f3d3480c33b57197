/// Unrecoverable failures of allocating operations.
///
/// These never end up in the misuse register; the operation that hit them
/// is abandoned and the container is left as it was.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CapacityError {
    AllocFailed {
        new_capacity: usize,
    },
}

impl core::fmt::Display for CapacityError {

    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AllocFailed { new_capacity } => {
                write!(f, "allocation failed with new capacity {}", new_capacity)
            },
        }
    }
}

impl core::error::Error for CapacityError {}
