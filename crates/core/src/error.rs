use evervault_types::{BookingId, BookingState, EquipmentId};

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("equipment {0} not found")]
    EquipmentNotFound(EquipmentId),
    #[error("booking {0} not found")]
    BookingNotFound(BookingId),
    #[error("equipment {0} does not exist and cannot be booked")]
    InvalidReference(EquipmentId),
    #[error("booking {id} is {actual}, expected {expected}")]
    InvalidState {
        id: BookingId,
        expected: BookingState,
        actual: BookingState,
    },
    #[error("booking date cannot be in the past")]
    PastSlotRejected,
    #[error("{name} is under maintenance and cannot be booked")]
    Unavailable { name: String },

    #[error("failed to read equipment catalogue {path}: {source}", path = path.display())]
    CatalogueRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse equipment catalogue: {0}")]
    CatalogueParse(#[from] serde_yaml::Error),
    #[error("invalid equipment catalogue: {0}")]
    InvalidCatalogue(String),
}

impl BookingError {
    /// Stable machine-readable name of the failure, used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            BookingError::InvalidInput(_) => "INVALID_INPUT",
            BookingError::EquipmentNotFound(_) | BookingError::BookingNotFound(_) => "NOT_FOUND",
            BookingError::InvalidReference(_) => "INVALID_REFERENCE",
            BookingError::InvalidState { .. } => "INVALID_STATE",
            BookingError::PastSlotRejected => "PAST_SLOT_REJECTED",
            BookingError::Unavailable { .. } => "UNAVAILABLE",
            BookingError::CatalogueRead { .. }
            | BookingError::CatalogueParse(_)
            | BookingError::InvalidCatalogue(_) => "CATALOGUE",
        }
    }
}

pub type BookingResult<T> = std::result::Result<T, BookingError>;
