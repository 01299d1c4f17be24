pub mod lot;
pub mod participant;

pub use lot::{Lot, LotStatus};
pub use participant::{Participant, ParticipantStatus, DEFAULT_TICKET_TYPES};
