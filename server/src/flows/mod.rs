//! Page flows. Each flow owns its copy of the collections and persists
//! explicitly after every mutation.

pub mod admin;
pub mod checkin;
pub mod registration;
pub mod views;

pub use admin::AdminConsole;
pub use checkin::CheckinKiosk;
pub use registration::RegistrationFlow;
