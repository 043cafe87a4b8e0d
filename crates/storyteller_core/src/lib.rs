pub mod domain;
pub mod ports;

pub use domain::{AuthSession, Identity, Story, TimeFrame, User};
pub use ports::{DatabaseService, IdentityService, PortError, PortResult, SummarizationService};
