//! Domain models for the anesthesia record store.

mod animal;
mod drug;
mod infusion;
mod protocol;
mod session;

pub use animal::*;
pub use drug::*;
pub use infusion::*;
pub use protocol::*;
pub use session::*;
