//! User module
//!
//! Users are created once and never modified. Tasks refer to them by id.

mod model;
mod store;

pub use model::*;
pub use store::UserStore;
