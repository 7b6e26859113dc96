//! Screen rendering and input handling.

mod form;
mod home;

pub use form::FormScreen;
pub use home::HomeScreen;
