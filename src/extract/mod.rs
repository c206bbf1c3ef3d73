//! Extraction stages run by the page handler, one module per stage.

pub mod name;
pub mod price;
pub mod record;
pub mod screenshot;
pub mod session_health;

#[cfg(test)]
mod tests;

pub use name::TitleFallback;
pub use session_health::SessionHealthSignal;
