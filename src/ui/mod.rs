pub mod colors;
pub mod prompt;
pub mod spinner;

pub use colors::*;
pub use prompt::*;
pub use spinner::Spinner;
