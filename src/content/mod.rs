pub mod loader;
pub mod question;
pub mod shuffle;
