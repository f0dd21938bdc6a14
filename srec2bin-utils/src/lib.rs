pub mod file;
pub mod hexprint;
