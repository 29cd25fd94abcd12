mod admission;
pub mod utils;
