pub mod glucose;
pub mod risk;
