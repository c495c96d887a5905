pub mod access;
pub mod audit;
pub mod email;
