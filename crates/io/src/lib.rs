// File I/O operations

pub mod csv;
pub mod provider;
pub mod xlsx;
