// src/handlers/mod.rs

pub mod certification;
pub mod enrollment;
pub mod exam;
