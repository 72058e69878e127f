// src/services/mod.rs

pub mod course_generator;
pub mod scoring;
