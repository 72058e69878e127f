// src/handlers/mod.rs

pub mod auth;
pub mod course;
pub mod health;
pub mod quiz;
