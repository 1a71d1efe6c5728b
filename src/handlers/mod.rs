// src/handlers/mod.rs

pub mod assessments;
pub mod courses;
pub mod sessions;
pub mod site;
pub mod study;
