// src/models/mod.rs

pub mod assessment;
pub mod attempt;
pub mod course;
pub mod question;
pub mod site;
pub mod study;
