// src/utils/mod.rs
pub mod fonts;
pub mod fsio;
pub mod html;
pub mod png;
