//! Data models

mod answer;
mod challenge;
mod chat;
mod document;

pub use answer::*;
pub use challenge::*;
pub use chat::*;
pub use document::*;
