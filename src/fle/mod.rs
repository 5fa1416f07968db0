//! Fast Log Entry dialect: lexer, session compiler and QSL composition.

/// Session state machine and record emission.
pub mod compiler;
/// Line tokenizer.
pub mod lexer;
/// QSL message composition.
pub mod qsl;
/// Token and directive vocabulary.
pub mod token;

pub use compiler::{Compilation, LogFlags, SessionInfo, compile};
pub use qsl::{QslParts, compose_qsl_msg};
