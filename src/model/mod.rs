// File: ./src/model/mod.rs
pub mod parser;
pub mod roster;
pub mod schedule;

pub use parser::{LineShape, ParserOptions, ScheduleParser, classify_line};
pub use roster::{CastDocument, FULL_CAST, GroupMappings, Roster};
pub use schedule::{Schedule, TimeBlock};
