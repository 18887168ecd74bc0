pub mod config;
pub mod date_parse;
pub mod dialog;
pub mod interpret;
pub mod journal;
pub mod phrases;
pub mod search;
pub mod session;
pub mod skill;
pub mod tsv;

pub use date_parse::ParsedDate;
pub use journal::{Entry, Journal};
pub use skill::{JournalProvider, JournalSkill};
