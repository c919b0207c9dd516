pub mod analysis;
pub mod backend;
pub mod context;
pub mod dialogue;
pub mod evaluation;
pub mod outcome;
pub mod prompt;
pub mod report;
pub mod sanitize;
pub mod session;
pub mod telephony;
