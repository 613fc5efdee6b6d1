pub mod file;
pub mod goal_text;
pub mod stdin;
pub mod transactions;
