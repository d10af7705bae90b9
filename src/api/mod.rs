pub mod activity;
pub mod process;
pub mod report;
