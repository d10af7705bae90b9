pub mod activity;
pub mod employee;
pub mod ledger;
