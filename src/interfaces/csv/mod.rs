pub mod ledger_reader;
pub mod member_reader;
pub mod report_writer;
