pub mod pin_reader;
