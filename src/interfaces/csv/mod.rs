pub mod ticket_reader;
