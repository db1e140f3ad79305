pub mod request_source;
