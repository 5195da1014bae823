pub mod openai;

pub use openai::handle_openai_stream;
