pub mod openai;
pub mod request;
pub mod unified;
