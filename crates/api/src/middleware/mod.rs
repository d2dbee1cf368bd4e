mod gateway_headers;

pub use gateway_headers::{gateway_headers, SERVER_NAME};
