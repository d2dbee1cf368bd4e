mod doh;

pub use doh::handle_doh;
