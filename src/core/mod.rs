// Core modules implementing the record scheme, union decoding, and error modeling.
pub mod error;
pub mod record;
pub mod union;
