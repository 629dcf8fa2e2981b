//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): every failure a request can end in
//! - [`IoResultExt`](context::IoResultExt): IO error to `NetError` context helpers

pub mod context;
pub mod neterror;
