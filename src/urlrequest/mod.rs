pub mod builder;
pub mod job;
pub mod profile;
pub mod request;

pub use builder::build_request;
pub use job::RequestJob;
pub use profile::HeaderPreset;
pub use request::{RequestConfig, ALLOWED_METHODS, REDIRECT_OPTION};
