pub mod bodysource;
pub mod decoder;
pub mod multipart;
pub mod orderedheaders;
pub mod requestbody;
pub mod response;
pub mod responsebody;
pub mod transaction;
pub mod transport;

// Re-exports for convenience
pub use bodysource::{resolve_body, BodySources, BodyStrategy, ResolvedBody};
pub use decoder::{decode_response, Decoded};
pub use orderedheaders::{canonical_header_key, OrderedHeaderMap};
pub use requestbody::RequestBody;
pub use response::Response;
pub use responsebody::{ContentEncoding, DecodedBody, ResponseBody};
pub use transaction::{HttpTransaction, DEFAULT_TIMEOUT};
pub use transport::{HttpRequest, HttpResponse, HyperTransport, Transport};
