//! Stateless HTTP relay that forwards WebDAV requests from browsers to a
//! caller-named remote origin, working around CORS restrictions.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod cors;
mod error;
mod forwarder;
mod request;
mod response;
mod router;
mod service;
mod target;

pub use error::*;
pub use forwarder::*;
pub use request::*;
pub use response::*;
pub use router::*;
pub use service::*;
pub use target::*;
