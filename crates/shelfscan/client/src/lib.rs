//! HTTP binding to the shelfscan backend.
//!
//! Every identity-bound request carries the device identity twice: as the
//! `X-Device-ID` header and as the `deviceId` cookie. Requests are only built
//! once the [`SessionGate`](shelfscan_identity::SessionGate) is ready.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod client;
mod config;
mod error;
pub mod types;
pub mod upload;

pub use client::{ShelfClient, DEVICE_ID_HEADER};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use types::*;
pub use upload::{GoodreadsExport, ImageUpload};
