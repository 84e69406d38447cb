//! Public link provisioning.
//!
//! A link is first created for the stored object. When the provider reports
//! that one already exists, the existing link is looked up instead. Either
//! way the URL is rewritten to its direct-download form before it is
//! returned.

mod error;
mod normalize;
mod service;

pub use error::LinkError;
pub use normalize::to_direct_url;
pub use service::{LinkProvisioner, PublicLink};
