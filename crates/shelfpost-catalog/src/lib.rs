//! HTTP access to the bookstore catalog: the listing of current titles and
//! the per-title product pages.

pub mod client;
pub mod error;
pub mod extract;
mod html;
mod rate_limit;

pub use client::CatalogClient;
pub use error::CatalogError;
