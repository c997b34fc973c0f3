//! Chrome DevTools Protocol driver.
//!
//! A minimal client covering what the page auditor needs: page targets, navigation,
//! script evaluation, and shutdown.

mod client;
mod launcher;
mod page;
mod protocol;
#[cfg(test)]
mod testing;

pub use client::CdpClient;
pub use launcher::CdpLauncher;
pub use page::{CdpBrowser, CdpPage};
