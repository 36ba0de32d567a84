pub mod assignment;
pub mod classroom;
pub mod classroom_selector;
pub mod client;
pub mod creds;
pub mod error;
pub mod pull_request;
pub mod services;
pub mod sheets;
pub mod submission;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

mod util;

pub use util::{GITHUB_API_URL, SHEETS_API_URL};
