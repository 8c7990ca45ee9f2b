//! Parse SFV (Simple File Verification) manifests and check the files they
//! list against their CRC-32 checksums.

pub mod checksum;
pub mod error;
pub mod manifest;
pub mod parse;
pub mod path_safety;
pub mod progress;
pub mod verify;

pub use error::{MalformedReason, ParseError};
pub use manifest::{Manifest, ManifestEntry};
pub use progress::{NoProgress, Progress, ProgressSink};
pub use verify::{verify, verify_path, verify_with_config, BatchResult, FileResult, Outcome, VerifyConfig};
