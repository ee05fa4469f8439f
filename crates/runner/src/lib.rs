#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `runner` starts `rsync --archive --progress` and turns its merged
//! stdout/stderr into the [`RunnerOutput`] items a progress session consumes:
//! one [`RunnerOutput::Fragment`] per `\r`- or `\n`-terminated chunk, then a
//! final [`RunnerOutput::Exit`].
//!
//! # Examples
//!
//! ```no_run
//! use runner::{Location, RsyncCommand};
//!
//! let source = Location::parse("/home/me/photos")?;
//! let destination = Location::parse("/mnt/backup")?;
//! for output in RsyncCommand::new(source, destination)?.spawn()? {
//!     println!("{:?}", output?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod command;
mod error;
mod location;
mod reader;
mod version;

pub use command::{RsyncCommand, RsyncProcess};
pub use error::{RunnerError, RunnerResult};
pub use location::Location;
pub use progress::RunnerOutput;
pub use reader::FragmentReader;
pub use version::{DEFAULT_PROGRAM, RsyncVersion, rsync_available, rsync_version, rsync_version_of};
