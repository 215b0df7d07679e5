//! Packaging of Go modules into distributable zip archives.
//!
//! `gopack-core` reads a module's identity from its `go.mod`, settles on a
//! version (optionally a pseudo-version stamped with a timestamp and
//! revision), and writes every selected file of a source tree into a zip
//! whose entries are named `module@version/relative/path`.
//!
//! Two sources ship with the crate: a plain directory ([`FsSource`]) and a
//! committed git revision ([`GitSource`]). Both are exposed as drivers
//! through [`DriverRegistry`], which selects one by name from positional
//! arguments.
//!
//! # Examples
//!
//! ```no_run
//! use gopack_core::DriverRegistry;
//! use gopack_core::NoopProgress;
//! use gopack_core::PackagingOptions;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = PackagingOptions::new(["fs", "-d", "example"]).with_version("v1.2.3");
//! let archive = DriverRegistry::builtin().dispatch(&options, &mut NoopProgress)?;
//! println!("Packaged {} files", archive.report().files_added);
//! archive.persist("example.zip")?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod config;
pub mod driver;
pub mod error;
pub mod filter;
pub mod module;
pub mod report;
pub mod source;
pub mod version;

// Re-export main API types
pub use archive::ArchiveBuilder;
pub use archive::PackagedArchive;
pub use config::ArchiveConfig;
pub use config::PackagingOptions;
pub use driver::Driver;
pub use driver::DriverRegistry;
pub use error::PackError;
pub use error::Result;
pub use filter::PathFilter;
pub use report::NoopProgress;
pub use report::PackReport;
pub use report::ProgressCallback;
pub use source::FileEntry;
pub use source::FsSource;
pub use source::GitSource;
pub use source::Listing;
pub use source::ModuleSource;
pub use source::package;
