//! Named packaging drivers.
//!
//! A driver turns the positional arguments that follow its name into a
//! [`ModuleSource`](crate::source::ModuleSource) and packages it. Drivers
//! live in an explicit [`DriverRegistry`] built by the caller; nothing is
//! registered globally.

use crate::PackError;
use crate::PackagingOptions;
use crate::ProgressCallback;
use crate::Result;
use crate::archive::PackagedArchive;
use crate::source;
use std::fmt;
use std::fmt::Write as _;
use tracing::debug;

/// Signature of a driver entry point.
///
/// `options.args` holds the driver's own flags, with the driver name
/// already removed.
pub type DriverFn = fn(PackagingOptions, &mut dyn ProgressCallback) -> Result<PackagedArchive>;

/// A named packaging strategy.
#[derive(Clone, Copy)]
pub struct Driver {
    /// Name used to select the driver on the command line.
    pub name: &'static str,

    /// One-line description shown in the driver listing.
    pub description: &'static str,

    /// Entry point.
    pub entry: DriverFn,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Ordered set of drivers with unique names.
///
/// # Examples
///
/// ```
/// use gopack_core::DriverRegistry;
///
/// let registry = DriverRegistry::builtin();
/// let names: Vec<_> = registry.drivers().map(|d| d.name).collect();
/// assert_eq!(names, ["fs", "git"]);
/// assert!(registry.listing().starts_with("Available drivers:"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DriverRegistry {
    drivers: Vec<Driver>,
}

impl DriverRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the `fs` and `git` drivers.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            drivers: vec![source::fs::driver(), source::git::driver()],
        }
    }

    /// Adds a driver.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::DuplicateDriver`] if the name is already taken.
    pub fn register(&mut self, driver: Driver) -> Result<()> {
        if self.get(driver.name).is_some() {
            return Err(PackError::DuplicateDriver {
                name: driver.name.to_string(),
            });
        }
        self.drivers.push(driver);
        Ok(())
    }

    /// Looks up a driver by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Driver> {
        self.drivers.iter().find(|d| d.name == name)
    }

    /// Iterates drivers in registration order.
    pub fn drivers(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.iter()
    }

    /// Runs the driver named by `options.args[0]` with the remaining
    /// arguments.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::UnknownDriver`] when no name is given or the
    /// name is not registered, and otherwise whatever the driver returns.
    pub fn dispatch(
        &self,
        options: &PackagingOptions,
        progress: &mut dyn ProgressCallback,
    ) -> Result<PackagedArchive> {
        let Some(name) = options.args.first() else {
            return Err(PackError::UnknownDriver { requested: None });
        };
        let driver = self.get(name).ok_or_else(|| PackError::UnknownDriver {
            requested: Some(name.clone()),
        })?;

        debug!(driver = driver.name, args = ?&options.args[1..], "dispatching");
        (driver.entry)(options.shifted(), progress)
    }

    /// Renders the driver listing shown on usage errors.
    ///
    /// Names are left-aligned in a column four characters wider than the
    /// longest name.
    #[must_use]
    pub fn listing(&self) -> String {
        let pad = self.drivers.iter().map(|d| d.name.len()).max().unwrap_or(0) + 4;
        let mut out = String::from("Available drivers: \n");
        for driver in &self.drivers {
            let _ = writeln!(out, "  {:<pad$}{}", driver.name, driver.description);
        }
        out
    }
}
