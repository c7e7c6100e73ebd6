use crate::loader::LoadError;
use crate::module::ModuleInfo;
use log::warn;
use semver::{Version, VersionReq};

/// Revision of the module interfaces this host provides.
///
/// Bumped whenever [`Module`](crate::Module) or [`Graphics`](crate::Graphics)
/// change shape. Modules declare the lowest revision they need through
/// `minimum_api_version`.
pub const API_VERSION: u32 = 1;

/// The host's own version.
pub fn host_version() -> Version {
    Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or_else(|_| Version::new(0, 0, 0))
}

/// Checks a module's metadata against this host and an optional version
/// requirement.
///
/// A version that isn't valid SemVer is only an error when a requirement has
/// to be matched against it.
pub fn check_compatibility(
    info: &ModuleInfo,
    requirement: Option<&VersionReq>,
) -> Result<(), LoadError> {
    if info.minimum_api_version > API_VERSION {
        return Err(LoadError::ApiVersion {
            name: info.name.clone(),
            required: info.minimum_api_version,
            provided: API_VERSION,
        });
    }

    match (info.semver(), requirement) {
        (Ok(version), Some(requirement)) if !requirement.matches(&version) => {
            Err(LoadError::VersionMismatch {
                name: info.name.clone(),
                found: info.version.clone(),
                required: requirement.clone(),
            })
        }
        (Err(_), Some(requirement)) => Err(LoadError::VersionMismatch {
            name: info.name.clone(),
            found: info.version.clone(),
            required: requirement.clone(),
        }),
        (Err(e), None) => {
            warn!(
                "kiln: module `{}` has a non-semver version {:?} ({}).",
                info.name, info.version, e
            );
            Ok(())
        }
        _ => Ok(()),
    }
}
