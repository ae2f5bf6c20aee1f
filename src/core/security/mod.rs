// Security helpers
//
// Path validation keeps linter paths inside the configured root, and the
// domain policy restricts which hosts the documentation tools may fetch.

pub mod domain_policy;
pub mod path_validator;

pub use domain_policy::{DomainPolicy, is_allowed};
pub use path_validator::{PathSecurityError, validate_dir, validate_path};
