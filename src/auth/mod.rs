//! Cookie-based identity for the panel.
//!
//! Credentials live in two browser cookies and are validated by a separate
//! auth service. This module holds the cookie handling, the role allow-list
//! and the types handlers use to read the identity the gate resolved.

mod cookie;
mod errors;
mod extractors;
mod permissions;
mod types;

pub use cookie::{
    AUTH_COOKIE_NAME, ForwardedCookie, REFRESH_COOKIE_NAME, append_cookies, get_cookie,
    parse_set_cookie,
};
pub use errors::{PermissionsError, UpstreamError};
pub use extractors::OptionalAuth;
pub use permissions::{RolePermissions, path_within};
pub use types::{AuthUser, CurrentUser};
