//! User authentication: the private cookie format, the middleware that guards
//! routes, and redirect handling for unauthenticated requests.

mod cookie;
mod middleware;
mod redirect;
mod token;

pub(crate) use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use middleware::{auth_guard, auth_guard_hx};
pub use redirect::normalize_redirect_url;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
