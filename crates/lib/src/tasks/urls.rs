//! `resolve_urls`: point relative URLs in the configuration at the user's code.

use tracing::debug;

use crate::build::{BuildContext, TaskError};
use crate::command::Invocation;

/// Directory user code is copied to inside every platform template.
pub const USER_CODE_PREFIX: &str = "src";

/// Prefix a relative URL with `prefix/`. URLs with a scheme, protocol-relative
/// URLs and absolute paths are returned unchanged.
pub fn resolve_url(url: &str, prefix: &str) -> String {
  if url.is_empty() || url.starts_with('/') || has_scheme(url) {
    return url.to_string();
  }
  format!("{}/{}", prefix.trim_end_matches('/'), url.trim_start_matches("./"))
}

fn has_scheme(url: &str) -> bool {
  match url.split_once(':') {
    Some((scheme, _)) => {
      let mut chars = scheme.chars();
      chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    }
    None => false,
  }
}

/// `resolve_urls(*locations)`
///
/// Each location names strings in the configuration (see
/// [`Configuration::transform`](crate::config::Configuration::transform)).
pub fn resolve_urls(ctx: &mut BuildContext<'_>, call: &Invocation<'_>) -> Result<(), TaskError> {
  for location in call.str_args()? {
    debug!(location = %location, "resolving urls");
    ctx
      .config
      .transform(location, &mut |url| resolve_url(url, USER_CODE_PREFIX));
  }
  Ok(())
}
