//! Parsing of `requirements` entries from plugin descriptors.
//!
//! Requirements are path-like references such as
//! `github.com/acme/plugin-image-slider`. The last two `/`-separated
//! segments are the vendor and the plugin name, and a leading `plugin-` is
//! dropped from the name, so that reference resolves to `acme/image-slider`.

use crate::error::{Error, Result};
use crate::manifest::{PluginKey, segment_problem};

/// Conventional repository-name prefix stripped from requirement names.
pub const NAME_PREFIX: &str = "plugin-";

/// Parse a requirement reference into the key of the required plugin.
pub fn parse_requirement(requirement: &str) -> Result<PluginKey> {
    let segments: Vec<&str> = requirement.trim().split('/').collect();
    if segments.len() < 2 {
        return Err(Error::InvalidRequirement {
            requirement: requirement.to_string(),
            reason: "expected at least <vendor>/<name>".to_string(),
        });
    }

    let vendor = segments[segments.len() - 2].trim();
    let raw_name = segments[segments.len() - 1].trim();
    let name = raw_name.strip_prefix(NAME_PREFIX).unwrap_or(raw_name);

    let key = PluginKey::new(vendor, name);
    let problem = segment_problem(vendor)
        .map(|p| format!("vendor segment {p}"))
        .or_else(|| key.unsafe_reason());
    match problem {
        Some(reason) => Err(Error::InvalidRequirement {
            requirement: requirement.to_string(),
            reason,
        }),
        None => Ok(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("github.com/pocketstore-io/plugin-image-slider", "pocketstore-io", "image-slider")]
    #[case("github.com/pocketstore-io/reviews", "pocketstore-io", "reviews")]
    #[case("host/v2/plugin-p2", "v2", "p2")]
    #[case("acme/slider", "acme", "slider")]
    #[case("a/b/c/d/plugin-e", "d", "e")]
    fn test_parse_valid(#[case] raw: &str, #[case] vendor: &str, #[case] name: &str) {
        assert_eq!(parse_requirement(raw).unwrap(), PluginKey::new(vendor, name));
    }

    #[rstest]
    #[case("")]
    #[case("just-a-name")]
    #[case("host/acme/")]
    #[case("/name")]
    #[case("host/acme/plugin-")]
    #[case("github.com/acme/..")]
    #[case("h/../..")]
    #[case("github.com/./plugin-slider")]
    #[case("github.com/acme/plugin-..")]
    #[case("github.com/acme/a\\..")]
    fn test_parse_invalid(#[case] raw: &str) {
        let err = parse_requirement(raw).unwrap_err();
        assert!(matches!(err, Error::InvalidRequirement { .. }), "got {err:?}");
    }

    proptest! {
        #[test]
        fn test_prefix_segments_do_not_matter(
            host in "[a-z.]{0,12}",
            vendor in "[a-z0-9-]{1,10}",
            name in "[a-z0-9]{1,10}",
        ) {
            let with_host = format!("{host}/{vendor}/plugin-{name}");
            let bare = format!("{vendor}/{name}");
            prop_assert_eq!(parse_requirement(&with_host).unwrap(), parse_requirement(&bare).unwrap());
        }
    }
}
