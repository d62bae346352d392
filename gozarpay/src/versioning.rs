//! API version handling and logical route resolution.
//!
//! Business endpoints are addressed by version-independent logical names
//! (e.g. `"receipt.create"`). A [`VersionSpec`] holds the name-to-path table
//! for one API version and a [`VersionRouter`] resolves names against it,
//! substituting `{name}` placeholders. Both are immutable after construction
//! and freely shareable.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, RouteNotFoundError};

/// Supported upstream API versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// Version 1 (`/tp/v1/...` paths).
    #[default]
    V1,
    /// Version 2 (`/tp/v2/...` paths).
    V2,
}

impl ApiVersion {
    /// Returns the lowercase version tag (`"v1"` or `"v2"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(Self::V1),
            "v2" => Ok(Self::V2),
            other => Err(Error::Configuration {
                message: format!("unknown API version `{other}` (expected `v1` or `v2`)"),
            }),
        }
    }
}

/// The v1 routing table, from the upstream Swagger.
///
/// The v2 table is derived from this one by substituting the version segment.
const V1_ROUTES: &[(&str, &str)] = &[
    // market
    ("market.price_stats", "/tp/v1/mrt/markets/price-stats/"),
    // receipts
    ("receipt.create", "/tp/v1/rpt/divar/create/"),
    ("receipt.verify", "/tp/v1/rpt/divar/verify/"),
    ("receipt.refund", "/tp/v1/rpt/divar/refund/"),
    ("receipt.get", "/tp/v1/rpt/receipts/{id}/"),
    ("receipt.list", "/tp/v1/rpt/receipts/"),
    // wallets
    ("wallet.list_by_phone", "/tp/v1/wlt/wallets/{phone}/"),
];

/// Routing table for a single API version.
///
/// Maps logical route names to path templates with `{name}` placeholders.
/// Never mutated after construction.
#[derive(Debug, Clone)]
pub struct VersionSpec {
    version: ApiVersion,
    routes: HashMap<&'static str, String>,
}

impl VersionSpec {
    /// Builds the routing table for the given API version.
    #[must_use]
    pub fn for_version(version: ApiVersion) -> Self {
        let routes = V1_ROUTES
            .iter()
            .map(|&(key, path)| {
                let path = match version {
                    ApiVersion::V1 => path.to_owned(),
                    ApiVersion::V2 => path.replace("/v1/", "/v2/"),
                };
                (key, path)
            })
            .collect();
        Self { version, routes }
    }

    /// Returns the API version this table belongs to.
    #[must_use]
    pub const fn version(&self) -> ApiVersion {
        self.version
    }
}

/// Resolves logical route names to concrete versioned paths.
///
/// Pure and stateless after construction; no I/O.
#[derive(Debug, Clone)]
pub struct VersionRouter {
    spec: VersionSpec,
}

impl VersionRouter {
    /// Creates a router over the given version spec.
    #[must_use]
    pub const fn new(spec: VersionSpec) -> Self {
        Self { spec }
    }

    /// Returns the API version this router resolves against.
    #[must_use]
    pub const fn version(&self) -> ApiVersion {
        self.spec.version()
    }

    /// Resolves a logical route name to a concrete path, substituting
    /// `{name}` placeholders from `substitutions`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteNotFoundError`] if the logical name is not defined for
    /// the active version.
    pub fn resolve(
        &self,
        route: &str,
        substitutions: &[(&str, &str)],
    ) -> Result<String, RouteNotFoundError> {
        let template = self.spec.routes.get(route).ok_or_else(|| RouteNotFoundError {
            route: route.to_owned(),
            version: self.spec.version(),
        })?;
        let mut path = template.clone();
        for (name, value) in substitutions {
            path = path.replace(&format!("{{{name}}}"), value);
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_v1_path_with_substitution() {
        let router = VersionRouter::new(VersionSpec::for_version(ApiVersion::V1));
        let path = router.resolve("receipt.get", &[("id", "42")]).unwrap();
        assert_eq!(path, "/tp/v1/rpt/receipts/42/");
    }

    #[test]
    fn v2_table_swaps_version_segment() {
        let router = VersionRouter::new(VersionSpec::for_version(ApiVersion::V2));
        let path = router.resolve("receipt.get", &[("id", "42")]).unwrap();
        assert_eq!(path, "/tp/v2/rpt/receipts/42/");
    }

    #[test]
    fn routes_without_placeholders_ignore_substitutions() {
        let router = VersionRouter::new(VersionSpec::for_version(ApiVersion::V1));
        let path = router.resolve("receipt.create", &[]).unwrap();
        assert_eq!(path, "/tp/v1/rpt/divar/create/");
    }

    #[test]
    fn unknown_route_fails() {
        let router = VersionRouter::new(VersionSpec::for_version(ApiVersion::V1));
        let err = router.resolve("receipt.nope", &[]).unwrap_err();
        assert_eq!(err.route, "receipt.nope");
        assert_eq!(err.version, ApiVersion::V1);
    }

    #[test]
    fn version_parses_case_insensitively() {
        assert_eq!("V2".parse::<ApiVersion>().unwrap(), ApiVersion::V2);
        assert!("v3".parse::<ApiVersion>().is_err());
    }
}
