//! Aggregated API group constants.

/// API group served by this apiserver.
pub const API_GROUP: &str = "authorization.accessd.io";

/// Version of the API group served by this apiserver.
pub const API_VERSION: &str = "v1alpha1";

/// `group/version` string used in `apiVersion` fields.
pub const GROUP_VERSION: &str = "authorization.accessd.io/v1alpha1";

/// Default port for the accessd API server.
pub const DEFAULT_API_PORT: u16 = 8443;

/// Read-only verbs. Everything else is considered mutating.
pub const READ_ONLY_VERBS: [&str; 3] = ["get", "list", "watch"];
