//! Authentication header and identity constants.

/// Front-proxy header carrying the authenticated user name.
pub const REMOTE_USER_HEADER: &str = "x-remote-user";

/// Front-proxy header carrying one group per occurrence.
pub const REMOTE_GROUP_HEADER: &str = "x-remote-group";

/// Prefix of front-proxy headers carrying extra identity attributes.
/// The part after the prefix is the extra key.
pub const REMOTE_EXTRA_HEADER_PREFIX: &str = "x-remote-extra-";

/// User-name prefix for service accounts:
/// `system:serviceaccount:<namespace>:<name>`.
pub const SERVICE_ACCOUNT_PREFIX: &str = "system:serviceaccount:";

/// Group whose members get the bootstrap cluster-admin binding.
pub const MASTERS_GROUP: &str = "system:masters";
