//! RBAC subject matching shared by the resolver and the RBAC authorizer.

use pkg_types::rbac::{Subject, SubjectKind};
use pkg_types::user::UserInfo;

/// Whether any subject of a binding matches the user.
///
/// `binding_namespace` is `Some` for RoleBindings and `None` for
/// ClusterRoleBindings. A ServiceAccount subject with an empty namespace
/// defaults to the RoleBinding's namespace; in a ClusterRoleBinding it never
/// matches.
pub fn subjects_match(
    subjects: &[Subject],
    user: &UserInfo,
    binding_namespace: Option<&str>,
) -> bool {
    subjects
        .iter()
        .any(|s| subject_matches(s, user, binding_namespace))
}

fn subject_matches(subject: &Subject, user: &UserInfo, binding_namespace: Option<&str>) -> bool {
    match subject.kind {
        SubjectKind::User => subject.name == user.name,
        SubjectKind::Group => user.groups.iter().any(|g| *g == subject.name),
        SubjectKind::ServiceAccount => {
            let sa_namespace = match subject.namespace.as_deref().filter(|ns| !ns.is_empty()) {
                Some(ns) => ns,
                None => match binding_namespace {
                    Some(ns) => ns,
                    None => return false,
                },
            };
            UserInfo::service_account_name(sa_namespace, &subject.name) == user.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_subject(name: &str) -> Subject {
        Subject {
            kind: SubjectKind::User,
            name: name.into(),
            namespace: None,
        }
    }

    #[test]
    fn user_matches_by_name() {
        let user = UserInfo::new("alice", &[]);
        assert!(subjects_match(&[user_subject("alice")], &user, None));
        assert!(!subjects_match(&[user_subject("bob")], &user, None));
    }

    #[test]
    fn group_matches_by_membership() {
        let user = UserInfo::new("alice", &["developers", "team-a"]);
        let subject = Subject {
            kind: SubjectKind::Group,
            name: "team-a".into(),
            namespace: None,
        };
        assert!(subjects_match(&[subject.clone()], &user, None));

        let outsider = UserInfo::new("bob", &["team-b"]);
        assert!(!subjects_match(&[subject], &outsider, None));
    }

    #[test]
    fn service_account_matches_canonical_name() {
        let sa = UserInfo::new("system:serviceaccount:app-ns:builder", &[]);
        let subject = Subject {
            kind: SubjectKind::ServiceAccount,
            name: "builder".into(),
            namespace: Some("app-ns".into()),
        };
        assert!(subjects_match(&[subject], &sa, None));
    }

    #[test]
    fn empty_sa_namespace_defaults_to_role_binding_namespace() {
        let sa = UserInfo::new("system:serviceaccount:app-ns:builder", &[]);
        let subject = Subject {
            kind: SubjectKind::ServiceAccount,
            name: "builder".into(),
            namespace: None,
        };
        // Defaulting applies inside a RoleBinding.
        assert!(subjects_match(&[subject.clone()], &sa, Some("app-ns")));
        assert!(!subjects_match(&[subject.clone()], &sa, Some("other-ns")));
        // Never matches in a ClusterRoleBinding.
        assert!(!subjects_match(&[subject], &sa, None));
    }

    #[test]
    fn any_matching_subject_is_enough() {
        let user = UserInfo::new("carol", &[]);
        let subjects = vec![user_subject("alice"), user_subject("carol")];
        assert!(subjects_match(&subjects, &user, None));
    }
}
