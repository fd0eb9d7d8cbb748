//! Bulk access review evaluation: one effective subject, per-query fan-out
//! with strict order preservation.

use anyhow::bail;
use tracing::debug;

use pkg_types::authorization::{
    AccessAttributes, AccessReviewRequest, AccessReviewResult, BulkSubjectAccessReviewSpec,
    BulkSubjectAccessReviewStatus,
};
use pkg_types::user::UserInfo;

use crate::authorizer::{Authorizer, Decision};

/// Evaluate every request of a bulk review under a single effective subject.
///
/// A non-empty `spec.user` selects impersonated mode; otherwise the
/// authenticated caller is the subject, and its absence is a hard error.
/// Per-query authorizer failures land in `results[i].evaluation_error` and
/// never fail the call; `results[i]` always corresponds to `requests[i]`.
pub async fn evaluate_bulk_review(
    authorizer: &dyn Authorizer,
    caller: Option<&UserInfo>,
    spec: &BulkSubjectAccessReviewSpec,
) -> anyhow::Result<BulkSubjectAccessReviewStatus> {
    let subject = effective_subject(caller, spec)?;
    debug!(
        "Evaluating bulk review: {} requests for user {}",
        spec.requests.len(),
        subject.name
    );

    let mut results = Vec::with_capacity(spec.requests.len());
    for request in &spec.requests {
        results.push(evaluate_one(authorizer, &subject, request).await);
    }
    Ok(BulkSubjectAccessReviewStatus { results })
}

/// Impersonated mode when `spec.user` is set, self mode otherwise. Chosen
/// once per review and applied to every request.
fn effective_subject(
    caller: Option<&UserInfo>,
    spec: &BulkSubjectAccessReviewSpec,
) -> anyhow::Result<UserInfo> {
    if !spec.user.is_empty() {
        return Ok(UserInfo {
            name: spec.user.clone(),
            groups: spec.groups.clone(),
            extra: spec.extra.clone(),
        });
    }
    match caller {
        Some(user) => Ok(user.clone()),
        None => bail!("no authenticated user in request context"),
    }
}

async fn evaluate_one(
    authorizer: &dyn Authorizer,
    subject: &UserInfo,
    request: &AccessReviewRequest,
) -> AccessReviewResult {
    let attrs = match (&request.resource_attributes, &request.non_resource_attributes) {
        (Some(resource), None) => {
            AccessAttributes::for_resource(subject.clone(), resource.clone())
        }
        (None, Some(non_resource)) => {
            AccessAttributes::for_non_resource(subject.clone(), non_resource.clone())
        }
        _ => {
            return AccessReviewResult {
                evaluation_error:
                    "exactly one of resourceAttributes or nonResourceAttributes must be set"
                        .to_string(),
                ..Default::default()
            };
        }
    };

    match authorizer.authorize(&attrs).await {
        Ok((Decision::Allow, reason)) => AccessReviewResult {
            allowed: true,
            reason,
            ..Default::default()
        },
        Ok((Decision::Deny, reason)) => AccessReviewResult {
            denied: true,
            reason,
            ..Default::default()
        },
        Ok((Decision::NoOpinion, reason)) => AccessReviewResult {
            reason,
            ..Default::default()
        },
        Err(e) => AccessReviewResult {
            evaluation_error: e.to_string(),
            ..Default::default()
        },
    }
}
