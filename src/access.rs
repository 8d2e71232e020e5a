//! # Access Control Module
//!
//! Security annotations decide who may call an endpoint method. The same
//! rules filter methods out of the generated document (`DenyAll`) and guard
//! invocations at runtime.
//!
//! ## Annotations
//!
//! | Annotation         | Caller needed                       |
//! |--------------------|-------------------------------------|
//! | `DenyAll`          | nobody                              |
//! | `AnonymousAllowed` | anyone, signed in or not            |
//! | `PermitAll`        | any authenticated principal         |
//! | `RolesAllowed`     | an authenticated principal in role  |
//!
//! Annotations match by simple name, so `jakarta.annotation.security.DenyAll`
//! and `javax.annotation.security.DenyAll` are equivalent.
//!
//! ## Precedence
//!
//! Method annotations win over the declaring class, which wins over the
//! endpoint class the method is reached through. With no annotation at all
//! the method requires an authenticated caller.

use crate::model::{AnnotationInfoModel, ClassInfoModel, MethodInfoModel};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::fmt;

pub const DENY_ALL: &str = "DenyAll";
pub const PERMIT_ALL: &str = "PermitAll";
pub const ROLES_ALLOWED: &str = "RolesAllowed";
pub const ANONYMOUS_ALLOWED: &str = "AnonymousAllowed";

/// The authenticated caller of an endpoint method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub name: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Effective access rule of one endpoint method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "rule", content = "roles")]
pub enum AccessRule {
    DenyAll,
    AnonymousAllowed,
    #[default]
    PermitAll,
    RolesAllowed(Vec<String>),
}

/// Why a call was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    /// No principal, but one is required (401)
    Unauthenticated,
    /// A principal that is not allowed (403)
    Forbidden,
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessDenied::Unauthenticated => f.write_str("authentication required"),
            AccessDenied::Forbidden => f.write_str("access denied"),
        }
    }
}

impl AccessRule {
    /// Rule declared by one element's annotations, if any.
    ///
    /// `DenyAll` beats `AnonymousAllowed`, which beats `RolesAllowed`,
    /// which beats `PermitAll`.
    pub fn from_annotations(annotations: &[AnnotationInfoModel]) -> Option<Self> {
        let find = |name: &str| annotations.iter().find(|a| a.simple_name() == name);
        if find(DENY_ALL).is_some() {
            return Some(AccessRule::DenyAll);
        }
        if find(ANONYMOUS_ALLOWED).is_some() {
            return Some(AccessRule::AnonymousAllowed);
        }
        if let Some(roles) = find(ROLES_ALLOWED) {
            return Some(AccessRule::RolesAllowed(roles.string_list("value")));
        }
        if find(PERMIT_ALL).is_some() {
            return Some(AccessRule::PermitAll);
        }
        None
    }

    /// Effective rule for `method`, declared on `declaring` and reached
    /// through `endpoint`.
    pub fn effective(
        method: &MethodInfoModel,
        declaring: Option<&ClassInfoModel>,
        endpoint: Option<&ClassInfoModel>,
    ) -> Self {
        Self::from_annotations(method.annotations())
            .or_else(|| declaring.and_then(|c| Self::from_annotations(c.annotations())))
            .or_else(|| endpoint.and_then(|c| Self::from_annotations(c.annotations())))
            .unwrap_or_default()
    }

    pub fn check(&self, principal: Option<&Principal>) -> Result<(), AccessDenied> {
        match (self, principal) {
            (AccessRule::AnonymousAllowed, _) => Ok(()),
            (_, None) => Err(AccessDenied::Unauthenticated),
            (AccessRule::DenyAll, Some(_)) => Err(AccessDenied::Forbidden),
            (AccessRule::PermitAll, Some(_)) => Ok(()),
            (AccessRule::RolesAllowed(roles), Some(principal)) => {
                if roles.iter().any(|role| principal.has_role(role)) {
                    Ok(())
                } else {
                    Err(AccessDenied::Forbidden)
                }
            }
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, AccessRule::DenyAll)
    }

    /// The rule as it appears under `x-access` on an operation.
    pub fn to_extension(&self) -> Value {
        match self {
            AccessRule::DenyAll => json!({ "rule": "denyAll" }),
            AccessRule::AnonymousAllowed => json!({ "rule": "anonymousAllowed" }),
            AccessRule::PermitAll => json!({ "rule": "permitAll" }),
            AccessRule::RolesAllowed(roles) => json!({ "rule": "rolesAllowed", "roles": roles }),
        }
    }
}
