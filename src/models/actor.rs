//! Actor context passed into every lifecycle operation
//!
//! Authentication is the gateway's problem; by the time a request reaches
//! a service it carries an already-verified actor id and role, and the
//! services only decide ownership and role authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Marketplace roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Supplier,
    Driver,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Supplier => "supplier",
            Role::Driver => "driver",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// JWT claims carried by the bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorClaims {
    /// Actor id
    pub sub: Uuid,
    pub role: Role,
    /// Expiry, seconds since epoch
    pub exp: i64,
}

impl ActorClaims {
    /// Decode and verify a bearer token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = jsonwebtoken::decode::<ActorClaims>(
            token,
            &jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
            &jsonwebtoken::Validation::default(),
        )?;
        Ok(data.claims)
    }
}

/// Authenticated actor as seen by the lifecycle services
#[derive(Debug, Clone, Copy)]
pub struct ActorContext {
    pub actor_id: Uuid,
    pub role: Role,
}

impl ActorContext {
    pub fn new(actor_id: Uuid, role: Role) -> Self {
        Self { actor_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Customer operations; admins may act on a customer's behalf
    pub fn require_customer(&self) -> AppResult<()> {
        match self.role {
            Role::Customer | Role::Admin => Ok(()),
            _ => Err(AppError::Forbidden(format!(
                "Role '{}' may not perform customer operations",
                self.role
            ))),
        }
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Role '{}' may not perform dispatcher operations",
                self.role
            )))
        }
    }

    /// The actor must be the specific driver the record is assigned to
    pub fn require_assigned_driver(&self, assigned: Uuid) -> AppResult<()> {
        if self.role == Role::Driver && self.actor_id == assigned {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Only the assigned driver may advance this record".to_string(),
            ))
        }
    }

    /// The actor must own the record (or be an admin)
    pub fn require_owner(&self, owner: Uuid, what: &str) -> AppResult<()> {
        if self.actor_id == owner || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Actor does not own this {}",
                what
            )))
        }
    }

    /// The actor must be the specific supplier the record belongs to
    pub fn require_supplier(&self, supplier_id: Uuid) -> AppResult<()> {
        if self.role == Role::Supplier && self.actor_id == supplier_id {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Only the owning supplier may advance this request".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_ownership_is_checked_by_id() {
        let driver_id = Uuid::new_v4();
        let actor = ActorContext::new(driver_id, Role::Driver);
        assert!(actor.require_assigned_driver(driver_id).is_ok());
        assert!(actor.require_assigned_driver(Uuid::new_v4()).is_err());
    }

    #[test]
    fn admin_may_act_for_owner() {
        let admin = ActorContext::new(Uuid::new_v4(), Role::Admin);
        assert!(admin.require_owner(Uuid::new_v4(), "booking").is_ok());

        let stranger = ActorContext::new(Uuid::new_v4(), Role::Customer);
        assert!(stranger.require_owner(Uuid::new_v4(), "booking").is_err());
    }

    #[test]
    fn admin_is_not_a_driver() {
        let admin = ActorContext::new(Uuid::new_v4(), Role::Admin);
        assert!(admin.require_assigned_driver(admin.actor_id).is_err());
    }
}
