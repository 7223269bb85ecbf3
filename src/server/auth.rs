use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
  entity::{StaffRole, staff},
  prelude::*,
  state::AppState,
};

/// Header set by the authenticating proxy in front of the API.
pub const STAFF_HEADER: &str = "x-staff-id";

/// The staff member a request acts on behalf of.
#[derive(Debug, Clone)]
pub struct CurrentStaff(pub staff::Model);

impl CurrentStaff {
  pub fn id(&self) -> i32 {
    self.0.id
  }

  /// Admins pass every check.
  pub fn require(&self, roles: &[StaffRole]) -> Result<()> {
    let role = self.0.role;
    if role == StaffRole::Admin || roles.contains(&role) {
      Ok(())
    } else {
      debug!("Staff #{} ({:?}) denied, needs {:?}", self.0.id, role, roles);
      Err(Error::Forbidden)
    }
  }

  pub fn require_admin(&self) -> Result<()> {
    self.require(&[])
  }
}

impl FromRequestParts<Arc<AppState>> for CurrentStaff {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    app: &Arc<AppState>,
  ) -> Result<Self> {
    let id: i32 = parts
      .headers
      .get(STAFF_HEADER)
      .and_then(|value| value.to_str().ok())
      .and_then(|value| value.trim().parse().ok())
      .ok_or(Error::Unauthorized)?;

    match app.sv().staff.active_by_id(id).await {
      Ok(staff) => Ok(Self(staff)),
      Err(Error::StaffNotFound) => Err(Error::Unauthorized),
      Err(err) => Err(err),
    }
  }
}
