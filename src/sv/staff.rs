use serde::Deserialize;

use crate::{
  entity::{StaffRole, staff},
  prelude::*,
};

#[derive(Debug, Clone, Deserialize)]
pub struct NewStaff {
  pub name: String,
  pub role: StaffRole,
}

pub struct Staff<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Staff<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Only active staff members can act on the ledger.
  pub async fn active_by_id(&self, id: i32) -> Result<staff::Model> {
    staff::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .filter(|staff| staff.active)
      .ok_or(Error::StaffNotFound)
  }

  pub async fn all(&self) -> Result<Vec<staff::Model>> {
    let staff = staff::Entity::find()
      .order_by_asc(staff::Column::Name)
      .all(self.db)
      .await?;
    Ok(staff)
  }

  pub async fn create(&self, req: NewStaff) -> Result<staff::Model> {
    let name = req.name.trim();
    if name.is_empty() {
      return Err(Error::InvalidArgs("Staff name is required".into()));
    }

    let staff = staff::ActiveModel {
      id: NotSet,
      name: Set(name.into()),
      role: Set(req.role),
      active: Set(true),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(self.db)
    .await?;

    info!("Staff #{} '{}' added as {:?}", staff.id, staff.name, staff.role);
    Ok(staff)
  }

  /// Creates an admin named `name` when nobody is on staff yet.
  pub async fn ensure_bootstrap_admin(
    &self,
    name: &str,
  ) -> Result<Option<staff::Model>> {
    if staff::Entity::find().one(self.db).await?.is_some() {
      return Ok(None);
    }

    let admin = self
      .create(NewStaff { name: name.into(), role: StaffRole::Admin })
      .await?;
    warn!(
      "No staff found, created bootstrap admin #{} '{}'",
      admin.id, admin.name
    );
    Ok(Some(admin))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::test_db;

  #[tokio::test]
  async fn bootstrap_admin_only_on_empty_table() {
    let db = test_db::setup().await;
    let staff = Staff::new(&db);

    let admin = staff.ensure_bootstrap_admin("root").await.unwrap().unwrap();
    assert_eq!(admin.role, StaffRole::Admin);
    assert!(staff.ensure_bootstrap_admin("root").await.unwrap().is_none());
    assert_eq!(staff.all().await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn inactive_staff_are_not_found() {
    let db = test_db::setup().await;
    let fx = test_db::fixtures(&db).await;
    let staff = Staff::new(&db);

    assert_eq!(staff.active_by_id(fx.cashier.id).await.unwrap().name, "Carl");

    staff::ActiveModel { active: Set(false), ..fx.cashier.clone().into() }
      .update(&db)
      .await
      .unwrap();

    assert!(matches!(
      staff.active_by_id(fx.cashier.id).await,
      Err(Error::StaffNotFound)
    ));
  }
}
