use crate::{
  entity::bank_account,
  notify::{Change, Notifier},
  prelude::*,
};

pub struct BankAccounts<'a> {
  db: &'a DatabaseConnection,
  notifier: &'a Notifier,
}

impl<'a> BankAccounts<'a> {
  pub fn new(db: &'a DatabaseConnection, notifier: &'a Notifier) -> Self {
    Self { db, notifier }
  }

  pub async fn active(&self) -> Result<Vec<bank_account::Model>> {
    let accounts = bank_account::Entity::find()
      .filter(bank_account::Column::Active.eq(true))
      .order_by_asc(bank_account::Column::Name)
      .all(self.db)
      .await?;
    Ok(accounts)
  }

  pub async fn by_id(&self, id: i32) -> Result<bank_account::Model> {
    bank_account::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::BankAccountNotFound)
  }

  pub async fn create(&self, name: &str) -> Result<bank_account::Model> {
    let name = valid_name(name)?;
    self.ensure_unique(&name, None).await?;

    let account = bank_account::ActiveModel {
      id: NotSet,
      name: Set(name),
      active: Set(true),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(self.db)
    .await?;

    info!("Bank account #{} '{}' created", account.id, account.name);
    self.notifier.bump(Change::BankAccount);
    Ok(account)
  }

  pub async fn rename(
    &self,
    id: i32,
    name: &str,
  ) -> Result<bank_account::Model> {
    let name = valid_name(name)?;
    let account = self.by_id(id).await?;
    self.ensure_unique(&name, Some(id)).await?;

    let account = bank_account::ActiveModel { name: Set(name), ..account.into() }
      .update(self.db)
      .await?;

    self.notifier.bump(Change::BankAccount);
    Ok(account)
  }

  /// Soft delete. Historical transactions keep pointing at the row.
  pub async fn deactivate(&self, id: i32) -> Result<bank_account::Model> {
    let account = self.by_id(id).await?;
    if !account.active {
      return Ok(account);
    }

    let account = bank_account::ActiveModel { active: Set(false), ..account.into() }
      .update(self.db)
      .await?;

    info!("Bank account #{} '{}' deactivated", account.id, account.name);
    self.notifier.bump(Change::BankAccount);
    Ok(account)
  }

  async fn ensure_unique(&self, name: &str, except: Option<i32>) -> Result<()> {
    let mut select = bank_account::Entity::find()
      .filter(bank_account::Column::Active.eq(true))
      .filter(bank_account::Column::Name.eq(name));
    if let Some(id) = except {
      select = select.filter(bank_account::Column::Id.ne(id));
    }

    match select.one(self.db).await? {
      Some(_) => Err(Error::DuplicateName),
      None => Ok(()),
    }
  }
}

fn valid_name(name: &str) -> Result<String> {
  let name = name.trim();
  if name.is_empty() {
    return Err(Error::InvalidArgs("Bank account name is required".into()));
  }
  Ok(name.to_owned())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::test_db;

  #[tokio::test]
  async fn names_are_unique_among_active_accounts() {
    let db = test_db::setup().await;
    let notifier = Notifier::default();
    let banks = BankAccounts::new(&db, &notifier);

    let first = banks.create("Revolut").await.unwrap();
    assert!(matches!(banks.create(" Revolut ").await, Err(Error::DuplicateName)));

    banks.deactivate(first.id).await.unwrap();
    let second = banks.create("Revolut").await.unwrap();

    assert_ne!(first.id, second.id);
    let active: Vec<i32> = banks.active().await.unwrap().iter().map(|a| a.id).collect();
    assert_eq!(active, vec![second.id]);
    // the deactivated row is still there for old transactions
    assert!(!banks.by_id(first.id).await.unwrap().active);
  }

  #[tokio::test]
  async fn rename_checks_other_accounts_only() {
    let db = test_db::setup().await;
    let notifier = Notifier::default();
    let banks = BankAccounts::new(&db, &notifier);

    let main = banks.create("Main").await.unwrap();
    banks.create("Savings").await.unwrap();

    assert_eq!(banks.rename(main.id, "Main").await.unwrap().name, "Main");
    assert!(matches!(banks.rename(main.id, "Savings").await, Err(Error::DuplicateName)));
    assert!(matches!(banks.rename(99, "Other").await, Err(Error::BankAccountNotFound)));
    assert!(matches!(banks.create("  ").await, Err(Error::InvalidArgs(_))));

    let renamed = banks.rename(main.id, "Operating").await.unwrap();
    assert_eq!(renamed.name, "Operating");
  }
}
