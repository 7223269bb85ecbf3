pub use std::{
  collections::{BTreeMap, BTreeSet, HashMap, HashSet},
  sync::Arc,
  time::Duration,
};

pub use chrono::{
  NaiveDate as Date, NaiveDateTime as DateTime, NaiveTime, TimeDelta, Utc,
};
pub use dashmap::DashMap;
pub use migration::{Migrator, MigratorTrait};
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection,
  EntityTrait, NotSet, QueryFilter, QueryOrder, QuerySelect, Set,
  TransactionTrait,
};
pub use tracing::{debug, error, info, warn};

pub use crate::{
  error::{Error, Result},
  money::Money,
};
