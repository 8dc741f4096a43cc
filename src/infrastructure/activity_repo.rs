use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::activity::{ActivityEntry, NewActivity};
use crate::domain::errors::DomainError;
use crate::domain::ports::ActivityLog;
use crate::schema::activity_log;

use super::models::{ActivityRow, NewActivityRow};

pub struct DieselActivityLog {
    pool: DbPool,
}

impl DieselActivityLog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ActivityLog for DieselActivityLog {
    fn record(&self, entry: NewActivity) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::insert_into(activity_log::table)
            .values(&NewActivityRow {
                user_name: entry.actor.name,
                user_role: entry.actor.role.as_str().to_string(),
                action: entry.action.as_str().to_string(),
                product_id: entry.product_id,
                product_sku: entry.product_sku,
                product_name: entry.product_name,
                details: entry.details,
            })
            .execute(&mut conn)?;
        Ok(())
    }

    fn recent(&self, limit: i64) -> Result<Vec<ActivityEntry>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = activity_log::table
            .select(ActivityRow::as_select())
            .order((activity_log::created_at.desc(), activity_log::id.desc()))
            .limit(limit)
            .load(&mut conn)?;
        Ok(rows.into_iter().map(ActivityEntry::from).collect())
    }
}
