use anyhow::{Context, Result};
use chrono::Utc;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use super::SqliteStore;
use crate::dto::{
    CreateCategoryDto, CreateReminderDto, CreateTestDto, CreateTimeframeDto, UpdateCategoryDto,
    UpdateReminderDto, UpdateTestDto, UpdateTimeframeDto,
};
use crate::models::{Category, Reminder, Test, Timeframe};
use crate::resource::{Resource, Store};

/// Implements [`Store`] on [`SqliteStore`] for a table whose create and
/// update DTOs map directly onto its columns
///
/// The table needs an integer `id` primary key and an `updated_at` column,
/// which is refreshed on every update.
macro_rules! sqlite_store {
    ($model:ty, $table:ident, $create:ty, $update:ty) => {
        impl Store<$model> for SqliteStore {
            #[instrument(skip_all, fields(resource = <$model as Resource>::NAME))]
            fn find_all(&self) -> Result<Vec<$model>> {
                let conn = &mut self.pool.get()?;

                let records = crate::schema::$table::table
                    .order(crate::schema::$table::id.asc())
                    .select(<$model>::as_select())
                    .load(conn)
                    .with_context(|| format!("failed to list {}", <$model as Resource>::NAME))?;

                info!("Retrieved {} records", records.len());
                Ok(records)
            }

            #[instrument(skip(self), fields(resource = <$model as Resource>::NAME))]
            fn find_by_id(&self, id: i32) -> Result<Option<$model>> {
                let conn = &mut self.pool.get()?;

                let record = crate::schema::$table::table
                    .find(id)
                    .select(<$model>::as_select())
                    .first(conn)
                    .optional()
                    .with_context(|| format!("failed to get {} {}", <$model as Resource>::NAME, id))?;

                if record.is_none() {
                    debug!("Record not found");
                }
                Ok(record)
            }

            #[instrument(skip_all, fields(resource = <$model as Resource>::NAME))]
            fn create(&self, fields: $create) -> Result<$model> {
                let conn = &mut self.pool.get()?;

                let record: $model = diesel::insert_into(crate::schema::$table::table)
                    .values(&fields)
                    .returning(<$model>::as_returning())
                    .get_result(conn)
                    .with_context(|| format!("failed to create {}", <$model as Resource>::NAME))?;

                info!("Created record with id: {}", record.id);
                Ok(record)
            }

            #[instrument(skip_all, fields(resource = <$model as Resource>::NAME, id = record.id))]
            fn update(&self, record: $model, changes: $update) -> Result<$model> {
                let conn = &mut self.pool.get()?;

                let updated = diesel::update(crate::schema::$table::table.find(record.id))
                    .set((
                        &changes,
                        crate::schema::$table::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .returning(<$model>::as_returning())
                    .get_result(conn)
                    .with_context(|| {
                        format!("failed to update {} {}", <$model as Resource>::NAME, record.id)
                    })?;

                info!("Updated record");
                Ok(updated)
            }

            #[instrument(skip_all, fields(resource = <$model as Resource>::NAME, id = record.id))]
            fn destroy(&self, record: $model) -> Result<()> {
                let conn = &mut self.pool.get()?;

                diesel::delete(crate::schema::$table::table.find(record.id))
                    .execute(conn)
                    .with_context(|| {
                        format!("failed to delete {} {}", <$model as Resource>::NAME, record.id)
                    })?;

                info!("Deleted record");
                Ok(())
            }
        }
    };
}

sqlite_store!(Category, categories, CreateCategoryDto, UpdateCategoryDto);
sqlite_store!(Timeframe, timeframes, CreateTimeframeDto, UpdateTimeframeDto);
sqlite_store!(Reminder, reminders, CreateReminderDto, UpdateReminderDto);
sqlite_store!(Test, tests, CreateTestDto, UpdateTestDto);
