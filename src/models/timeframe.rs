use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dto::{CreateTimeframeDto, UpdateTimeframeDto};
use crate::resource::Resource;

/// How often a reminder recurs
#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::timeframes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Timeframe {
    pub id: i32,
    pub name: String,
    /// Length of the timeframe in days
    pub days: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Resource for Timeframe {
    const NAME: &'static str = "timeframes";
    type Create = CreateTimeframeDto;
    type Update = UpdateTimeframeDto;

    fn id(&self) -> i32 {
        self.id
    }
}
