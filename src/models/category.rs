use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dto::{CreateCategoryDto, UpdateCategoryDto};
use crate::resource::Resource;

/// A grouping reminders can belong to
#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Resource for Category {
    const NAME: &'static str = "categories";
    type Create = CreateCategoryDto;
    type Update = UpdateCategoryDto;

    fn id(&self) -> i32 {
        self.id
    }
}
