//! Bootstrap data for a fresh database
//!
//! Seeding only fills empty tables and only creates the admin account when no
//! user of that name exists, so it is safe to run on every start.

use anyhow::Result;
use tracing::{info, instrument};

use crate::auth::ADMIN_ROLE;
use crate::dto::{CreateCategoryDto, CreateTimeframeDto, CreateUserDto};
use crate::models::{Category, Timeframe, User};
use crate::repo::{self, SqliteStore};
use crate::resource::Store;

const DEFAULT_CATEGORIES: [&str; 3] = ["General", "Health", "Work"];
const DEFAULT_TIMEFRAMES: [(&str, i32); 3] = [("Daily", 1), ("Weekly", 7), ("Monthly", 30)];

/// Credentials for the admin account created by seeding
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// What a seeding run inserted
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub timeframes: usize,
    pub admin_created: bool,
}

/// Inserts default categories, timeframes and, optionally, an admin account
#[instrument(skip_all)]
pub fn seed(store: &SqliteStore, admin: Option<&AdminCredentials>) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    if Store::<Category>::find_all(store)?.is_empty() {
        for name in DEFAULT_CATEGORIES {
            Store::<Category>::create(
                store,
                CreateCategoryDto {
                    name: name.to_string(),
                    description: None,
                },
            )?;
            report.categories += 1;
        }
    }

    if Store::<Timeframe>::find_all(store)?.is_empty() {
        for (name, days) in DEFAULT_TIMEFRAMES {
            Store::<Timeframe>::create(
                store,
                CreateTimeframeDto {
                    name: name.to_string(),
                    days: Some(days),
                },
            )?;
            report.timeframes += 1;
        }
    }

    if let Some(admin) = admin {
        if repo::find_user_by_username(store.pool(), &admin.username)?.is_none() {
            Store::<User>::create(
                store,
                CreateUserDto {
                    username: admin.username.clone(),
                    password: admin.password.clone(),
                    roles: vec![ADMIN_ROLE.to_string()],
                },
            )?;
            report.admin_created = true;
        }
    }

    info!(
        "Seeded {} categories, {} timeframes, admin created: {}",
        report.categories, report.timeframes, report.admin_created
    );
    Ok(report)
}
