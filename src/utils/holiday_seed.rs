//! One-shot public holiday seeding.
//!
//! When the holidays table is empty (fresh install), the current year's
//! Philippine public holidays are pulled once from the date.nager.at API.
//! Failures are logged and leave the table empty; holidays can always be
//! entered manually through the API.

use std::time::Duration;

use anyhow::{Result, anyhow};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::MySqlPool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NagerHoliday {
    date: NaiveDate,
    local_name: Option<String>,
    name: String,
    types: Option<Vec<String>>,
}

impl NagerHoliday {
    fn display_name(&self) -> &str {
        self.local_name.as_deref().unwrap_or(&self.name)
    }

    /// Nationwide public holidays map to `Regular`; observances and bank
    /// holidays map to `Special` (special non-working days).
    fn holiday_type(&self) -> &'static str {
        match &self.types {
            Some(types) if types.iter().any(|t| t == "Public") => "Regular",
            _ => "Special",
        }
    }
}

/// Seed holidays from the public API if none exist locally.
pub async fn seed_if_empty(pool: &MySqlPool, api_base: &str, country: &str) -> Result<()> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM holidays")
        .fetch_one(pool)
        .await
        .map_err(|e| anyhow!("holiday count failed: {}", e))?;

    if existing > 0 {
        log::info!("Holiday seed skipped: {} holidays already present", existing);
        return Ok(());
    }

    let year = Utc::now().year();
    let url = format!("{}/api/v3/PublicHolidays/{}/{}", api_base, year, country);

    let client = awc::Client::default();
    let mut response = client
        .get(&url)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(|e| anyhow!("holiday API request failed: {}", e))?;

    if !response.status().is_success() {
        return Err(anyhow!("holiday API returned {}", response.status()));
    }

    let holidays: Vec<NagerHoliday> = response
        .json()
        .await
        .map_err(|e| anyhow!("holiday API payload invalid: {}", e))?;

    let mut inserted = 0usize;
    for holiday in &holidays {
        let result =
            sqlx::query("INSERT INTO holidays (name, holiday_type, date) VALUES (?, ?, ?)")
                .bind(holiday.display_name())
                .bind(holiday.holiday_type())
                .bind(holiday.date)
                .execute(pool)
                .await;

        match result {
            Ok(_) => inserted += 1,
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23000") => {
                // Duplicate date from the API; first one wins.
            }
            Err(e) => return Err(anyhow!("holiday insert failed: {}", e)),
        }
    }

    log::info!("Holiday seed complete: {} of {} inserted for {}", inserted, holidays.len(), year);
    Ok(())
}
