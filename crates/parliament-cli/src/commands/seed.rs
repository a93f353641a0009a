//! Seed the `legislatures` table with the jurisdictions the pollers cover.
//!
//! Grounded in `poll_task.py`'s hard-coded legislature list: federal plus
//! the two provinces with a poller shipped so far.

use color_eyre::eyre::Result;
use parliament_core::{GovernmentLevel, Legislature};
use parliament_db::Database;

const SEEDS: &[(&str, &str, GovernmentLevel)] = &[
    ("CA", "House of Commons of Canada", GovernmentLevel::Federal),
    ("ON", "Legislative Assembly of Ontario", GovernmentLevel::Provincial),
    ("QC", "Assemblée nationale du Québec", GovernmentLevel::Provincial),
];

pub async fn run(database_url: &str) -> Result<()> {
    let db = Database::connect(database_url).await?;

    for &(code, name, level) in SEEDS {
        match db.legislatures().get_by_code(code).await {
            Ok(existing) => {
                println!("{}  {} (already seeded, id={})", code, existing.name, existing.id);
            }
            Err(parliament_db::DbError::NotFound(_)) => {
                let mut legislature = Legislature::new(code, name, level);
                if code == "QC" {
                    legislature.languages = vec!["fr".to_string(), "en".to_string()];
                }
                db.legislatures().create(&legislature).await?;
                println!("{}  {} (created, id={})", code, legislature.name, legislature.id);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}
