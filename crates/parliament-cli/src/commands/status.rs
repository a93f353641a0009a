//! Aggregate status display — the CLI counterpart of `/api/status`.

use color_eyre::eyre::Result;
use parliament_db::Database;

const RECENT_ERROR_LIMIT: i64 = 10;

pub async fn run(database_url: &str) -> Result<()> {
    let db = Database::connect(database_url).await?;

    let by_status = db.debates().count_by_status().await?;
    let total: i64 = by_status.iter().map(|(_, count)| count).sum();

    println!("total debates: {total}");
    for (status, count) in &by_status {
        println!("  {status:<16} {count}");
    }

    let errors = db.debates().recent_errors(RECENT_ERROR_LIMIT).await?;
    if !errors.is_empty() {
        println!("\nrecent errors:");
        for debate in &errors {
            println!(
                "  {}  {}  retries={}  {}",
                debate.id,
                debate.title,
                debate.retry_count,
                debate.error_message.as_deref().unwrap_or("")
            );
        }
    }

    Ok(())
}
