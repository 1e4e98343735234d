use super::Context;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use diary_common::EntryId;
use diary_viewer::ViewState;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Entry identifier
    pub id: String,
}

pub async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let id = EntryId::new(args.id);

    // Stored images come from the persisted entry.
    let entry = match ctx.load_entry(&id).await? {
        ViewState::Ready { entry, .. } => entry,
        ViewState::Failed { reason } => anyhow::bail!("could not load entry: {}", reason),
        ViewState::Loading => anyhow::bail!("entry is still loading"),
    };

    let report = ctx.deletion().delete(&id, &entry.img_data).await?;

    println!(
        "{} Deleted {} ({} image(s){})",
        "🗑".red(),
        entry.title.bright_white(),
        report.media_requested,
        if report.media_error.is_some() {
            ", cleanup failed"
        } else {
            ""
        }
    );
    Ok(())
}
