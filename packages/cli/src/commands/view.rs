use super::Context;
use anyhow::Result;
use chrono::{DateTime, Local};
use clap::Args;
use colored::Colorize;
use diary_common::{DiaryEntry, EntryId};
use diary_editor::highlight;
use diary_viewer::ViewState;

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Entry identifier
    pub id: String,
}

pub async fn view(args: ViewArgs, ctx: &Context) -> Result<()> {
    println!("{}", "⏳ Loading entry...".bright_blue());

    match ctx.load_entry(&EntryId::new(args.id)).await? {
        ViewState::Ready { entry, is_author } => {
            print_entry(&entry, is_author);
            Ok(())
        }
        ViewState::Failed { reason } => anyhow::bail!("could not load entry: {}", reason),
        ViewState::Loading => anyhow::bail!("entry is still loading"),
    }
}

/// RFC 3339 timestamps in local time; anything else as given.
pub fn format_created_at(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub fn print_entry(entry: &DiaryEntry, is_author: bool) {
    println!();
    println!(
        "{} {}",
        format!("[{}]", entry.category.icon_asset()).dimmed(),
        entry.title.bright_white().bold()
    );
    println!("Written at: {}", format_created_at(&entry.created_at));
    println!();
    println!("{}", diary_markup::plain_text(&entry.real_content).trim_end());

    let blocks = highlight::code_blocks(&entry.real_content);
    if !blocks.is_empty() {
        println!();
        for (i, block) in blocks.iter().enumerate() {
            let language = block
                .language
                .map(|l| l.to_string())
                .unwrap_or_else(|| "plain".to_string());
            println!("  code block {}: {}", i + 1, language.cyan());
        }
    }

    if !entry.img_data.is_empty() {
        println!();
        println!("  {} image(s) attached", entry.img_data.len());
    }

    println!();
    if is_author {
        println!("Actions: {}, {}", "edit".green(), "delete".red());
    } else {
        println!("{}", "Read only".dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_created_at_keeps_unparsed_values() {
        assert_eq!(format_created_at("2024. 3. 1."), "2024. 3. 1.");
        assert_eq!(format_created_at(""), "");
    }

    #[test]
    fn test_format_created_at_parses_rfc3339() {
        let formatted = format_created_at("2024-03-01T12:00:00+00:00");
        assert_eq!(formatted.len(), "2024-03-01 12:00".len());
        assert!(formatted.starts_with("2024-03-0"));
    }
}
