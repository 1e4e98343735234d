use super::Context;
use crate::picker::FsPicker;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use diary_common::Category;
use diary_editor::{EditSession, Selection};
use diary_markup::tag::escape_attribute;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Args)]
pub struct WriteArgs {
    /// Entry title (at most 50 characters)
    #[arg(short, long, default_value = "")]
    pub title: String,

    /// Category (Daily, Travel, Food, Study, Coding, Hobby)
    #[arg(short, long, default_value = "All")]
    pub category: Category,

    /// Markup or plain-text file with the entry body
    #[arg(long)]
    pub content: Option<PathBuf>,

    /// Images to append, in order
    #[arg(short, long = "image")]
    pub images: Vec<PathBuf>,
}

/// Plain text becomes one paragraph per line; markup is used as is.
pub fn to_markup(text: &str) -> String {
    if text.trim_start().starts_with('<') {
        return text.trim().to_string();
    }

    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                "<p><br></p>".to_string()
            } else {
                format!("<p>{}</p>", escape_attribute(line))
            }
        })
        .collect()
}

pub async fn write(args: WriteArgs, ctx: &Context) -> Result<()> {
    let session = EditSession::new(ctx.editor_ports(), ctx.config.history);
    if !session.can_mutate() {
        anyhow::bail!("not signed in; put an access token in {}", ctx.config.token_path);
    }

    session.set_title(args.title);
    session.set_category(args.category);
    if let Some(path) = &args.content {
        let text = tokio::fs::read_to_string(path).await?;
        session.edit_content(to_markup(&text));
    }

    for path in &args.images {
        let end = diary_markup::index_len(session.document().rich_content());
        session.set_selection(Some(Selection::caret(end)));

        match session.ingest().ingest_from_picker(&FsPicker::new(path)).await {
            Ok(Some(outcome)) => println!(
                "  {} Attached {} as {}",
                "✓".green(),
                path.display(),
                outcome.media.storage_id
            ),
            Ok(None) => {}
            Err(err) => warn!(path = %path.display(), error = %err, "Image skipped"),
        }
    }

    match session.submit().await {
        Ok(id) => {
            println!("{} {}", "✅ Saved entry".green().bold(), id);
            Ok(())
        }
        Err(err) => {
            // Nothing was saved, so nothing may keep the uploads alive.
            session.discard().await;
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_becomes_paragraphs() {
        assert_eq!(
            to_markup("first & second\n\nthird"),
            "<p>first &amp; second</p><p><br></p><p>third</p>"
        );
    }

    #[test]
    fn test_markup_is_kept() {
        assert_eq!(to_markup("  <p>hi</p>\n"), "<p>hi</p>");
    }

    #[test]
    fn test_blank_line_survives_as_empty_line() {
        assert_eq!(diary_markup::plain_text(&to_markup("a\n\nb")), "a\n\nb\n");
    }
}
