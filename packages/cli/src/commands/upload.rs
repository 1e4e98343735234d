use super::Context;
use crate::picker::FsPicker;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use diary_common::{MediaStore, MediaUpload};
use diary_editor::FilePicker;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Image file to upload
    pub path: PathBuf,
}

pub async fn upload(args: UploadArgs, ctx: &Context) -> Result<()> {
    let Some(file) = FsPicker::new(&args.path).pick_image().await? else {
        return Ok(());
    };

    let uploaded = ctx
        .backend
        .upload_media(MediaUpload {
            file_name: file.name,
            mime: file.mime,
            bytes: file.bytes,
        })
        .await?;

    println!("  {} Uploaded {}", "✓".green(), args.path.display());
    println!("  url: {}", uploaded.embed_url);
    println!("  id:  {}", uploaded.storage_id);
    Ok(())
}
