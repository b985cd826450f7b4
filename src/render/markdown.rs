//! Markdown digest document.
//!
//! Layout:
//!
//! ```text
//! # Еженедельная подборка новостей (DD.MM.YYYY HH:MM)
//!
//! ### <title>
//!
//! <summary>
//!
//! _<date> • <source>_
//! [<link>](<link>)
//! ```

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use tracing::info;

use crate::digest::DigestItem;

pub const FILE_NAME: &str = "digest.md";

/// Build the document text.
pub fn render<Tz>(items: &[DigestItem], generated_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut blocks = vec![format!(
        "# Еженедельная подборка новостей ({})\n",
        generated_at.format("%d.%m.%Y %H:%M")
    )];

    for item in items {
        blocks.push(format!("### {}\n", item.title));
        blocks.push(format!("{}\n", item.summary));
        // Two trailing spaces force a Markdown line break before the link.
        blocks.push(format!(
            "_{} • {}_  \n[{}]({})\n",
            item.date, item.source, item.link, item.link
        ));
    }

    blocks.join("\n")
}

/// Write `digest.md` into `dir`, replacing any existing file, and return the
/// absolute path written.
pub fn save(dir: &Path, items: &[DigestItem]) -> Result<PathBuf> {
    save_at(dir, items, &Local::now())
}

pub fn save_at<Tz>(dir: &Path, items: &[DigestItem], generated_at: &DateTime<Tz>) -> Result<PathBuf>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let dir = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()
            .context("cannot resolve working directory")?
            .join(dir)
    };
    let path = dir.join(FILE_NAME);

    fs::write(&path, render(items, generated_at))
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), items = items.len(), "wrote digest");
    Ok(path)
}
