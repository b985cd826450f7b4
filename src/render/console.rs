//! Coloured terminal output.
//!
//! Everything writes through a generic [`Write`] so tests can render into a
//! buffer; the `print_*` helpers bind it to stdout.

use std::io::{self, Write};
use std::path::Path;

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

use crate::digest::DigestItem;

const WIDTH: usize = 90;
const BANNER_TITLE: &str = " ЕЖЕНЕДЕЛЬНАЯ ПОДБОРКА НОВОСТЕЙ ";

/// Write one line, optionally coloured.
fn line<W: Write>(out: &mut W, color: Option<Color>, text: &str) -> io::Result<()> {
    match color {
        Some(color) => queue!(
            out,
            SetForegroundColor(color),
            Print(text),
            ResetColor,
            Print("\n")
        ),
        None => queue!(out, Print(text), Print("\n")),
    }
}

/// Render the whole digest: banner, one block per item, closing banner.
pub fn render<W: Write>(out: &mut W, items: &[DigestItem]) -> io::Result<()> {
    let rule = "=".repeat(WIDTH);

    line(out, None, "")?;
    line(out, None, &rule)?;
    line(out, None, &format!("{:=^width$}", BANNER_TITLE, width = WIDTH))?;
    line(out, None, &format!("{rule}\n"))?;

    for (i, item) in items.iter().enumerate() {
        line(out, Some(Color::Yellow), &format!("< {}. {} >", i + 1, item.title))?;
        line(out, Some(Color::Cyan), &"-".repeat(WIDTH))?;
        line(out, Some(Color::White), &format!("{}\n", item.summary))?;
        line(out, Some(Color::Magenta), &format!("Дата: {}", item.date))?;
        line(out, Some(Color::Blue), &format!("Источник: {}", item.source))?;
        line(out, Some(Color::Green), &format!("Ссылка: {}\n", item.link))?;
        line(out, Some(Color::Cyan), &format!("<{}>\n", "=".repeat(WIDTH - 2)))?;
    }

    line(out, Some(Color::Green), "Конец подборки.")?;
    line(out, None, &format!("{rule}\n"))?;
    out.flush()
}

/// Print the digest to stdout.
pub fn print_digest(items: &[DigestItem]) -> io::Result<()> {
    render(&mut io::stdout().lock(), items)
}

/// Announce the start of a (possibly slow) fetch.
pub fn print_collecting() -> io::Result<()> {
    let mut out = io::stdout().lock();
    line(
        &mut out,
        Some(Color::Cyan),
        "\n< Сбор новостей... пожалуйста, подожди несколько секунд >\n",
    )?;
    out.flush()
}

/// Advise the user that the run produced nothing.
pub fn print_empty() -> io::Result<()> {
    let mut out = io::stdout().lock();
    line(
        &mut out,
        Some(Color::Red),
        "Не удалось получить новости. Попробуйте увеличить период (--days 14).",
    )?;
    out.flush()
}

/// Report where the Markdown digest was written.
pub fn print_saved(path: &Path) -> io::Result<()> {
    let mut out = io::stdout().lock();
    line(
        &mut out,
        Some(Color::Green),
        &format!("Файл digest.md сохранён в: {}\n", path.display()),
    )?;
    out.flush()
}
