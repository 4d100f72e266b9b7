//! Console output for the CLI: styled messages, error reports, declaration
//! tables and the build progress bar.
use std::io::{self, Write};

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use scenic_core::runtime::DeclarationWrapper;
use scenic_core::{ScenicErrorExt, generate_error_report};

/// Styles for different output elements
#[derive(Debug, Clone)]
pub struct FormatStyle {
    pub title: Style,
    pub info: Style,
    pub warning: Style,
    pub error: Style,
    pub success: Style,
}

impl Default for FormatStyle {
    fn default() -> Self {
        FormatStyle {
            title: Style::new().bold().underlined(),
            info: Style::new().cyan(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            success: Style::new().green().bold(),
        }
    }
}

impl FormatStyle {
    /// Styles that render as plain text.
    pub fn plain() -> Self {
        FormatStyle {
            title: Style::new(),
            info: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            success: Style::new(),
        }
    }
}

pub struct Reporter<T: Write> {
    out: T,
    formatting: FormatStyle,
}

impl<T: Write> Reporter<T> {
    pub fn new(out: T) -> Self {
        Reporter {
            out,
            formatting: FormatStyle::default(),
        }
    }

    pub fn with_formatting(mut self, formatting: FormatStyle) -> Self {
        self.formatting = formatting;
        self
    }

    fn line(&mut self, text: &str, style: &Style) -> io::Result<()> {
        writeln!(self.out, "{}", style.apply_to(text))
    }

    pub fn title(&mut self, text: &str) -> io::Result<()> {
        let style = self.formatting.title.clone();
        self.line(text, &style)
    }

    pub fn info(&mut self, text: &str) -> io::Result<()> {
        let style = self.formatting.info.clone();
        self.line(text, &style)
    }

    pub fn warning(&mut self, text: &str) -> io::Result<()> {
        let style = self.formatting.warning.clone();
        self.line(text, &style)
    }

    pub fn success(&mut self, text: &str) -> io::Result<()> {
        let style = self.formatting.success.clone();
        self.line(text, &style)
    }

    pub fn raw(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "{}", text)
    }

    /// One diagnostic line per error, colored by its level.
    pub fn report<E: ScenicErrorExt + ?Sized>(&mut self, error: &E) -> io::Result<()> {
        let style = match error.level() {
            scenic_core::Level::Info => self.formatting.info.clone(),
            scenic_core::Level::Warning => self.formatting.warning.clone(),
            scenic_core::Level::Error | scenic_core::Level::Critical => self.formatting.error.clone(),
        };
        self.line(&generate_error_report(error), &style)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Declarations of a module as a table.
pub fn declaration_table(declarations: &[(String, &DeclarationWrapper)]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Name", "Base", "Line", "Steps", "Doc"]);
    for (name, wrapper) in declarations {
        let sequence = wrapper.sequence();
        table.add_row(vec![
            name.clone(),
            wrapper.base().to_string(),
            sequence.line().to_string(),
            sequence.len().to_string(),
            wrapper.doc().unwrap_or("").to_string(),
        ]);
    }
    table
}

/// Progress over the files of a build. Hidden for a single file.
pub fn build_progress(total: usize) -> ProgressBar {
    if total < 2 {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▒░");
    bar.set_style(style);
    bar
}
