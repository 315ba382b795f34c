use std::io;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::info;

use crate::charts::{
    entities::ChartResult,
    errors::{Error, Result},
};

const COLUMNS: [&str; 3] = ["Position", "Title", "Artist"];

/// File format of a single chart output
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Header lines, blank line, tab separated rows
    Txt,
    /// Pretty printed chart result
    #[default]
    Json,
    /// `#` comment header, blank row, RFC 4180 table
    Csv,
}

impl OutputFormat {
    /// File extension without the dot
    pub fn ext(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }

    /// Serialize a chart result into the file contents for this format
    pub fn render(&self, result: &ChartResult) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
            OutputFormat::Csv => render_csv(result),
            OutputFormat::Txt => Ok(render_txt(result)),
        }
    }
}

fn render_txt(result: &ChartResult) -> String {
    let mut out = String::new();
    for line in result.header_lines() {
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&COLUMNS.join("\t"));
    out.push('\n');
    for song in &result.songs {
        out.push_str(&format!(
            "{}\t{}\t{}\n",
            song.position, song.title, song.artist
        ));
    }
    out
}

fn csv_writer(out: &mut Vec<u8>) -> csv::Writer<&mut Vec<u8>> {
    csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::CRLF)
        .from_writer(out)
}

fn render_csv(result: &ChartResult) -> Result<String> {
    let mut out = Vec::new();
    {
        let mut wtr = csv_writer(&mut out);
        for line in result.header_lines() {
            wtr.write_record([format!("# {line}")])?;
        }
        wtr.flush()?;
    }
    // blank separator row between the comment block and the table
    out.extend_from_slice(b"\r\n");
    {
        let mut wtr = csv_writer(&mut out);
        wtr.write_record(COLUMNS)?;
        for song in &result.songs {
            wtr.write_record([&song.position, &song.title, &song.artist])?;
        }
        wtr.flush()?;
    }
    String::from_utf8(out).map_err(|e| Error::IoError(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Write `result` to `<output_dir>/<filename>.<ext>`, creating the directory
/// if needed. An existing file at that path is overwritten.
pub async fn write(
    result: &ChartResult,
    format: OutputFormat,
    output_dir: &Path,
    filename: &str,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(format!("{filename}.{}", format.ext()));
    let contents = format.render(result)?;
    tokio::fs::write(&path, contents).await?;
    info!(
        "Saved {} data ({} songs) to {}",
        format.ext().to_uppercase(),
        result.songs.len(),
        path.display()
    );
    Ok(path)
}

/// Write `result` under `root` following the location naming convention:
/// `<root>/city/<country>-<city>-<date>.<ext>` or
/// `<root>/country/<country>-<date>.<ext>`
pub async fn write_under(result: &ChartResult, format: OutputFormat, root: &Path) -> Result<PathBuf> {
    write(result, format, &result.output_dir(root), &result.file_stem()).await
}
