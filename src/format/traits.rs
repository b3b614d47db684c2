//! Trait definitions for label format implementations.

use std::path::{Path, PathBuf};

use crate::format::error::FormatError;
use crate::model::ImageBounds;
use crate::registry::ClassRegistry;

/// Everything a codec needs besides the labels themselves.
///
/// The registry is mutable: box encoding registers unknown class names and
/// box decoding registers placeholder classes for unknown indices.
pub struct LabelContext<'a> {
    /// Dimensions of the image the labels belong to.
    pub bounds: ImageBounds,
    pub registry: &'a mut ClassRegistry,
}

impl<'a> LabelContext<'a> {
    pub fn new(bounds: ImageBounds, registry: &'a mut ClassRegistry) -> Self {
        Self { bounds, registry }
    }
}

/// Trait for per-image label file formats.
///
/// Each format (normalized boxes, dense mask grid) implements the text
/// conversion; reading and writing files is shared.
pub trait LabelFormat {
    /// In-memory representation of one image's labels.
    type Labels;

    /// Unique identifier for this format (e.g., "box", "mask").
    fn id(&self) -> &'static str;

    /// Human-readable name for logs and status messages.
    fn display_name(&self) -> &'static str;

    /// Serialize labels to file text.
    fn encode(&self, labels: &Self::Labels, ctx: &mut LabelContext<'_>) -> Result<Encoded, FormatError>;

    /// Parse file text. Never fails: bad content becomes warnings.
    fn decode(&self, text: &str, ctx: &mut LabelContext<'_>) -> Decoded<Self::Labels>;

    /// Empty labels for an image with no label file.
    fn empty(&self, bounds: ImageBounds) -> Self::Labels;

    /// Encode and write labels to `path`, creating parent directories.
    fn save(
        &self,
        labels: &Self::Labels,
        path: &Path,
        ctx: &mut LabelContext<'_>,
    ) -> Result<ExportResult, FormatError> {
        let encoded = self.encode(labels, ctx)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FormatError::io(parent, e))?;
        }
        std::fs::write(path, encoded.text.as_bytes()).map_err(|e| FormatError::io(path, e))?;

        log::info!(
            "Saved {} labels to {:?} ({} records, {} dropped)",
            self.display_name(),
            path,
            encoded.records,
            encoded.dropped
        );

        Ok(ExportResult {
            path: path.to_path_buf(),
            records_exported: encoded.records,
            records_dropped: encoded.dropped,
        })
    }

    /// Read and decode `path`. A missing file yields empty labels.
    fn load(&self, path: &Path, ctx: &mut LabelContext<'_>) -> Result<Decoded<Self::Labels>, FormatError> {
        if !path.exists() {
            log::debug!("No {} label file at {:?}", self.id(), path);
            return Ok(Decoded::clean(self.empty(ctx.bounds)));
        }

        let bytes = std::fs::read(path).map_err(|e| FormatError::io(path, e))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| FormatError::invalid_format(path, format!("not UTF-8: {}", e)))?;

        let mut decoded = self.decode(&text, ctx);
        for warning in &mut decoded.warnings {
            warning.path = Some(path.to_path_buf());
            log::warn!("{}", warning);
        }
        Ok(decoded)
    }
}

/// Output of [`LabelFormat::encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub text: String,
    /// Records written.
    pub records: usize,
    /// Records silently left out (e.g. boxes that collapse when clamped).
    pub dropped: usize,
}

/// Output of [`LabelFormat::decode`].
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub labels: T,
    pub warnings: Vec<FormatWarning>,
}

impl<T> Decoded<T> {
    /// Decoded labels with no warnings.
    pub fn clean(labels: T) -> Self {
        Self {
            labels,
            warnings: Vec::new(),
        }
    }
}

/// Result of a save operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// File written.
    pub path: PathBuf,
    /// Number of records written.
    pub records_exported: usize,
    /// Number of records dropped during encoding.
    pub records_dropped: usize,
}

/// Category of a tolerated data problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Box record with the wrong field count or unparsable numbers.
    LabelParseSkip,
    /// Box record that has no area once decoded.
    DegenerateBox,
    /// Mask grid whose size differs from the image.
    DimensionMismatch,
    /// Mask grid with non-integer cells or ragged rows.
    MalformedGrid,
    /// Class registry line that cannot be parsed.
    MalformedClassLine,
}

/// Severity level for format warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    /// Informational message, not a problem.
    Info,
    /// Something was skipped or replaced.
    Warning,
}

/// Warning generated while decoding a label file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatWarning {
    pub kind: WarningKind,
    pub severity: WarningSeverity,
    /// File the warning relates to (filled in by `load`).
    pub path: Option<PathBuf>,
    /// 1-based line number, when the warning is about one line.
    pub line: Option<usize>,
    /// Human-readable warning message.
    pub message: String,
}

impl FormatWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: WarningSeverity::Warning,
            path: None,
            line: None,
            message: message.into(),
        }
    }

    /// Set the line this warning relates to.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl std::fmt::Display for FormatWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{:?}", path)?;
            if let Some(line) = self.line {
                write!(f, ":{}", line)?;
            }
            write!(f, ": ")?;
        } else if let Some(line) = self.line {
            write!(f, "line {}: ", line)?;
        }
        write!(f, "{}", self.message)
    }
}
