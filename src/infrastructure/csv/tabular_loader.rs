// ============================================================
// TABULAR LOADER
// ============================================================
// Read a delimited file, walking an ordered list of encodings

use csv::{ReaderBuilder, Trim};
use std::path::Path;
use tracing::{debug, error, info};

use super::TextEncoding;
use crate::domain::dataset::Dataset;
use crate::domain::error::{AppError, Result};

/// A dataset together with the encoding that produced it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedDataset {
    pub dataset: Dataset,

    /// `None` when every encoding failed
    pub encoding: Option<TextEncoding>,
}

impl LoadedDataset {
    /// Result of a load where nothing could be read
    pub fn unreadable() -> Self {
        Self::default()
    }

    pub fn is_readable(&self) -> bool {
        self.encoding.is_some()
    }
}

/// Delimited text loader with encoding fallback
pub struct TabularLoader {
    /// Field delimiter; detected per file when `None`
    delimiter: Option<u8>,

    /// Encodings tried in order, first parseable wins
    encodings: Vec<TextEncoding>,
}

impl Default for TabularLoader {
    fn default() -> Self {
        Self {
            delimiter: None,
            encodings: TextEncoding::LADDER.to_vec(),
        }
    }
}

impl TabularLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fixed delimiter instead of detecting one
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Replace the encoding ladder
    pub fn with_encodings(mut self, encodings: Vec<TextEncoding>) -> Self {
        self.encodings = encodings;
        self
    }

    /// Load a file, returning an empty dataset if it cannot be read under
    /// any encoding.
    pub fn load(&self, path: &Path) -> LoadedDataset {
        match self.try_load(path) {
            Ok(loaded) => {
                info!(
                    path = %path.display(),
                    encoding = ?loaded.encoding,
                    rows = loaded.dataset.len(),
                    columns = loaded.dataset.columns().len(),
                    "Loaded dataset"
                );
                loaded
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "Dataset is unreadable");
                LoadedDataset::unreadable()
            }
        }
    }

    /// Load a file, reporting why it could not be read
    pub fn try_load(&self, path: &Path) -> Result<LoadedDataset> {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        self.load_bytes(&bytes)
    }

    /// Decode and parse raw bytes. An encoding is abandoned as soon as
    /// decoding or parsing fails; there is no partial-row recovery.
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<LoadedDataset> {
        for &encoding in &self.encodings {
            let Some(content) = encoding.decode(bytes) else {
                debug!(encoding = %encoding, "Decoding failed, trying next encoding");
                continue;
            };

            match self.parse_content(&content) {
                Ok(dataset) => {
                    return Ok(LoadedDataset {
                        dataset,
                        encoding: Some(encoding),
                    })
                }
                Err(err) => {
                    debug!(encoding = %encoding, error = %err, "Parsing failed, trying next encoding");
                }
            }
        }

        let tried = self
            .encodings
            .iter()
            .map(TextEncoding::label)
            .collect::<Vec<_>>()
            .join(", ");
        Err(AppError::ParseError(format!(
            "No encoding could parse the file (tried: {})",
            tried
        )))
    }

    /// Parse already decoded text. Header names and values are kept as
    /// written, surrounding whitespace included.
    pub fn parse_content(&self, content: &str) -> Result<Dataset> {
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| Self::detect_delimiter(content));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::None)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();

        if headers.is_empty() {
            return Err(AppError::ParseError("Missing header row".to_string()));
        }

        let mut records = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        Dataset::from_records(headers.iter(), records)
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<_> = content.lines().take(10).collect();

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        if sample_lines.is_empty() {
            return best_delimiter;
        }

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.chars().filter(|&c| c == delimiter as char).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::EUC_KR;
    use std::io::Write;

    const SAMPLE: &str = "지역,캐릭터,특징\n서울 종로,김시간,차분함\n부산 해운대,박파도,활발함\n전주 한옥마을,이단아,신비로움\n";

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    fn legacy_bytes(text: &str) -> Vec<u8> {
        let (bytes, _, had_errors) = EUC_KR.encode(text);
        assert!(!had_errors);
        bytes.into_owned()
    }

    #[test]
    fn test_parse_simple_csv() {
        let dataset = TabularLoader::new().parse_content(SAMPLE).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.columns(), ["지역", "캐릭터", "특징"]);
        assert_eq!(dataset.row(1).unwrap().get("캐릭터"), Some("박파도"));
    }

    #[test]
    fn test_loads_utf8_file() {
        let file = write_temp(SAMPLE.as_bytes());
        let loaded = TabularLoader::new().load(file.path());

        assert_eq!(loaded.encoding, Some(TextEncoding::Utf8));
        assert_eq!(loaded.dataset.len(), 3);
    }

    #[test]
    fn test_loads_cp949_file() {
        let file = write_temp(&legacy_bytes(SAMPLE));
        let loaded = TabularLoader::new().load(file.path());

        assert_eq!(loaded.encoding, Some(TextEncoding::Cp949));
        assert_eq!(loaded.dataset.len(), 3);
        assert_eq!(loaded.dataset.row(0).unwrap().get("캐릭터"), Some("김시간"));
    }

    #[test]
    fn test_loads_euc_kr_file() {
        let file = write_temp(&legacy_bytes(SAMPLE));
        let loaded = TabularLoader::new()
            .with_encodings(vec![TextEncoding::Utf8, TextEncoding::EucKr])
            .load(file.path());

        assert_eq!(loaded.encoding, Some(TextEncoding::EucKr));
        assert_eq!(loaded.dataset.len(), 3);
        assert_eq!(loaded.dataset.row(2).unwrap().get("지역"), Some("전주 한옥마을"));
    }

    #[test]
    fn test_corrupted_file_yields_empty_dataset() {
        let file = write_temp(&[0xFF, 0xFE, 0x80, 0x81, 0x00, 0xFF]);
        let loaded = TabularLoader::new().load(file.path());

        assert!(!loaded.is_readable());
        assert!(loaded.dataset.is_empty());
        assert!(loaded.dataset.columns().is_empty());
    }

    #[test]
    fn test_missing_file_yields_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = TabularLoader::new().load(&dir.path().join("absent.csv"));

        assert_eq!(loaded, LoadedDataset::unreadable());
    }

    #[test]
    fn test_try_load_reports_exhausted_encodings() {
        let file = write_temp(&[0xFF, 0xFF]);
        let err = TabularLoader::new().try_load(file.path()).unwrap_err();

        assert!(matches!(err, AppError::ParseError(_)));
        assert!(err.to_string().contains("utf-8, cp949, euc-kr"));
    }

    #[test]
    fn test_empty_file_is_unreadable() {
        let file = write_temp(b"");
        assert!(!TabularLoader::new().load(file.path()).is_readable());
    }

    #[test]
    fn test_header_only_file_is_readable_but_empty() {
        let file = write_temp("지역,캐릭터,특징\n".as_bytes());
        let loaded = TabularLoader::new().load(file.path());

        assert!(loaded.is_readable());
        assert!(loaded.dataset.is_empty());
        assert_eq!(loaded.dataset.columns().len(), 3);
    }

    #[test]
    fn test_overlong_row_abandons_encoding() {
        let loader = TabularLoader::new().with_delimiter(b',');
        let err = loader.load_bytes("a,b\n1,2,3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }

    #[test]
    fn test_header_whitespace_is_preserved() {
        let dataset = TabularLoader::new()
            .parse_content("지역,캐릭터, 특징\n서울,김 ,차분함\n")
            .unwrap();

        assert_eq!(dataset.columns()[2], " 특징");
        assert_eq!(dataset.row(0).unwrap().get("캐릭터"), Some("김 "));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(TabularLoader::detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(TabularLoader::detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(TabularLoader::detect_delimiter("지역\t캐릭터\n서울\t김"), b'\t');
        assert_eq!(TabularLoader::detect_delimiter(""), b',');
    }

    #[test]
    fn test_semicolon_file_is_detected() {
        let file = write_temp("지역;캐릭터;특징\n서울;김;차분함\n".as_bytes());
        let loaded = TabularLoader::new().load(file.path());

        assert_eq!(loaded.dataset.row(0).unwrap().get("특징"), Some("차분함"));
    }
}
