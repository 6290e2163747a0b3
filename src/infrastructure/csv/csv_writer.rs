// ============================================================
// CSV WRITER
// ============================================================
// Serialize submissions to CSV and encode the result for download

use csv::{Terminator, WriterBuilder};
use encoding_rs::{EncoderResult, Encoding, UTF_8};

use crate::domain::error::{AppError, Result};
use crate::domain::submission::Submission;

pub const EXPORT_HEADER: [&str; 2] = ["이름", "뽑은 마니또"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Encoded CSV ready to be sent as an attachment
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// CSV exporter bound to one output encoding
pub struct CsvExporter {
    encoding: &'static Encoding,
    file_name: String,
}

impl CsvExporter {
    /// Resolve the exporter from a WHATWG encoding label (`euc-kr`, `windows-949`, `utf-8`, ...)
    pub fn for_label(label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| AppError::ConfigError(format!("Unknown export encoding: {}", label)))?;
        Ok(Self {
            encoding: encoding.output_encoding(),
            file_name: "manitto.csv".to_string(),
        })
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Two columns, name and drawn partner, in the order given.
    pub fn export(&self, records: &[Submission]) -> Result<CsvExport> {
        let text = render_csv(records)?;

        let mut bytes = Vec::with_capacity(text.len() + UTF8_BOM.len());
        if self.encoding == UTF_8 {
            // Spreadsheet apps need the BOM to detect UTF-8
            bytes.extend_from_slice(UTF8_BOM);
        }
        bytes.extend(encode_lossy(self.encoding, &text));

        Ok(CsvExport {
            file_name: self.file_name.clone(),
            content_type: format!("text/csv; charset={}", self.encoding.name()),
            bytes,
        })
    }
}

fn render_csv(records: &[Submission]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADER)?;
    for record in records {
        writer.write_record([record.name.as_str(), record.manitto.as_str()])?;
    }

    let buffer = writer
        .into_inner()
        .map_err(|e| AppError::EncodingError(format!("Failed to flush CSV: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| AppError::EncodingError(format!("CSV output is not UTF-8: {}", e)))
}

/// Encode `text`, silently dropping characters the target encoding cannot represent.
fn encode_lossy(encoding: &'static Encoding, text: &str) -> Vec<u8> {
    let mut encoder = encoding.new_encoder();
    let capacity = encoder
        .max_buffer_length_from_utf8_without_replacement(text.len())
        .unwrap_or(text.len() * 4);
    let mut output = vec![0u8; capacity.max(16)];
    let mut read_total = 0;
    let mut written_total = 0;

    loop {
        let (result, read, written) = encoder.encode_from_utf8_without_replacement(
            &text[read_total..],
            &mut output[written_total..],
            true,
        );
        read_total += read;
        written_total += written;

        match result {
            EncoderResult::InputEmpty => break,
            // The unmappable char is already counted in `read`
            EncoderResult::Unmappable(_) => continue,
            EncoderResult::OutputFull => {
                let grown = output.len() * 2;
                output.resize(grown, 0);
            }
        }
    }

    output.truncate(written_total);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::EUC_KR;

    fn record(name: &str, manitto: &str) -> Submission {
        Submission {
            name: name.to_string(),
            manitto: manitto.to_string(),
            time: "2024-12-25 05:30:05".to_string(),
        }
    }

    #[test]
    fn test_export_euc_kr_round_trips_hangul() {
        let exporter = CsvExporter::for_label("euc-kr").unwrap();
        let export = exporter
            .export(&[record("철수", "영희"), record("Alice", "Bob")])
            .unwrap();

        let (decoded, _, had_errors) = EUC_KR.decode(&export.bytes);
        assert!(!had_errors);
        assert_eq!(decoded, "이름,뽑은 마니또\r\n철수,영희\r\nAlice,Bob\r\n");
        assert_eq!(export.content_type, "text/csv; charset=EUC-KR");
        assert_eq!(export.file_name, "manitto.csv");
    }

    #[test]
    fn test_unencodable_characters_are_dropped() {
        let bytes = encode_lossy(EUC_KR, "산타🎅클로스");
        let (decoded, _, _) = EUC_KR.decode(&bytes);
        assert_eq!(decoded, "산타클로스");
    }

    #[test]
    fn test_utf8_export_is_lossless_with_bom() {
        let exporter = CsvExporter::for_label("utf-8").unwrap();
        let export = exporter.export(&[record("산타🎅", "루돌프")]).unwrap();

        assert!(export.bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&export.bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(text, "이름,뽑은 마니또\r\n산타🎅,루돌프\r\n");
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let exporter = CsvExporter::for_label("utf-8").unwrap();
        let export = exporter.export(&[record("Kim, Minsu", "Lee")]).unwrap();
        let text = String::from_utf8_lossy(&export.bytes[UTF8_BOM.len()..]).to_string();
        assert!(text.contains("\"Kim, Minsu\",Lee"));
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        assert!(CsvExporter::for_label("not-a-charset").is_err());
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let exporter = CsvExporter::for_label("windows-949").unwrap();
        let export = exporter.export(&[]).unwrap();
        let (decoded, _, _) = EUC_KR.decode(&export.bytes);
        assert_eq!(decoded, "이름,뽑은 마니또\r\n");
    }
}
