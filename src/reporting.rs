use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Local};
use csv::{QuoteStyle, WriterBuilder};
use itertools::Itertools;

use crate::error::ScanError;
use crate::record::DiscoveryRecord;

pub const CSV_HEADER: &str = "domain,ips,method,discovery_time";

/// A destination for confirmed findings.
///
/// Records are appended in the order they are written. `close` writes any
/// trailing syntax and flushes; calling it twice is harmless.
pub trait OutputSink: Send {
    fn write(&mut self, record: &DiscoveryRecord) -> io::Result<()>;
    fn close(&mut self) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkFormat {
    Text,
    Json,
    Csv,
}

impl SinkFormat {
    /// `.json` and `.csv` select those formats; anything else is plain text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SinkFormat::Json,
            Some(ext) if ext.eq_ignore_ascii_case("csv") => SinkFormat::Csv,
            _ => SinkFormat::Text,
        }
    }
}

/// Creates (or truncates) `path` and writes the header for its format,
/// stamped with the scan's start time.
pub fn open_sink(
    path: &Path,
    domain: &str,
    started_at: DateTime<Local>,
) -> Result<Box<dyn OutputSink>, ScanError> {
    let output_err = |source| ScanError::Output {
        path: path.to_path_buf(),
        source,
    };
    let file = BufWriter::new(File::create(path).map_err(output_err)?);

    let sink: Box<dyn OutputSink> = match SinkFormat::from_path(path) {
        SinkFormat::Text => Box::new(TextSink::new(file, domain, started_at).map_err(output_err)?),
        SinkFormat::Json => Box::new(JsonSink::new(file, started_at).map_err(output_err)?),
        SinkFormat::Csv => Box::new(CsvSink::new(file).map_err(output_err)?),
    };
    Ok(sink)
}

fn closed_error() -> io::Error {
    io::Error::other("sink already closed")
}

pub struct TextSink<W: Write> {
    out: W,
    closed: bool,
}

impl<W: Write> TextSink<W> {
    pub fn new(mut out: W, domain: &str, started_at: DateTime<Local>) -> io::Result<Self> {
        writeln!(out, "# Subdomain scan report")?;
        writeln!(out, "# Target: {}", domain)?;
        writeln!(out, "# Scan time: {}", started_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(out, "#")?;
        Ok(Self { out, closed: false })
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

impl<W: Write + Send> OutputSink for TextSink<W> {
    fn write(&mut self, record: &DiscoveryRecord) -> io::Result<()> {
        if self.closed {
            return Err(closed_error());
        }
        writeln!(self.out, "{}", record.domain)?;
        self.out.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        self.out.flush()
    }
}

/// Streams `{"scan_info": {"start_time": ..., "subdomains": [...]}}`.
///
/// The closing brackets are written by `close`, or on drop if the scan
/// never got that far.
pub struct JsonSink<W: Write> {
    out: W,
    entries: usize,
    closed: bool,
}

impl<W: Write> JsonSink<W> {
    pub fn new(mut out: W, started_at: DateTime<Local>) -> io::Result<Self> {
        let start_time = serde_json::to_string(&started_at)?;
        write!(out, "{{\"scan_info\": {{\"start_time\": {}, \"subdomains\": [", start_time)?;
        Ok(Self {
            out,
            entries: 0,
            closed: false,
        })
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn finish(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.out.write_all(b"]}}")?;
        self.out.flush()
    }
}

impl<W: Write + Send> OutputSink for JsonSink<W> {
    fn write(&mut self, record: &DiscoveryRecord) -> io::Result<()> {
        if self.closed {
            return Err(closed_error());
        }
        if self.entries > 0 {
            self.out.write_all(b",")?;
        }
        serde_json::to_writer(&mut self.out, record)?;
        self.entries += 1;
        self.out.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.finish()
    }
}

impl<W: Write> Drop for JsonSink<W> {
    fn drop(&mut self) {
        let _ = self.finish();
    }
}

/// One fully quoted row per record; addresses are joined with `;`.
pub struct CsvSink<W: Write> {
    out: csv::Writer<W>,
    closed: bool,
}

impl<W: Write> CsvSink<W> {
    pub fn new(mut out: W) -> io::Result<Self> {
        writeln!(out, "{}", CSV_HEADER)?;
        let out = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(out);
        Ok(Self { out, closed: false })
    }

    pub fn get_ref(&self) -> &W {
        self.out.get_ref()
    }
}

impl<W: Write + Send> OutputSink for CsvSink<W> {
    fn write(&mut self, record: &DiscoveryRecord) -> io::Result<()> {
        if self.closed {
            return Err(closed_error());
        }
        let ips = record.addresses.iter().join(";");
        let discovered_at = record.discovered_at.to_rfc3339();
        self.out
            .write_record([
                record.domain.as_str(),
                ips.as_str(),
                record.method.as_str(),
                discovered_at.as_str(),
            ])
            .map_err(io::Error::from)?;
        self.out.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Method;

    fn record(domain: &str, ips: &[&str], method: Method) -> DiscoveryRecord {
        DiscoveryRecord::new(
            domain.to_string(),
            ips.iter().map(|s| s.to_string()).collect(),
            method,
        )
    }

    fn text_of(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(SinkFormat::from_path(Path::new("out.json")), SinkFormat::Json);
        assert_eq!(SinkFormat::from_path(Path::new("out.CSV")), SinkFormat::Csv);
        assert_eq!(SinkFormat::from_path(Path::new("out.txt")), SinkFormat::Text);
        assert_eq!(SinkFormat::from_path(Path::new("out.xml")), SinkFormat::Text);
        assert_eq!(SinkFormat::from_path(Path::new("out")), SinkFormat::Text);
    }

    #[test]
    fn text_sink_lists_one_domain_per_line() {
        let mut sink = TextSink::new(Vec::new(), "example.com", Local::now()).unwrap();
        sink.write(&record("www.example.com", &["1.2.3.4"], Method::Dns)).unwrap();
        sink.write(&record("api.example.com", &["https://api.example.com"], Method::Http))
            .unwrap();
        sink.close().unwrap();

        let text = text_of(sink.get_ref());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# Subdomain scan report");
        assert_eq!(lines[1], "# Target: example.com");
        assert!(lines[..4].iter().all(|l| l.starts_with('#')));
        assert_eq!(&lines[4..], ["www.example.com", "api.example.com"]);
    }

    #[test]
    fn json_sink_round_trips_records() {
        let first = record("www.example.com", &["10.0.0.2", "10.0.0.1"], Method::Dns);
        let second = record("app.example.com", &["http://app.example.com"], Method::Http);

        let mut sink = JsonSink::new(Vec::new(), Local::now()).unwrap();
        sink.write(&first).unwrap();
        sink.write(&second).unwrap();
        sink.close().unwrap();

        let doc: serde_json::Value = serde_json::from_slice(sink.get_ref()).unwrap();
        assert!(doc["scan_info"]["start_time"].is_string());
        let entries = doc["scan_info"]["subdomains"].as_array().unwrap();
        assert_eq!(entries.len(), 2);

        let parsed: DiscoveryRecord = serde_json::from_value(entries[0].clone()).unwrap();
        assert_eq!(parsed, first);
        assert_eq!(parsed.addresses, vec!["10.0.0.2", "10.0.0.1"]);
        assert_eq!(entries[1]["method"], "HTTP");
    }

    #[test]
    fn headers_carry_the_scan_start_time() {
        let started = Local::now() - chrono::Duration::minutes(3);

        let mut json = JsonSink::new(Vec::new(), started).unwrap();
        json.close().unwrap();
        let doc: serde_json::Value = serde_json::from_slice(json.get_ref()).unwrap();
        let stamped: DateTime<Local> =
            serde_json::from_value(doc["scan_info"]["start_time"].clone()).unwrap();
        assert_eq!(stamped, started);

        let text = TextSink::new(Vec::new(), "example.com", started).unwrap();
        let expected = format!("# Scan time: {}", started.format("%Y-%m-%d %H:%M:%S"));
        assert!(text_of(text.get_ref()).lines().any(|l| l == expected));
    }

    #[test]
    fn json_sink_without_entries_is_valid() {
        let mut sink = JsonSink::new(Vec::new(), Local::now()).unwrap();
        sink.close().unwrap();
        sink.close().unwrap();

        let doc: serde_json::Value = serde_json::from_slice(sink.get_ref()).unwrap();
        assert_eq!(doc["scan_info"]["subdomains"], serde_json::json!([]));
    }

    #[test]
    fn json_sink_finishes_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        {
            let mut sink = open_sink(&path, "example.com", Local::now()).unwrap();
            sink.write(&record("www.example.com", &["1.1.1.1"], Method::Dns)).unwrap();
        }
        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["scan_info"]["subdomains"][0]["domain"], "www.example.com");
    }

    #[test]
    fn csv_sink_quotes_every_field() {
        let mut sink = CsvSink::new(Vec::new()).unwrap();
        let rec = record("www.example.com", &["1.1.1.1", "2.2.2.2"], Method::Dns);
        sink.write(&rec).unwrap();
        sink.close().unwrap();

        let text = text_of(sink.get_ref());
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(
            lines.next().unwrap(),
            format!(
                "\"www.example.com\",\"1.1.1.1;2.2.2.2\",\"DNS\",\"{}\"",
                rec.discovered_at.to_rfc3339()
            )
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn writes_after_close_are_rejected() {
        let mut sink = TextSink::new(Vec::new(), "example.com", Local::now()).unwrap();
        sink.close().unwrap();
        assert!(sink.write(&record("a.example.com", &[], Method::Dns)).is_err());
    }

    #[test]
    fn unopenable_destination_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        assert!(matches!(
            open_sink(&path, "example.com", Local::now()),
            Err(ScanError::Output { .. })
        ));
    }
}
