use log::info;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::whisper::transcriber::Segment;

/// Written ahead of the header so spreadsheet tools pick up UTF-8.
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";
const CSV_HEADER: &str = "start,end,text";

/// Renders a whisper centisecond offset as `HH:MM:SS.mmm`.
pub fn format_timestamp(centiseconds: i64) -> String {
    let total_ms = centiseconds.max(0) * 10;
    let millis = total_ms % 1000;
    let seconds = (total_ms / 1000) % 60;
    let minutes = (total_ms / 60_000) % 60;
    let hours = total_ms / 3_600_000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

fn csv_field(text: &str) -> String {
    if text.contains(',') || text.contains('"') || text.contains('\n') || text.contains('\r') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// The three-column table: header row, then one row per segment in model
/// output order.
pub fn render_csv(segments: &[Segment]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for segment in segments {
        out.push_str(&format_timestamp(segment.start));
        out.push(',');
        out.push_str(&format_timestamp(segment.end));
        out.push(',');
        out.push_str(&csv_field(&segment.text));
        out.push('\n');
    }
    out
}

/// `<output_dir>/<input stem>.csv`, whatever the input's directory or
/// extension was.
pub fn csv_path(output_dir: &Path, input_name: &str) -> PathBuf {
    let stem = Path::new(input_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "transcript".to_string());
    output_dir.join(format!("{stem}.csv"))
}

/// Persists the segment table, creating the output directory on demand and
/// overwriting any previous transcript for the same input.
pub fn write_transcript(
    output_dir: &Path,
    input_name: &str,
    segments: &[Segment],
) -> std::io::Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = csv_path(output_dir, input_name);

    let mut file = fs::File::create(&path)?;
    file.write_all(UTF8_BOM)?;
    file.write_all(render_csv(segments).as_bytes())?;

    info!("Wrote transcript to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn segment(start: i64, end: i64, text: &str) -> Segment {
        Segment {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "00:00:00.000");
        assert_eq!(format_timestamp(150), "00:00:01.500");
        assert_eq!(format_timestamp(6_150), "00:01:01.500");
        assert_eq!(format_timestamp(360_000), "01:00:00.000");
        assert_eq!(format_timestamp(360_001), "01:00:00.010");
        // negative offsets never render as garbage
        assert_eq!(format_timestamp(-5), "00:00:00.000");
    }

    #[test]
    fn test_format_timestamp_is_monotone() {
        let offsets = [0, 1, 99, 100, 5999, 6000, 359_999, 360_000];
        for pair in offsets.windows(2) {
            assert!(format_timestamp(pair[0]) < format_timestamp(pair[1]));
        }
    }

    #[test]
    fn test_csv_field_escaping() {
        assert_eq!(csv_field("plain text"), "plain text");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_render_csv_columns_and_order() {
        let segments = vec![
            segment(0, 150, " Hello there."),
            segment(150, 420, " General Kenobi, you are bold."),
        ];
        let csv = render_csv(&segments);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "start,end,text");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("00:00:00.000,00:00:01.500,"));
        assert!(lines[2].contains("\" General Kenobi, you are bold.\""));
    }

    #[test]
    fn test_csv_path_strips_directory_and_extension() {
        let dir = Path::new("data/output");
        assert_eq!(
            csv_path(dir, "/tmp/uploads/meeting.wav"),
            dir.join("meeting.csv")
        );
        assert_eq!(csv_path(dir, "song.mp3"), dir.join("song.csv"));
        assert_eq!(csv_path(dir, "no_extension"), dir.join("no_extension.csv"));
    }

    #[test]
    fn test_write_transcript_bom_and_header() {
        let tmp = TempDir::new().unwrap();
        let out_dir = tmp.path().join("nested").join("output");
        let segments = vec![segment(0, 100, " one"), segment(100, 200, " two")];

        let path = write_transcript(&out_dir, "talk.wav", &segments).unwrap();
        assert_eq!(path, out_dir.join("talk.csv"));

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], UTF8_BOM);
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.starts_with("start,end,text\n"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_write_transcript_overwrites() {
        let tmp = TempDir::new().unwrap();
        let first = vec![segment(0, 100, " first"), segment(100, 200, " run")];
        let second = vec![segment(0, 50, " second run")];

        write_transcript(tmp.path(), "talk.wav", &first).unwrap();
        let path = write_transcript(tmp.path(), "talk.wav", &second).unwrap();

        let bytes = fs::read(&path).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("second run"));
        assert!(!text.contains("first"));
    }
}
