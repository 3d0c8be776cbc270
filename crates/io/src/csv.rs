// Registry import from delimited text files

use std::io::Read;
use std::path::Path;

use licsync_recon::Table;

/// Load a delimited registry export, sniffing the field delimiter.
pub fn import(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    Table::from_csv(&content, delimiter).map_err(|e| e.to_string())
}

/// Pick the delimiter whose field count stays most consistent over the first
/// ten lines. Candidates are tab, semicolon, comma, and pipe; a candidate
/// must split the header into more than one field, and a wider split wins
/// ties.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample: Vec<&str> = content.lines().take(10).collect();

    if sample.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delimiter in candidates {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| fields_in_line(line, delimiter))
            .collect();

        // A viable delimiter must split the header into more than one field.
        let target = counts[0];
        if target <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;
        if score > best_score {
            best_score = score;
            best = delimiter;
        }
    }

    best
}

fn fields_in_line(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map(|r| r.len())
        .unwrap_or(1)
}

/// Read a registry file as UTF-8, transcoding legacy single-byte encodings.
/// Excel often exports Windows-1252; raw bytes that fail UTF-8 validation go
/// through that decoder instead of erroring.
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file =
        std::fs::File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("{}: {e}", path.display()))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            // from_utf8 consumed the buffer; the error hands it back
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}
