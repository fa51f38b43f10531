/// Server payload decode and export. The data server sends a ZIP archive
/// holding one binary entry per measurement axis, each a little-endian f64
/// array of amplitudes in dB.

use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use thiserror::Error;
use zip::ZipArchive;

use crate::chart::DEFAULT_AMPLITUDE;

pub const HORIZONTAL_ENTRY_NAME: &str = "PolarResponseHz.bin";
pub const VERTICAL_ENTRY_NAME: &str = "PolarResponseVt.bin";

/// Decode failures, worded for the status line.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Missing, Incomplete, or Invalid Response Data.")]
    MissingData,
    #[error("Response Data Zip File Corrupt or Incorrect Format.")]
    CorruptArchive,
    #[error("File Read Error: Response Data Zip File Not Loaded.")]
    ReadFailure,
}

/// The per-axis amplitude arrays pulled out of one server payload. Either
/// axis may be absent when the archive didn't carry its entry.
#[derive(Debug, Default)]
pub struct DecodedPolarResponse {
    pub horizontal: Option<Vec<f64>>,
    pub vertical: Option<Vec<f64>>,
}

impl DecodedPolarResponse {
    /// Status-line text naming whichever axis came back incomplete. Empty
    /// when both axes are present.
    pub fn status_message(&self) -> String {
        match (&self.horizontal, &self.vertical) {
            (Some(_), Some(_)) => String::new(),
            (None, Some(_)) => "Horizontal Polar Response Data Missing.".to_owned(),
            (Some(_), None) => "Vertical Polar Response Data Missing.".to_owned(),
            (None, None) => "Polar Response Data Missing.".to_owned(),
        }
    }
}

/// Decode a polar-response payload: open the archive, pull the horizontal
/// and vertical entries (matched case-insensitively, other entries
/// ignored), and read each as `num_points` little-endian f64 samples.
///
/// Entries shorter than `num_points` are padded out: the horizontal axis
/// pads with the chart floor, the vertical axis with 0.0 dB. A read error
/// partway through any entry abandons the whole decode so a half-read
/// trace never reaches the charts.
pub fn decode_polar_response(
    data: &[u8],
    num_points: usize,
) -> Result<DecodedPolarResponse, DecodeError> {
    if data.is_empty() {
        return Err(DecodeError::MissingData);
    }

    let mut archive =
        ZipArchive::new(Cursor::new(data)).map_err(|error| {
            tracing::warn!(%error, "polar response payload is not a readable zip archive");
            DecodeError::CorruptArchive
        })?;

    let mut decoded = DecodedPolarResponse::default();
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(|error| {
            tracing::warn!(%error, index, "failed opening zip entry");
            DecodeError::CorruptArchive
        })?;
        let name = entry.name().to_owned();

        if name.eq_ignore_ascii_case(HORIZONTAL_ENTRY_NAME) {
            decoded.horizontal = Some(read_amplitude_array(entry, num_points, DEFAULT_AMPLITUDE)?);
        } else if name.eq_ignore_ascii_case(VERTICAL_ENTRY_NAME) {
            decoded.vertical = Some(read_amplitude_array(entry, num_points, 0.0)?);
        } else {
            tracing::debug!(entry = %name, "ignoring unrecognized zip entry");
        }
    }

    if decoded.horizontal.is_none() && decoded.vertical.is_none() {
        return Err(DecodeError::MissingData);
    }
    Ok(decoded)
}

/// Read up to `num_points` little-endian f64 samples, padding a short
/// entry with `pad_value`. Any error other than a clean end-of-entry is a
/// read failure.
fn read_amplitude_array(
    mut reader: impl Read,
    num_points: usize,
    pad_value: f64,
) -> Result<Vec<f64>, DecodeError> {
    let mut amplitudes = Vec::with_capacity(num_points);
    for _ in 0..num_points {
        match reader.read_f64::<LittleEndian>() {
            Ok(sample) => amplitudes.push(sample),
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(error) => {
                tracing::warn!(%error, "read failed partway through a polar data entry");
                return Err(DecodeError::ReadFailure);
            }
        }
    }
    if amplitudes.len() < num_points {
        tracing::warn!(
            got = amplitudes.len(),
            expected = num_points,
            "short polar data entry, padding remainder"
        );
        amplitudes.resize(num_points, pad_value);
    }
    Ok(amplitudes)
}

/// Outcome of a save-response export, for the status line.
#[derive(Debug, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    WriteError,
    UnsupportedExtension,
}

/// Write the raw server payload to disk, byte for byte. Only `.zip`
/// destinations are accepted so the saved file matches its contents.
pub fn save_server_response(data: &[u8], path: &Path) -> SaveStatus {
    let is_zip = path
        .extension()
        .map(|extension| extension.eq_ignore_ascii_case("zip"))
        .unwrap_or(false);
    if !is_zip {
        tracing::warn!(path = %path.display(), "refusing to save server response without .zip extension");
        return SaveStatus::UnsupportedExtension;
    }

    let result = File::create(path).and_then(|mut file| file.write_all(data));
    match result {
        Ok(()) => {
            tracing::info!(path = %path.display(), bytes = data.len(), "server response saved");
            SaveStatus::Saved
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "failed saving server response");
            SaveStatus::WriteError
        }
    }
}

// === Tests ====
#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const NUM_POINTS: usize = 361;

    fn samples(start: f64, count: usize) -> Vec<f64> {
        (0..count).map(|i| start - i as f64 * 0.25).collect()
    }

    fn encode_entry(values: &[f64]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(values.len() * 8);
        for &value in values {
            bytes.write_f64::<LittleEndian>(value).unwrap();
        }
        bytes
    }

    fn build_archive(entries: &[(&str, &[f64])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, values) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(&encode_entry(values)).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_decode_both_axes() {
        let hz = samples(0.0, NUM_POINTS);
        let vt = samples(-3.0, NUM_POINTS);
        let archive = build_archive(&[
            (HORIZONTAL_ENTRY_NAME, &hz),
            (VERTICAL_ENTRY_NAME, &vt),
        ]);

        let decoded = decode_polar_response(&archive, NUM_POINTS).unwrap();
        assert_eq!(decoded.horizontal.as_deref(), Some(hz.as_slice()));
        assert_eq!(decoded.vertical.as_deref(), Some(vt.as_slice()));
        assert!(decoded.status_message().is_empty());
    }

    #[test]
    fn test_missing_axis_is_reported() {
        let hz = samples(0.0, NUM_POINTS);
        let archive = build_archive(&[(HORIZONTAL_ENTRY_NAME, &hz)]);

        let decoded = decode_polar_response(&archive, NUM_POINTS).unwrap();
        assert!(decoded.horizontal.is_some());
        assert!(decoded.vertical.is_none());
        assert_eq!(decoded.status_message(), "Vertical Polar Response Data Missing.");
    }

    #[test]
    fn test_entry_names_match_case_insensitively() {
        let hz = samples(-1.0, NUM_POINTS);
        let vt = samples(-2.0, NUM_POINTS);
        let archive = build_archive(&[
            ("polarresponsehz.BIN", &hz),
            ("POLARRESPONSEVT.bin", &vt),
        ]);

        let decoded = decode_polar_response(&archive, NUM_POINTS).unwrap();
        assert!(decoded.horizontal.is_some());
        assert!(decoded.vertical.is_some());
    }

    #[test]
    fn test_unknown_entries_are_ignored() {
        let hz = samples(0.0, NUM_POINTS);
        let junk = samples(99.0, 4);
        let archive = build_archive(&[
            ("ReadMe.bin", &junk),
            (HORIZONTAL_ENTRY_NAME, &hz),
        ]);

        let decoded = decode_polar_response(&archive, NUM_POINTS).unwrap();
        assert_eq!(decoded.horizontal.as_deref(), Some(hz.as_slice()));
        assert!(decoded.vertical.is_none());
    }

    #[test]
    fn test_short_entries_pad_per_axis() {
        let hz = samples(0.0, 100);
        let vt = samples(-3.0, 100);
        let archive = build_archive(&[
            (HORIZONTAL_ENTRY_NAME, &hz),
            (VERTICAL_ENTRY_NAME, &vt),
        ]);

        let decoded = decode_polar_response(&archive, NUM_POINTS).unwrap();
        let horizontal = decoded.horizontal.unwrap();
        let vertical = decoded.vertical.unwrap();
        assert_eq!(horizontal.len(), NUM_POINTS);
        assert_eq!(vertical.len(), NUM_POINTS);
        assert_eq!(horizontal[99], hz[99]);
        // Horizontal pads to the chart floor, vertical pads to 0 dB.
        assert!(horizontal[100..].iter().all(|&a| a == DEFAULT_AMPLITUDE));
        assert!(vertical[100..].iter().all(|&a| a == 0.0));
    }

    #[test]
    fn test_corrupt_archive_is_rejected() {
        let not_a_zip = vec![0x42; 64];
        let error = decode_polar_response(&not_a_zip, NUM_POINTS).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Response Data Zip File Corrupt or Incorrect Format."
        );
    }

    #[test]
    fn test_empty_payload_is_missing_data() {
        let error = decode_polar_response(&[], NUM_POINTS).unwrap_err();
        assert_eq!(error.to_string(), "Missing, Incomplete, or Invalid Response Data.");
    }

    #[test]
    fn test_archive_without_polar_entries_is_missing_data() {
        let junk = samples(1.0, 8);
        let archive = build_archive(&[("Notes.txt", &junk)]);
        let error = decode_polar_response(&archive, NUM_POINTS).unwrap_err();
        assert!(matches!(error, DecodeError::MissingData));
    }

    #[test]
    fn test_save_server_response_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response.zip");
        let hz = samples(0.0, NUM_POINTS);
        let vt = samples(-3.0, NUM_POINTS);
        let payload = build_archive(&[
            (HORIZONTAL_ENTRY_NAME, &hz),
            (VERTICAL_ENTRY_NAME, &vt),
        ]);

        assert_eq!(save_server_response(&payload, &path), SaveStatus::Saved);

        // Reloading the saved file through the decode path reproduces both
        // amplitude arrays.
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, payload);
        let decoded = decode_polar_response(&written, NUM_POINTS).unwrap();
        assert_eq!(decoded.horizontal.as_deref(), Some(hz.as_slice()));
        assert_eq!(decoded.vertical.as_deref(), Some(vt.as_slice()));
    }

    #[test]
    fn test_save_rejects_non_zip_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response.bin");
        assert_eq!(
            save_server_response(&[1, 2, 3], &path),
            SaveStatus::UnsupportedExtension
        );
        assert!(!path.exists());
    }
}
