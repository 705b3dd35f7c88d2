//! Template bundle repackaging.
//!
//! A template bundle is an archive holding exactly one templatable raster
//! plus sibling files (print instructions, previews, licensing) that ship
//! with every finished artifact. Repackaging drops the templatable entry,
//! carries every sibling through byte-for-byte, and inserts the composited
//! raster under a fixed output name so consumers never depend on the
//! source naming convention.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use decal_core::{Error, Result};

/// Repackaging convention: which entry gets replaced and what the
/// replacement is called.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepackConfig {
    /// File stem (case-insensitive, any directory) identifying the
    /// templatable raster inside a bundle.
    pub template_stem: String,
    /// Entry name of the composited raster in the output bundle.
    pub output_entry: String,
}

impl Default for RepackConfig {
    fn default() -> Self {
        Self {
            template_stem: "template".to_string(),
            output_entry: "design.png".to_string(),
        }
    }
}

impl RepackConfig {
    /// Replaces the templatable entry of `bundle` with `replacement`.
    ///
    /// # Errors
    ///
    /// - [`Error::AssetCorrupt`] if the bundle is not a readable archive,
    ///   or if more than one entry matches the templatable pattern
    /// - [`Error::TemplateAssetMissing`] if no entry matches
    pub fn repack(&self, bundle: &[u8], replacement: &[u8]) -> Result<Vec<u8>> {
        let mut archive = ZipArchive::new(Cursor::new(bundle))
            .map_err(|e| Error::corrupt(format!("template bundle failed to open: {e}")))?;
        let template_index = self.template_index(&mut archive)?;

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for index in 0..archive.len() {
            if index == template_index {
                continue;
            }
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| Error::corrupt(format!("template bundle entry {index}: {e}")))?;
            writer
                .raw_copy_file(entry)
                .map_err(|e| Error::internal(format!("copying bundle entry {index}: {e}")))?;
        }

        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        writer
            .start_file(self.output_entry.as_str(), options)
            .map_err(|e| Error::internal(format!("starting output entry: {e}")))?;
        writer
            .write_all(replacement)
            .map_err(|e| Error::internal(format!("writing output entry: {e}")))?;

        let cursor = writer
            .finish()
            .map_err(|e| Error::internal(format!("finalizing repacked bundle: {e}")))?;
        Ok(cursor.into_inner())
    }

    /// Reads the templatable raster out of `bundle`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`RepackConfig::repack`]: the bundle must be a
    /// readable archive with exactly one templatable entry.
    pub fn extract_template(&self, bundle: &[u8]) -> Result<Vec<u8>> {
        let mut archive = ZipArchive::new(Cursor::new(bundle))
            .map_err(|e| Error::corrupt(format!("template bundle failed to open: {e}")))?;
        let template_index = self.template_index(&mut archive)?;

        let mut entry = archive
            .by_index(template_index)
            .map_err(|e| Error::corrupt(format!("template bundle entry {template_index}: {e}")))?;
        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| Error::corrupt(format!("reading templatable entry: {e}")))?;
        Ok(data)
    }

    /// Locates the single templatable entry, rejecting zero or many.
    fn template_index<R: std::io::Read + std::io::Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<usize> {
        let mut template_indices = Vec::new();
        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| Error::corrupt(format!("template bundle entry {index}: {e}")))?;
            if !entry.is_dir() && self.is_template_entry(entry.name()) {
                template_indices.push(index);
            }
        }

        match template_indices.as_slice() {
            [] => Err(Error::TemplateAssetMissing {
                pattern: format!("{}.png", self.template_stem),
            }),
            [index] => Ok(*index),
            many => Err(Error::corrupt(format!(
                "template bundle has {} entries matching `{}.png`, expected exactly one",
                many.len(),
                self.template_stem
            ))),
        }
    }

    fn is_template_entry(&self, name: &str) -> bool {
        let path = Path::new(name);
        let stem_matches = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.eq_ignore_ascii_case(&self.template_stem));
        let ext_matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        stem_matches && ext_matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in entries {
            writer.start_file(*name, options).expect("start entry");
            writer.write_all(data).expect("write entry");
        }
        writer.finish().expect("finish bundle").into_inner()
    }

    fn entry_bytes(archive_bytes: &[u8], name: &str) -> Option<Vec<u8>> {
        let mut archive =
            ZipArchive::new(Cursor::new(archive_bytes.to_vec())).expect("open archive");
        let mut entry = archive.by_name(name).ok()?;
        let mut data = Vec::new();
        entry.read_to_end(&mut data).expect("read entry");
        Some(data)
    }

    #[test]
    fn replaces_template_and_preserves_siblings() {
        let bundle = bundle(&[
            ("template.png", b"old raster"),
            ("README.txt", b"print at 300dpi"),
            ("extras/preview.jpg", b"preview bytes"),
        ]);

        let repacked = RepackConfig::default()
            .repack(&bundle, b"new raster")
            .expect("repack should succeed");

        assert_eq!(
            entry_bytes(&repacked, "design.png").expect("output entry present"),
            b"new raster"
        );
        assert_eq!(
            entry_bytes(&repacked, "README.txt").expect("sibling preserved"),
            b"print at 300dpi"
        );
        assert_eq!(
            entry_bytes(&repacked, "extras/preview.jpg").expect("nested sibling preserved"),
            b"preview bytes"
        );
        assert!(
            entry_bytes(&repacked, "template.png").is_none(),
            "original templatable entry must not survive"
        );
    }

    #[test]
    fn template_entry_matches_case_insensitively_in_any_directory() {
        let bundle = bundle(&[("art/TEMPLATE.PNG", b"old"), ("note.txt", b"n")]);
        let repacked = RepackConfig::default()
            .repack(&bundle, b"new")
            .expect("repack should succeed");
        assert!(entry_bytes(&repacked, "art/TEMPLATE.PNG").is_none());
        assert!(entry_bytes(&repacked, "design.png").is_some());
    }

    #[test]
    fn extract_template_returns_the_raster_bytes() {
        let bundle = bundle(&[
            ("art/Template.png", b"raster bytes"),
            ("README.txt", b"doc"),
        ]);
        let raster = RepackConfig::default()
            .extract_template(&bundle)
            .expect("extract should succeed");
        assert_eq!(raster, b"raster bytes");
    }

    #[test]
    fn extract_template_rejects_missing_entry() {
        let bundle = bundle(&[("README.txt", b"doc")]);
        let err = RepackConfig::default().extract_template(&bundle).unwrap_err();
        assert!(matches!(err, Error::TemplateAssetMissing { .. }));
    }

    #[test]
    fn missing_template_entry_is_reported() {
        let bundle = bundle(&[("README.txt", b"no raster here")]);
        let err = RepackConfig::default()
            .repack(&bundle, b"new")
            .unwrap_err();
        let Error::TemplateAssetMissing { pattern } = err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(pattern, "template.png");
    }

    #[test]
    fn ambiguous_template_entries_are_corrupt() {
        let bundle = bundle(&[
            ("template.png", b"one"),
            ("nested/Template.png", b"two"),
        ]);
        let err = RepackConfig::default()
            .repack(&bundle, b"new")
            .unwrap_err();
        assert!(matches!(err, Error::AssetCorrupt { .. }));
    }

    #[test]
    fn non_archive_bytes_are_corrupt() {
        let err = RepackConfig::default()
            .repack(b"not a zip", b"new")
            .unwrap_err();
        assert!(matches!(err, Error::AssetCorrupt { .. }));
    }

    #[test]
    fn output_opens_in_a_standard_reader() {
        let bundle = bundle(&[("template.png", b"old"), ("README.txt", b"doc")]);
        let repacked = RepackConfig::default()
            .repack(&bundle, b"new")
            .expect("repack");

        let mut archive = ZipArchive::new(Cursor::new(repacked)).expect("output should open");
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).expect("entry").name().to_string())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"design.png".to_string()));
        assert!(names.contains(&"README.txt".to_string()));
    }
}
