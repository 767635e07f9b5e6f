//! File selection state for the upload form.

use std::path::Path;

use anyhow::{Context, Result};
use image::ImageFormat;
use tracing::debug;

/// Prefix some browsers put in front of the picked file name.
const FAKEPATH_PREFIX: &str = "C:\\fakepath\\";
/// Longest file name shown on the picker label before truncation.
pub const MAX_LABEL_CHARS: usize = 40;
const TRUNCATION_MARKER: &str = "...";

/// Label shown on the picker before anything is chosen.
pub const DEFAULT_LABEL: &str = "Upload an image";

/// Binary content of the chosen file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadFile {
    /// Wrap raw bytes, sniffing the content type from the image header.
    pub fn from_bytes(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        let content_type = sniff_content_type(&data).to_string();
        Self {
            file_name: file_name.into(),
            content_type,
            data,
        }
    }

    /// Read a file from disk.
    pub async fn read(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image: {:?}", path))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::from_bytes(file_name, data))
    }
}

fn sniff_content_type(data: &[u8]) -> &'static str {
    match image::guess_format(data) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::Gif) => "image/gif",
        Ok(ImageFormat::WebP) => "image/webp",
        Ok(ImageFormat::Bmp) => "image/bmp",
        Ok(ImageFormat::Tiff) => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// The file currently chosen on the form.
#[derive(Debug, Clone)]
pub struct UploadSelection {
    pub file: UploadFile,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// Prompt text before a file has been chosen.
    Prompt,
    /// Bold, compact text once a file name is shown.
    Chosen,
}

/// What the picker label should currently show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLabel {
    pub text: String,
    pub style: LabelStyle,
}

/// Tracks the chosen file and derives the picker label and submit affordance.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    selection: Option<UploadSelection>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the picker's reported path and file.
    ///
    /// An empty path (the user cancelled the picker) leaves the state untouched.
    pub fn on_file_chosen(&mut self, raw_path: &str, file: UploadFile) {
        if raw_path.is_empty() {
            debug!("File picker reported no selection; keeping previous state");
            return;
        }

        let display_name = display_name(raw_path);
        debug!("Selected file: {} ({} bytes)", display_name, file.data.len());
        self.selection = Some(UploadSelection { file, display_name });
    }

    /// Record a file picked outside a browser. Like the browser picker,
    /// only the bare file name reaches the label, never the directory.
    pub fn choose(&mut self, file: UploadFile) {
        let name = file.file_name.clone();
        self.on_file_chosen(&name, file);
    }

    pub fn selection(&self) -> Option<&UploadSelection> {
        self.selection.as_ref()
    }

    /// The submit control is only offered once a file exists.
    pub fn submit_enabled(&self) -> bool {
        self.selection.is_some()
    }

    pub fn label(&self) -> FileLabel {
        match &self.selection {
            Some(selection) => FileLabel {
                text: selection.display_name.clone(),
                style: LabelStyle::Chosen,
            },
            None => FileLabel {
                text: DEFAULT_LABEL.to_string(),
                style: LabelStyle::Prompt,
            },
        }
    }
}

/// Derive the label text from the raw picker value.
///
/// Strips the browser's fake path prefix, then keeps at most
/// [`MAX_LABEL_CHARS`] characters, marking the cut with `...`.
pub fn display_name(raw_path: &str) -> String {
    let name = raw_path.strip_prefix(FAKEPATH_PREFIX).unwrap_or(raw_path);

    match name.char_indices().nth(MAX_LABEL_CHARS) {
        Some((cut, _)) => format!("{}{}", &name[..cut], TRUNCATION_MARKER),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn upload(name: &str) -> UploadFile {
        UploadFile::from_bytes(name, PNG_MAGIC.to_vec())
    }

    #[test]
    fn test_strips_fakepath_prefix() {
        assert_eq!(display_name("C:\\fakepath\\sheet.jpg"), "sheet.jpg");
        assert_eq!(display_name("sheet.jpg"), "sheet.jpg");
    }

    #[test]
    fn test_prefix_only_stripped_at_start() {
        assert_eq!(
            display_name("scans\\C:\\fakepath\\sheet.jpg"),
            "scans\\C:\\fakepath\\sheet.jpg"
        );
    }

    #[test]
    fn test_truncates_long_names() {
        let long = format!("C:\\fakepath\\{}.jpeg", "a".repeat(50));
        let shown = display_name(&long);
        assert_eq!(shown.chars().count(), MAX_LABEL_CHARS + 3);
        assert!(shown.ends_with("..."));
        assert_eq!(&shown[..MAX_LABEL_CHARS], "a".repeat(40));
    }

    #[test]
    fn test_exactly_forty_chars_not_marked() {
        let name = "b".repeat(40);
        assert_eq!(display_name(&name), name);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let name = "é".repeat(45);
        let shown = display_name(&name);
        assert_eq!(shown, format!("{}...", "é".repeat(40)));
    }

    #[test]
    fn test_sniffs_png_content_type() {
        assert_eq!(upload("x.png").content_type, "image/png");
        let unknown = UploadFile::from_bytes("x.bin", b"not an image".to_vec());
        assert_eq!(unknown.content_type, "application/octet-stream");
    }

    #[test]
    fn test_choosing_file_enables_submit() {
        let mut form = FormState::new();
        assert!(!form.submit_enabled());
        assert_eq!(form.label().style, LabelStyle::Prompt);

        form.on_file_chosen("C:\\fakepath\\ec8a.png", upload("ec8a.png"));

        assert!(form.submit_enabled());
        assert_eq!(
            form.label(),
            FileLabel {
                text: "ec8a.png".to_string(),
                style: LabelStyle::Chosen,
            }
        );
    }

    #[test]
    fn test_cancelled_picker_keeps_previous_selection() {
        let mut form = FormState::new();
        form.on_file_chosen("first.png", upload("first.png"));
        form.on_file_chosen("", upload("ignored.png"));

        let selection = form.selection().unwrap();
        assert_eq!(selection.display_name, "first.png");
        assert_eq!(selection.file.file_name, "first.png");
    }

    #[tokio::test]
    async fn test_chosen_local_file_labelled_by_name_only() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("scans").join("2023");
        std::fs::create_dir_all(&nested).unwrap();
        let path = nested.join("ec8a-ward-04.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let mut form = FormState::new();
        form.choose(UploadFile::read(&path).await.unwrap());

        let label = form.label();
        assert_eq!(label.text, "ec8a-ward-04.png");
        assert_eq!(label.style, LabelStyle::Chosen);
        assert!(form.submit_enabled());
    }
}
