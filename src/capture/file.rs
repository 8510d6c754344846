//! File saving functionality for captured shots.

use super::naming::NamingOptions;
use super::types::{AcquiredFrame, CaptureError};
use std::fs;
use std::path::{Path, PathBuf};

/// Where and how shots are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    /// Directory to save screenshots to.
    pub directory: PathBuf,
    /// Filename options.
    pub naming: NamingOptions,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            naming: NamingOptions::default(),
        }
    }
}

pub fn default_directory() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Scrollshot")
}

/// Ensure the save directory exists, creating it if necessary.
///
/// # Returns
/// The canonicalized path to the directory
pub fn ensure_directory_exists(directory: &Path) -> Result<PathBuf, CaptureError> {
    if !directory.exists() {
        log::info!("Creating screenshot directory: {}", directory.display());
        fs::create_dir_all(directory)?;
    }

    let canonical = directory
        .canonicalize()
        .unwrap_or_else(|_| directory.to_path_buf());

    Ok(canonical)
}

/// Returns `directory/filename`, or the first free `stem (n).ext` when taken.
pub fn unique_path(directory: &Path, filename: &str) -> PathBuf {
    let candidate = directory.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, extension) = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    };

    let mut n: u32 = 1;
    loop {
        let name = match extension {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        let path = directory.join(name);
        if !path.exists() {
            return path;
        }
        n += 1;
    }
}

/// Encode a frame as PNG and write it to `path`.
pub fn save_frame(frame: &AcquiredFrame, path: &Path) -> Result<(), CaptureError> {
    if frame.is_empty() {
        return Err(CaptureError::ImageError("frame has no pixels".into()));
    }

    log::info!(
        "Saving shot to: {} ({}x{})",
        path.display(),
        frame.width,
        frame.height
    );

    frame
        .image
        .save_with_format(path, image::ImageFormat::Png)?;

    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, Permissions::from_mode(0o600))?;
    }

    let written_size = fs::metadata(path)?.len();
    log::debug!("File written: {} bytes", written_size);

    Ok(())
}

/// Expand tilde (~) in path strings.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn unique_path_scans_upwards_from_one() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();

        assert_eq!(unique_path(dir, "shot.png"), dir.join("shot.png"));

        fs::write(dir.join("shot.png"), b"x").unwrap();
        assert_eq!(unique_path(dir, "shot.png"), dir.join("shot (1).png"));

        fs::write(dir.join("shot (1).png"), b"x").unwrap();
        assert_eq!(unique_path(dir, "shot.png"), dir.join("shot (2).png"));
    }

    #[test]
    fn unique_path_handles_names_without_extension() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("notes"), b"x").unwrap();
        assert_eq!(
            unique_path(temp.path(), "notes"),
            temp.path().join("notes (1)")
        );
    }

    #[test]
    fn save_frame_writes_png() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("frame.png");
        let frame = AcquiredFrame::new(RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 255])));

        save_frame(&frame, &path).expect("write succeeds");

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[test]
    fn save_frame_rejects_empty_frames() {
        let temp = TempDir::new().unwrap();
        let frame = AcquiredFrame::new(RgbaImage::new(0, 0));
        let err = save_frame(&frame, &temp.path().join("empty.png")).unwrap_err();
        assert!(matches!(err, CaptureError::ImageError(_)));
    }

    #[test]
    fn ensure_directory_creates_nested_dirs() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        let created = ensure_directory_exists(&nested).unwrap();
        assert!(created.is_dir());
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/Pictures");
        assert!(!expanded.to_string_lossy().starts_with("~"));

        let no_tilde = expand_tilde("/absolute/path");
        assert_eq!(no_tilde, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn default_directory_is_scrollshot_folder() {
        let settings = OutputSettings::default();
        assert!(settings.directory.ends_with("Scrollshot"));
        assert_eq!(settings.naming.extension, "png");
    }
}
