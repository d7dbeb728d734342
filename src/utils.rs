use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Read a regular file, rejecting directories and missing paths with a
/// message that names the path
pub fn safe_read_file(path: &Path) -> Result<Vec<u8>> {
    let metadata = fs::metadata(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", path.display()),
        ))
    })?;
    if !metadata.is_file() {
        return Err(Error::Validation(format!(
            "{} is not a regular file",
            path.display()
        )));
    }
    Ok(fs::read(path)?)
}

/// Write `data` to `path`, creating or truncating it
pub fn safe_write_file(path: &Path, data: &[u8]) -> Result<()> {
    if path.is_dir() {
        return Err(Error::Validation(format!(
            "{} is a directory",
            path.display()
        )));
    }
    fs::write(path, data)?;
    Ok(())
}
