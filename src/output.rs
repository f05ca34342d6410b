//! Staged output: write into a temporary file next to the destination, then
//! rename it into place.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Runs `write` against a buffered temporary file and moves the result to `path`.
///
/// The destination is created or replaced, never appended to. If `write` or
/// any later step fails, the temporary file is removed and `path` is left
/// exactly as it was.
pub fn write_atomically<F>(path: &Path, write: F) -> io::Result<u64>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;
    log::debug!("staging {} in {}", path.display(), staged.path().display());

    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    staged.as_file().sync_all()?;
    let written = staged.as_file().metadata()?.len();

    staged.persist(path).map_err(|e| e.error)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("level.lvl");
        fs::write(&path, b"old contents that are longer").expect("seed");

        let n = write_atomically(&path, |w| w.write_all(b"new")).expect("write");

        assert_eq!(n, 3);
        assert_eq!(fs::read(&path).expect("read"), b"new");
    }

    #[test]
    fn failure_leaves_destination_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("level.lvl");
        fs::write(&path, b"previous").expect("seed");

        let err = write_atomically(&path, |w| {
            w.write_all(b"partial")?;
            Err(io::Error::new(io::ErrorKind::Other, "boom"))
        })
        .unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert_eq!(fs::read(&path).expect("read"), b"previous");
        let leftovers = fs::read_dir(dir.path()).expect("list").count();
        assert_eq!(leftovers, 1, "temporary file was not cleaned up");
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("no_such_dir").join("level.lvl");

        let err = write_atomically(&path, |w| w.write_all(b"x")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!path.exists());
    }
}
