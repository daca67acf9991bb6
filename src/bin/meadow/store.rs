//! Pattern storage in a JSON file, standing in for the board's flash.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use meadow_seq::Pattern;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct PatternFile {
    path: PathBuf,
}

impl PatternFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file has never been written.
    pub fn load(&self) -> Result<Option<Pattern>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    pub fn save(&self, pattern: &Pattern) -> Result<(), StoreError> {
        let text = serde_json::to_string(pattern)?;
        // write-then-rename so a crash never leaves half a pattern behind
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("meadow-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_missing_file_is_no_pattern() {
        let store = PatternFile::new(scratch("missing"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_saved_pattern_loads_back() {
        let path = scratch("saved");
        let store = PatternFile::new(&path);
        let mut pattern = Pattern::new();
        pattern.toggle(3, 7);
        pattern.toggle(0, 15);

        store.save(&pattern).unwrap();
        assert_eq!(store.load().unwrap(), Some(pattern));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_garbage_is_an_error() {
        let path = scratch("garbage");
        fs::write(&path, "not a pattern").unwrap();
        let store = PatternFile::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
        fs::remove_file(path).unwrap();
    }
}
