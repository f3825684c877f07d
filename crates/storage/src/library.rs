use crate::{Storage, StorageError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// PDF files directly inside `folder`, sorted by file name. The extension
/// check ignores case.
pub fn list_pdfs(folder: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf && entry.file_type()?.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Result of a folder picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderSelection {
    Cancelled,
    Chosen(PathBuf),
}

impl FolderSelection {
    /// Remembers a chosen folder and lists its PDFs. A cancelled pick keeps
    /// the current selection and yields `None`.
    pub fn apply(&self, storage: &Storage) -> Result<Option<Vec<PathBuf>>, StorageError> {
        match self {
            Self::Cancelled => Ok(None),
            Self::Chosen(folder) => {
                storage.remember_folder(folder)?;
                Ok(Some(list_pdfs(folder)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_pdf_files_sorted() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        fs::write(temp.path().join("zeta.pdf"), b"%PDF").expect("write should succeed");
        fs::write(temp.path().join("Alpha.Pdf"), b"%PDF").expect("write should succeed");
        fs::write(temp.path().join("readme.md"), b"#").expect("write should succeed");
        fs::create_dir(temp.path().join("folder.pdf")).expect("dir should be created");

        let files = list_pdfs(temp.path()).expect("listing should succeed");

        assert_eq!(files, vec![temp.path().join("Alpha.Pdf"), temp.path().join("zeta.pdf")]);
    }

    #[test]
    fn empty_folder_is_not_an_error() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        assert!(list_pdfs(temp.path()).expect("listing should succeed").is_empty());
    }

    #[test]
    fn cancelled_selection_changes_nothing() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path());

        let outcome = FolderSelection::Cancelled.apply(&store).expect("cancel is not an error");

        assert_eq!(outcome, None);
        assert_eq!(store.load_settings_or_default().last_folder, None);
    }

    #[test]
    fn chosen_selection_is_remembered() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let folder = temp.path().join("docs");
        fs::create_dir(&folder).expect("dir should be created");
        fs::write(folder.join("one.pdf"), b"%PDF").expect("write should succeed");
        let store = Storage::with_root(temp.path().join("data"));

        let outcome = FolderSelection::Chosen(folder.clone()).apply(&store).expect("apply");

        assert_eq!(outcome, Some(vec![folder.join("one.pdf")]));
        assert_eq!(store.load_settings_or_default().last_folder, Some(folder));
    }
}
