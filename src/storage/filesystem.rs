//! Filesystem backend with templated paths
//!
//! Each key maps to exactly one file under the base directory:
//!
//! 1. Every occurrence of `replaced_substring` in a key part is replaced by
//!    `replacement_string` (typically `/` → `__`). Parts that already
//!    contain `replacement_string` in a way the reverse substitution would
//!    not undo are rejected, so two keys never share a file.
//! 2. The parts are substituted into the path template.
//! 3. The result is resolved under the base directory; missing directories
//!    are created on write.
//!
//! Writes are atomic (temp file + rename). Keys are listed by walking the
//! base directory and reverse-parsing the template.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use super::backend::StoreBackend;
use super::error::{StoreError, StoreResult};
use super::template::PathTemplate;

/// Configuration for [`FilesystemStoreBackend`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilesystemStoreBackendConfig {
    /// Base directory, relative to the store's root directory unless absolute
    pub base_directory: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,

    pub filepath_template: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_substring: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement_string: Option<String>,
}

/// Resolves a configured directory against an optional root
pub(crate) fn resolve_base_directory(base: &str, root_directory: Option<&Path>) -> StoreResult<PathBuf> {
    let base = Path::new(base);
    if base.is_absolute() {
        return Ok(base.to_path_buf());
    }

    match root_directory {
        Some(root) => Ok(root.join(base)),
        None => Err(StoreError::Config(format!(
            "relative base_directory '{}' requires a root directory",
            base.display()
        ))),
    }
}

/// Writes a file atomically, creating parent directories as needed
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, contents).map_err(|e| StoreError::io(&temp_path, e))?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::io(path, e));
    }

    Ok(())
}

/// A relative path is usable if it stays strictly below the base directory
fn is_contained(relative: &str) -> bool {
    !relative.is_empty()
        && relative
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

#[derive(Debug)]
pub struct FilesystemStoreBackend {
    base_directory: PathBuf,
    template: PathTemplate,
    file_extension: Option<String>,
    replacement: Option<(String, String)>,
    key_length: usize,
}

impl FilesystemStoreBackend {
    pub fn new(
        config: &FilesystemStoreBackendConfig,
        root_directory: Option<&Path>,
        key_length: usize,
    ) -> StoreResult<Self> {
        let base_directory = resolve_base_directory(&config.base_directory, root_directory)?;

        let template = PathTemplate::parse(&config.filepath_template)?;
        template.validate(key_length)?;
        // Surfaces a missing file extension now rather than on first write
        template.render(&vec![String::new(); key_length], config.file_extension.as_deref())?;

        let replacement = match (&config.replaced_substring, &config.replacement_string) {
            (None, None) => None,
            (Some(from), Some(to)) if !from.is_empty() && !to.is_empty() => {
                Some((from.clone(), to.clone()))
            }
            _ => {
                return Err(StoreError::Config(
                    "replaced_substring and replacement_string must be set together \
                     and must not be empty"
                        .to_string(),
                ))
            }
        };

        Ok(Self {
            base_directory,
            template,
            file_extension: config.file_extension.clone(),
            replacement,
            key_length,
        })
    }

    /// The path of `key` relative to the base directory, `/`-separated
    pub fn relative_path(&self, key: &[String]) -> StoreResult<String> {
        if key.len() != self.key_length {
            return Err(StoreError::InvalidKey(format!(
                "expected {} key parts, got {}",
                self.key_length,
                key.len()
            )));
        }

        let parts = self.encode_parts(key)?;
        Ok(self.template.render(&parts, self.file_extension.as_deref())?)
    }

    /// Applies the replacement to every part
    ///
    /// A part is accepted only if reversing the replacement gives it back;
    /// with `/` → `__`, `my/db` encodes to `my__db` while a literal `my__db`
    /// is rejected.
    fn encode_parts(&self, key: &[String]) -> StoreResult<Vec<String>> {
        let Some((from, to)) = &self.replacement else {
            return Ok(key.to_vec());
        };

        key.iter()
            .map(|part| {
                let encoded = part.replace(from.as_str(), to);
                if encoded.replace(to.as_str(), from) != *part {
                    return Err(StoreError::InvalidKey(format!(
                        "key part '{}' contains '{}', which stands in for '{}' on disk",
                        part, to, from
                    )));
                }
                Ok(encoded)
            })
            .collect()
    }

    fn contained_path(&self, relative: &str) -> Option<PathBuf> {
        is_contained(relative).then(|| {
            relative
                .split('/')
                .fold(self.base_directory.clone(), |path, segment| path.join(segment))
        })
    }

    /// Relative path plus the full file path, if the key resolves to one
    ///
    /// Keys that no file can hold are reported as absent.
    fn locate(&self, key: &[String]) -> StoreResult<(String, Option<PathBuf>)> {
        match self.relative_path(key) {
            Ok(relative) => {
                let path = self.contained_path(&relative);
                Ok((relative, path))
            }
            Err(StoreError::InvalidKey(_)) if key.len() == self.key_length => Ok((key.join("/"), None)),
            Err(e) => Err(e),
        }
    }

    fn recover_key(&self, relative: &str) -> Option<Vec<String>> {
        let captured = self
            .template
            .capture(relative, self.file_extension.as_deref(), self.key_length)?;

        let key: Vec<String> = match &self.replacement {
            Some((from, to)) => captured.iter().map(|part| part.replace(to.as_str(), from)).collect(),
            None => captured,
        };

        // Only keep keys that map back to this file
        match self.relative_path(&key) {
            Ok(rendered) if rendered == relative => Some(key),
            _ => None,
        }
    }
}

impl StoreBackend for FilesystemStoreBackend {
    fn get(&self, key: &[String]) -> StoreResult<Vec<u8>> {
        let (relative, path) = self.locate(key)?;
        let Some(path) = path.filter(|p| p.is_file()) else {
            return Err(StoreError::KeyNotFound(relative));
        };

        tracing::debug!(path = %path.display(), "filesystem get");
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::KeyNotFound(relative),
            _ => StoreError::io(&path, e),
        })
    }

    fn set(&mut self, key: &[String], value: &[u8]) -> StoreResult<()> {
        let relative = self.relative_path(key)?;
        let Some(path) = self.contained_path(&relative) else {
            return Err(StoreError::InvalidKey(format!(
                "'{}' does not name a file below {}",
                relative,
                self.base_directory.display()
            )));
        };

        tracing::debug!(path = %path.display(), bytes = value.len(), "filesystem set");
        write_atomic(&path, value)
    }

    fn has_key(&self, key: &[String]) -> StoreResult<bool> {
        let (_, path) = self.locate(key)?;
        Ok(path.is_some_and(|p| p.is_file()))
    }

    fn list_keys(&self) -> StoreResult<Vec<Vec<String>>> {
        if !self.template.is_invertible(self.key_length) {
            return Err(StoreError::NonInvertibleTemplate(
                self.template.as_str().to_string(),
            ));
        }

        if !self.base_directory.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();

        for entry in WalkDir::new(&self.base_directory).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.base_directory.clone());
                StoreError::io(path, e.into())
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.base_directory) else {
                continue;
            };
            let segments: Option<Vec<&str>> = relative
                .components()
                .map(|c| c.as_os_str().to_str())
                .collect();
            let Some(segments) = segments else {
                continue;
            };

            let relative = segments.join("/");
            match self.recover_key(&relative) {
                Some(key) => keys.push(key),
                None => tracing::trace!(path = %relative, "skipping file outside key layout"),
            }
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    const TEMPLATE: &str = "{4}/{0}/{1}/{2}/validation-results-{2}-{3}.{file_extension}";

    fn config(template: &str) -> FilesystemStoreBackendConfig {
        FilesystemStoreBackendConfig {
            base_directory: "my_store/".to_string(),
            file_extension: Some("txt".to_string()),
            filepath_template: template.to_string(),
            replaced_substring: Some("/".to_string()),
            replacement_string: Some("__".to_string()),
        }
    }

    fn key(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn writes_to_templated_path() {
        let dir = TempDir::new().unwrap();
        let mut backend = FilesystemStoreBackend::new(&config(TEMPLATE), Some(dir.path()), 5).unwrap();

        backend
            .set(&key(&["a", "b", "c", "quarantine", "prod-100"]), b"aaa")
            .unwrap();

        let path = dir
            .path()
            .join("my_store/prod-100/a/b/c/validation-results-c-quarantine.txt");
        assert_eq!(fs::read_to_string(path).unwrap(), "aaa");
        assert_eq!(
            backend.get(&key(&["a", "b", "c", "quarantine", "prod-100"])).unwrap(),
            b"aaa"
        );
    }

    #[test]
    fn replaces_illegal_substrings() {
        let dir = TempDir::new().unwrap();
        let mut backend = FilesystemStoreBackend::new(&config(TEMPLATE), Some(dir.path()), 5).unwrap();
        let k = key(&["s3/bucket", "b", "c", "suite", "run"]);

        backend.set(&k, b"x").unwrap();

        assert!(dir
            .path()
            .join("my_store/run/s3__bucket/b/c/validation-results-c-suite.txt")
            .is_file());
        assert_eq!(backend.list_keys().unwrap(), vec![k]);
    }

    #[test]
    fn rejects_parts_that_would_share_a_file() {
        let dir = TempDir::new().unwrap();
        let mut backend = FilesystemStoreBackend::new(&config(TEMPLATE), Some(dir.path()), 5).unwrap();
        let slashed = key(&["my/db", "b", "c", "d", "run"]);
        let underscored = key(&["my__db", "b", "c", "d", "run"]);

        backend.set(&slashed, b"slashed").unwrap();

        assert!(matches!(
            backend.set(&underscored, b"underscored"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(backend.get(&underscored).unwrap_err().is_not_found());
        assert!(!backend.has_key(&underscored).unwrap());

        assert_eq!(backend.get(&slashed).unwrap(), b"slashed");
        assert_eq!(backend.list_keys().unwrap(), vec![slashed]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemStoreBackend::new(&config(TEMPLATE), Some(dir.path()), 5).unwrap();

        let err = backend.get(&key(&["a", "b", "c", "d", "e"])).unwrap_err();
        assert!(err.is_not_found());
        assert!(!backend.has_key(&key(&["a", "b", "c", "d", "e"])).unwrap());
    }

    #[test]
    fn empty_parts_cannot_escape_base_directory() {
        let dir = TempDir::new().unwrap();
        let mut backend = FilesystemStoreBackend::new(&config(TEMPLATE), Some(dir.path()), 5).unwrap();
        let empty = vec![String::new(); 5];

        assert!(backend.get(&empty).unwrap_err().is_not_found());
        assert!(!backend.has_key(&empty).unwrap());
        assert!(matches!(
            backend.set(&empty, b"x"),
            Err(StoreError::InvalidKey(_))
        ));

        let dotted = key(&["..", "b", "c", "d", "e"]);
        assert!(matches!(
            backend.set(&dotted, b"x"),
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn overwrite_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let mut backend = FilesystemStoreBackend::new(&config("{0}.{file_extension}"), Some(dir.path()), 1).unwrap();

        backend.set(&key(&["a"]), b"one").unwrap();
        backend.set(&key(&["a"]), b"two").unwrap();

        assert_eq!(backend.get(&key(&["a"])).unwrap(), b"two");
        assert!(!dir.path().join("my_store/a.txt.tmp").exists());
    }

    #[test]
    fn list_keys_ignores_foreign_files() {
        let dir = TempDir::new().unwrap();
        let mut backend = FilesystemStoreBackend::new(&config(TEMPLATE), Some(dir.path()), 5).unwrap();
        backend.set(&key(&["a", "b", "c", "q", "r1"]), b"1").unwrap();
        backend.set(&key(&["a", "b", "c", "q", "r2"]), b"2").unwrap();
        fs::write(dir.path().join("my_store/README.md"), "notes").unwrap();

        assert_eq!(
            backend.list_keys().unwrap(),
            vec![key(&["a", "b", "c", "q", "r1"]), key(&["a", "b", "c", "q", "r2"])]
        );
    }

    #[test]
    fn list_keys_on_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemStoreBackend::new(&config(TEMPLATE), Some(dir.path()), 5).unwrap();
        assert!(backend.list_keys().unwrap().is_empty());
    }

    #[test]
    fn non_invertible_template_cannot_list() {
        let dir = TempDir::new().unwrap();
        let mut backend = FilesystemStoreBackend::new(&config("{0}/{2}.txt"), Some(dir.path()), 3).unwrap();
        backend.set(&key(&["a", "b", "c"]), b"x").unwrap();

        assert_eq!(backend.get(&key(&["a", "b", "c"])).unwrap(), b"x");
        assert!(matches!(
            backend.list_keys(),
            Err(StoreError::NonInvertibleTemplate(_))
        ));
    }

    #[test]
    fn construction_validates_configuration() {
        let dir = TempDir::new().unwrap();

        assert!(matches!(
            FilesystemStoreBackend::new(&config(TEMPLATE), None, 5),
            Err(StoreError::Config(_))
        ));
        assert!(matches!(
            FilesystemStoreBackend::new(&config(TEMPLATE), Some(dir.path()), 4),
            Err(StoreError::Template(_))
        ));

        let mut no_ext = config(TEMPLATE);
        no_ext.file_extension = None;
        assert!(matches!(
            FilesystemStoreBackend::new(&no_ext, Some(dir.path()), 5),
            Err(StoreError::Template(_))
        ));

        let mut half_replacement = config(TEMPLATE);
        half_replacement.replacement_string = None;
        assert!(matches!(
            FilesystemStoreBackend::new(&half_replacement, Some(dir.path()), 5),
            Err(StoreError::Config(_))
        ));

        let mut empty_replacement = config(TEMPLATE);
        empty_replacement.replacement_string = Some(String::new());
        assert!(matches!(
            FilesystemStoreBackend::new(&empty_replacement, Some(dir.path()), 5),
            Err(StoreError::Config(_))
        ));
    }

    #[test]
    fn absolute_base_ignores_root() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config("{0}.{file_extension}");
        cfg.base_directory = dir.path().join("abs").display().to_string();

        let mut backend = FilesystemStoreBackend::new(&cfg, None, 1).unwrap();
        backend.set(&key(&["k"]), b"v").unwrap();

        assert!(dir.path().join("abs/k.txt").is_file());
    }

    proptest! {
        #[test]
        fn distinct_keys_never_share_a_path(
            a in proptest::collection::vec("[ab_/.-]{0,4}", 2),
            b in proptest::collection::vec("[ab_/.-]{0,4}", 2),
        ) {
            prop_assume!(a != b);
            let dir = TempDir::new().unwrap();
            let backend =
                FilesystemStoreBackend::new(&config("{0}/{1}.{file_extension}"), Some(dir.path()), 2).unwrap();

            if let (Ok(path_a), Ok(path_b)) = (backend.relative_path(&a), backend.relative_path(&b)) {
                prop_assert_ne!(path_a, path_b);
            }
        }
    }
}
