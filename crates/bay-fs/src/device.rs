use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use similar::TextDiff;

use bay_core::CapabilityDescriptor;
use bay_device::{BackendError, Device};

/// A filesystem device rooted at one directory.
#[derive(Debug)]
pub struct FsDevice {
    root: PathBuf,
    descriptor: CapabilityDescriptor,
}

impl FsDevice {
    pub fn new(root: PathBuf, descriptor: CapabilityDescriptor) -> Self {
        Self { root, descriptor }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a path argument under the root. Absolute paths and any
    /// component that would climb out of the root are rejected.
    fn resolve(&self, path: &str) -> Result<PathBuf, BackendError> {
        let relative = Path::new(path);
        if relative.is_absolute() {
            return Err(BackendError::transient(format!(
                "path must be relative to the device root: {path}"
            )));
        }
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(BackendError::transient(format!(
                        "path escapes the device root: {path}"
                    )));
                }
            }
        }
        Ok(resolved)
    }

    async fn read_file(&self, path: &str) -> Result<Value, BackendError> {
        let full = self.resolve(path)?;
        let content = tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| BackendError::transient(format!("{path}: {e}")))?;
        Ok(json!({ "content": content }))
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<Value, BackendError> {
        let full = self.resolve(path)?;
        tokio::fs::write(&full, content)
            .await
            .map_err(|e| BackendError::transient(format!("{path}: {e}")))?;
        Ok(Value::Null)
    }

    async fn append_file(&self, path: &str, content: &str) -> Result<Value, BackendError> {
        use tokio::io::AsyncWriteExt;

        let full = self.resolve(path)?;
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&full)
            .await
            .map_err(|e| BackendError::transient(format!("{path}: {e}")))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| BackendError::transient(format!("{path}: {e}")))?;
        Ok(Value::Null)
    }

    async fn delete_file(&self, path: &str) -> Result<Value, BackendError> {
        let full = self.resolve(path)?;
        tokio::fs::remove_file(&full)
            .await
            .map_err(|e| BackendError::transient(format!("{path}: {e}")))?;
        Ok(Value::Null)
    }

    async fn create_dir(&self, path: &str) -> Result<Value, BackendError> {
        let full = self.resolve(path)?;
        tokio::fs::create_dir_all(&full)
            .await
            .map_err(|e| BackendError::transient(format!("{path}: {e}")))?;
        Ok(Value::Null)
    }

    async fn delete_dir(&self, path: &str) -> Result<Value, BackendError> {
        let full = self.resolve(path)?;
        tokio::fs::remove_dir(&full)
            .await
            .map_err(|e| BackendError::transient(format!("{path}: {e}")))?;
        Ok(Value::Null)
    }

    async fn list_dir(&self, path: &str) -> Result<Value, BackendError> {
        let full = self.resolve(path)?;
        let mut dir = tokio::fs::read_dir(&full)
            .await
            .map_err(|e| BackendError::transient(format!("{path}: {e}")))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| BackendError::transient(format!("{path}: {e}")))?
        {
            let meta = entry
                .metadata()
                .await
                .map_err(|e| BackendError::transient(format!("{path}: {e}")))?;
            let kind = if meta.is_dir() {
                "dir"
            } else if meta.is_file() {
                "file"
            } else {
                "other"
            };
            let modified = meta
                .modified()
                .ok()
                .map(|t| DateTime::<Utc>::from(t).to_rfc3339());
            entries.push(json!({
                "name": entry.file_name().to_string_lossy(),
                "kind": kind,
                "size": meta.len(),
                "modified": modified,
            }));
        }
        Ok(json!({ "entries": entries }))
    }

    async fn diff_file(&self, path: &str, content: &str) -> Result<Value, BackendError> {
        let full = self.resolve(path)?;
        let old = tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| BackendError::transient(format!("{path}: {e}")))?;
        let diff = TextDiff::from_lines(old.as_str(), content)
            .unified_diff()
            .header(path, path)
            .to_string();
        Ok(json!({ "diff": diff }))
    }

    /// Walk the tree under the root, counting files and bytes.
    async fn usage(&self) -> Result<Value, BackendError> {
        let mut files: u64 = 0;
        let mut bytes: u64 = 0;
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| BackendError::transient(format!("{}: {e}", dir.display())))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| BackendError::transient(format!("{}: {e}", dir.display())))?
            {
                let meta = entry
                    .metadata()
                    .await
                    .map_err(|e| BackendError::transient(format!("{}: {e}", dir.display())))?;
                if meta.is_dir() {
                    pending.push(entry.path());
                } else if meta.is_file() {
                    files += 1;
                    bytes += meta.len();
                }
            }
        }
        Ok(json!({ "files": files, "bytes": bytes }))
    }
}

fn str_arg<'a>(args: &'a Map<String, Value>, name: &str) -> Result<&'a str, BackendError> {
    args.get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| BackendError::transient(format!("missing '{name}' argument")))
}

#[async_trait]
impl Device for FsDevice {
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn execute(
        &self,
        action: &str,
        args: &Map<String, Value>,
    ) -> Result<Value, BackendError> {
        match action {
            "read_file" => self.read_file(str_arg(args, "path")?).await,
            "write_file" => {
                self.write_file(str_arg(args, "path")?, str_arg(args, "content")?)
                    .await
            }
            "append_file" => {
                self.append_file(str_arg(args, "path")?, str_arg(args, "content")?)
                    .await
            }
            "delete_file" => self.delete_file(str_arg(args, "path")?).await,
            "create_dir" => self.create_dir(str_arg(args, "path")?).await,
            "delete_dir" => self.delete_dir(str_arg(args, "path")?).await,
            "list_dir" => {
                let path = args.get("path").and_then(|v| v.as_str()).unwrap_or(".");
                self.list_dir(path).await
            }
            "diff_file" => {
                self.diff_file(str_arg(args, "path")?, str_arg(args, "content")?)
                    .await
            }
            other => Err(BackendError::transient(format!("no such action: {other}"))),
        }
    }

    async fn observe(&self, name: &str) -> Result<Value, BackendError> {
        match name {
            "root" => Ok(json!(self.root.display().to_string())),
            "usage" => self.usage().await,
            other => Err(BackendError::transient(format!(
                "no such observation: {other}"
            ))),
        }
    }
}
