//! Recording blob store double.
//!
//! Records every put and delete, keeps objects in a map, and can inject
//! failures for keys containing a given fragment.

use async_trait::async_trait;
use atelier_core::StorageBackend;
use atelier_storage::{BlobStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    objects: HashMap<String, Vec<u8>>,
    put_keys: Vec<String>,
    deleted_keys: Vec<String>,
    fail_puts_containing: Vec<String>,
    fail_deletes_containing: Vec<String>,
}

#[derive(Default)]
pub struct RecordingBlobStore {
    inner: Mutex<Inner>,
}

impl RecordingBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_puts_containing(&self, fragment: &str) {
        self.inner
            .lock()
            .unwrap()
            .fail_puts_containing
            .push(fragment.to_string());
    }

    pub fn fail_deletes_containing(&self, fragment: &str) {
        self.inner
            .lock()
            .unwrap()
            .fail_deletes_containing
            .push(fragment.to_string());
    }

    pub fn clear_failures(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_puts_containing.clear();
        inner.fail_deletes_containing.clear();
    }

    pub fn put_keys(&self) -> Vec<String> {
        self.inner.lock().unwrap().put_keys.clone()
    }

    pub fn object_count(&self) -> usize {
        self.inner.lock().unwrap().objects.len()
    }

    pub fn has_object_containing(&self, fragment: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .objects
            .keys()
            .any(|k| k.contains(fragment))
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn put(&self, key: &str, _content_type: &str, data: Vec<u8>) -> StorageResult<String> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_puts_containing.iter().any(|f| key.contains(f)) {
            return Err(StorageError::UploadFailed(format!(
                "injected upload failure for {}",
                key
            )));
        }
        inner.put_keys.push(key.to_string());
        inner.objects.insert(key.to_string(), data);
        Ok(format!("http://storage.test/{}", key))
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.inner
            .lock()
            .unwrap()
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn public_locator_of(&self, key: &str) -> String {
        format!("http://storage.test/{}", key)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .fail_deletes_containing
            .iter()
            .any(|f| key.contains(f))
        {
            return Err(StorageError::DeleteFailed(format!(
                "injected delete failure for {}",
                key
            )));
        }
        inner.objects.remove(key);
        inner.deleted_keys.push(key.to_string());
        Ok(())
    }

    async fn bucket_exists(&self) -> StorageResult<bool> {
        Ok(true)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
