//! Config descriptor table and the once-per-key instance cache.
//!
//! # Invariants
//! - The populate sequence (seed file, read, deserialize) runs at most once
//!   per key; concurrent callers wait on the same cell.
//! - A failed population caches nothing, so the next call retries it.
//! - Re-registering a descriptor never invalidates a cached instance.

use super::{file, ConfigDefault, ConfigStats, SharedConfig, TemplateResources, YamlCodec};
use crate::registry::{CapabilityKey, RegistryError, RegistryResult, TableKind};
use log::{error, info};
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

type SharedAny = Arc<dyn Any + Send + Sync>;
type RenderDefault = Box<dyn Fn(&YamlCodec) -> Result<String, serde_yaml::Error> + Send + Sync>;

enum Seed {
    Template(String),
    Value(RenderDefault),
}

struct ConfigDescriptor {
    file_name: String,
    seed: Seed,
}

pub(crate) struct ConfigStore {
    config_dir: PathBuf,
    codec: YamlCodec,
    resources: RwLock<TemplateResources>,
    descriptors: RwLock<HashMap<CapabilityKey, Arc<ConfigDescriptor>>>,
    cache: Mutex<HashMap<CapabilityKey, Arc<OnceCell<SharedAny>>>>,
    seeded: AtomicUsize,
    loaded: AtomicUsize,
}

impl ConfigStore {
    pub(crate) fn new(config_dir: PathBuf) -> Self {
        Self {
            config_dir,
            codec: YamlCodec::new(),
            resources: RwLock::new(TemplateResources::builtin()),
            descriptors: RwLock::new(HashMap::new()),
            cache: Mutex::new(HashMap::new()),
            seeded: AtomicUsize::new(0),
            loaded: AtomicUsize::new(0),
        }
    }

    pub(crate) fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub(crate) fn register<T>(&self, file_name: String, default: ConfigDefault<T>)
    where
        T: Serialize + Send + Sync + 'static,
    {
        let key = CapabilityKey::of::<T>();
        let seed = match default {
            ConfigDefault::Template(name) => Seed::Template(name),
            ConfigDefault::Value(value) => {
                Seed::Value(Box::new(move |codec: &YamlCodec| codec.to_document(&value)))
            }
        };
        let seed_kind = match &seed {
            Seed::Template(_) => "template",
            Seed::Value(_) => "value",
        };
        info!(
            "event=config_register module=config status=ok key={} file={} seed={}",
            key, file_name, seed_kind
        );
        let descriptor = Arc::new(ConfigDescriptor { file_name, seed });
        self.descriptors.write().insert(key, descriptor);
    }

    pub(crate) fn register_resource(&self, name: String, bytes: &'static [u8]) {
        let replaced = self.resources.write().insert(name.as_str(), bytes);
        info!(
            "event=resource_register module=config status=ok name={} bytes={} replaced={}",
            name,
            bytes.len(),
            replaced
        );
    }

    pub(crate) fn get<T>(&self) -> RegistryResult<SharedConfig<T>>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let key = CapabilityKey::of::<T>();
        let cell = {
            let mut cache = self.cache.lock();
            Arc::clone(cache.entry(key).or_default())
        };

        let instance = cell.get_or_try_init(|| self.materialize::<T>(key))?;
        // Unreachable: the cell for `TypeId::of::<T>()` only ever holds `RwLock<T>`.
        Arc::clone(instance)
            .downcast::<RwLock<T>>()
            .map_err(|_| RegistryError::NotRegistered {
                table: TableKind::Configs,
                key,
            })
    }

    pub(crate) fn stats(&self) -> ConfigStats {
        ConfigStats {
            seeded: self.seeded.load(Ordering::SeqCst),
            loaded: self.loaded.load(Ordering::SeqCst),
        }
    }

    fn materialize<T>(&self, key: CapabilityKey) -> RegistryResult<SharedAny>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let started_at = Instant::now();
        let Some(descriptor) = self.descriptors.read().get(&key).cloned() else {
            error!(
                "event=config_load module=config status=error key={} error_code=not_registered",
                key
            );
            return Err(RegistryError::NotRegistered {
                table: TableKind::Configs,
                key,
            });
        };

        let path = self.config_dir.join(&descriptor.file_name);
        info!(
            "event=config_load module=config status=start key={} path={}",
            key,
            path.display()
        );

        let loaded = self
            .seed_if_missing(&descriptor, &path)
            .and_then(|seeded| Ok((seeded, file::read::<T>(&path, &self.codec)?)));

        match loaded {
            Ok((seeded, value)) => {
                self.loaded.fetch_add(1, Ordering::SeqCst);
                info!(
                    "event=config_load module=config status=ok key={} seeded={} duration_ms={}",
                    key,
                    seeded,
                    started_at.elapsed().as_millis()
                );
                let instance: SharedAny = Arc::new(RwLock::new(value));
                Ok(instance)
            }
            Err(err) => {
                error!(
                    "event=config_load module=config status=error key={} duration_ms={} error={}",
                    key,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn seed_if_missing(&self, descriptor: &ConfigDescriptor, path: &Path) -> RegistryResult<bool> {
        if file::exists(path)? {
            return Ok(false);
        }

        let contents: Cow<'static, [u8]> = match &descriptor.seed {
            Seed::Template(name) => {
                let bytes = self.resources.read().get(name).ok_or_else(|| {
                    RegistryError::MissingTemplate {
                        resource: name.clone(),
                    }
                })?;
                Cow::Borrowed(bytes)
            }
            Seed::Value(render) => {
                let document = render(&self.codec).map_err(|source| RegistryError::DefaultEncode {
                    path: path.to_path_buf(),
                    source,
                })?;
                Cow::Owned(document.into_bytes())
            }
        };

        let created = file::seed(path, &contents)?;
        if created {
            self.seeded.fetch_add(1, Ordering::SeqCst);
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::ConfigStore;
    use crate::config::{ConfigDefault, ConfigStats};
    use crate::registry::{RegistryError, TableKind};
    use serde::{Deserialize, Serialize};
    use std::fs;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Warps {
        limit: u32,
    }

    #[test]
    fn unregistered_config_is_not_cached() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().to_path_buf());

        let err = store.get::<Warps>().expect_err("unregistered config must fail");
        assert!(matches!(
            err,
            RegistryError::NotRegistered {
                table: TableKind::Configs,
                ..
            }
        ));

        store.register("warps.yaml".to_string(), ConfigDefault::Value(Warps { limit: 4 }));
        let warps = store.get::<Warps>().expect("registered later");
        assert_eq!(warps.read().limit, 4);
    }

    #[test]
    fn missing_template_creates_no_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().to_path_buf());
        store.register::<Warps>(
            "warps.yaml".to_string(),
            ConfigDefault::template("warps-template.yaml"),
        );

        let err = store.get::<Warps>().expect_err("template is not bundled");
        assert!(matches!(err, RegistryError::MissingTemplate { .. }));
        assert!(!dir.path().join("warps.yaml").exists());
        assert_eq!(store.stats(), ConfigStats::default());
    }

    #[test]
    fn registered_resource_seeds_template_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().to_path_buf());
        store.register_resource("warps-template.yaml".to_string(), b"# warps\nlimit: 8\n");
        store.register::<Warps>(
            "warps.yaml".to_string(),
            ConfigDefault::template("warps-template.yaml"),
        );

        let warps = store.get::<Warps>().expect("template config");
        assert_eq!(warps.read().limit, 8);
        assert_eq!(
            fs::read(dir.path().join("warps.yaml")).expect("read back"),
            b"# warps\nlimit: 8\n"
        );
    }

    #[derive(Debug, Deserialize)]
    struct Unrenderable {
        #[allow(dead_code)]
        limit: u32,
    }

    impl Serialize for Unrenderable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("limit cannot be rendered"))
        }
    }

    #[test]
    fn unrenderable_default_names_the_default_and_creates_no_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().to_path_buf());
        store.register(
            "limits.yaml".to_string(),
            ConfigDefault::Value(Unrenderable { limit: 1 }),
        );

        let err = store
            .get::<Unrenderable>()
            .expect_err("default cannot be serialized");
        assert!(matches!(err, RegistryError::DefaultEncode { .. }));
        assert!(err.to_string().contains("default value"));
        assert!(!dir.path().join("limits.yaml").exists());
        assert_eq!(store.stats(), ConfigStats::default());
    }

    #[test]
    fn existing_file_wins_over_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("warps.yaml"), "limit: 11\n").expect("write");
        let store = ConfigStore::new(dir.path().to_path_buf());
        store.register("warps.yaml".to_string(), ConfigDefault::Value(Warps { limit: 1 }));

        let warps = store.get::<Warps>().expect("load existing");
        assert_eq!(warps.read().limit, 11);
        assert_eq!(
            store.stats(),
            ConfigStats {
                seeded: 0,
                loaded: 1
            }
        );
    }

    #[test]
    fn reregistration_does_not_invalidate_cache() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().to_path_buf());
        store.register("warps.yaml".to_string(), ConfigDefault::Value(Warps { limit: 2 }));
        let first = store.get::<Warps>().expect("first load");

        store.register("other.yaml".to_string(), ConfigDefault::Value(Warps { limit: 99 }));
        let second = store.get::<Warps>().expect("cached load");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.read().limit, 2);
        assert!(!dir.path().join("other.yaml").exists());
    }
}
