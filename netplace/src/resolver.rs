//! Device Resolver
//!
//! Maps a component's declared identity to a library device. A supplier
//! part number is an exact identifier and is always tried first; the
//! device name is a best-effort fuzzy search used only when the part
//! number is absent or unknown.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::host::{DeviceLibrary, HostError, ResolvedDevice};
use crate::parser::ComponentRecord;

/// Which lookup produced a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionStage {
    SupplierPart,
    NameSearch,
}

pub struct DeviceResolver {
    name_search_limit: usize,
    /// `None` when memoization is disabled
    cache: Option<Mutex<HashMap<(ResolutionStage, String), Option<ResolvedDevice>>>>,
}

impl DeviceResolver {
    pub fn new(name_search_limit: usize) -> Self {
        Self {
            name_search_limit: name_search_limit.max(1),
            cache: None,
        }
    }

    /// Remember lookup answers for the lifetime of this resolver.
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(Mutex::new(HashMap::new()));
        self
    }

    /// Resolve a component; `Ok(None)` when no stage found a device.
    pub async fn resolve<L>(
        &self,
        library: &L,
        record: &ComponentRecord,
    ) -> Result<Option<ResolvedDevice>, HostError>
    where
        L: DeviceLibrary + ?Sized,
    {
        Ok(self
            .resolve_with_stage(library, record)
            .await?
            .map(|(device, _)| device))
    }

    pub async fn resolve_with_stage<L>(
        &self,
        library: &L,
        record: &ComponentRecord,
    ) -> Result<Option<(ResolvedDevice, ResolutionStage)>, HostError>
    where
        L: DeviceLibrary + ?Sized,
    {
        let supplier_part = record.supplier_part.trim();
        if !supplier_part.is_empty() {
            if let Some(device) = self
                .lookup(library, ResolutionStage::SupplierPart, supplier_part)
                .await?
            {
                return Ok(Some((device, ResolutionStage::SupplierPart)));
            }
            tracing::debug!(
                "No device for supplier part {}, falling back to name search",
                supplier_part
            );
        }

        let device_name = record.device_name.trim();
        if !device_name.is_empty() {
            if let Some(device) = self
                .lookup(library, ResolutionStage::NameSearch, device_name)
                .await?
            {
                return Ok(Some((device, ResolutionStage::NameSearch)));
            }
        }

        Ok(None)
    }

    async fn lookup<L>(
        &self,
        library: &L,
        stage: ResolutionStage,
        key: &str,
    ) -> Result<Option<ResolvedDevice>, HostError>
    where
        L: DeviceLibrary + ?Sized,
    {
        if let Some(cached) = self.cached(stage, key) {
            return Ok(cached);
        }

        let results = match stage {
            ResolutionStage::SupplierPart => library.lookup_by_supplier_id(key).await?,
            ResolutionStage::NameSearch => {
                library.search_by_name(key, self.name_search_limit).await?
            }
        };
        let first = results.into_iter().next();

        if let Some(cache) = &self.cache {
            cache
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .insert((stage, key.to_string()), first.clone());
        }
        Ok(first)
    }

    fn cached(&self, stage: ResolutionStage, key: &str) -> Option<Option<ResolvedDevice>> {
        let cache = self.cache.as_ref()?;
        let cache = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.get(&(stage, key.to_string())).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{DeviceCatalog, DeviceDefinition, InMemoryHost};

    fn host() -> InMemoryHost {
        InMemoryHost::new(DeviceCatalog::new(vec![
            DeviceDefinition {
                uuid: "dev-exact".into(),
                name: "RC0603FR-0710KL".into(),
                supplier_ids: vec!["C25804".into()],
                pins: vec![],
            },
            DeviceDefinition {
                uuid: "dev-fuzzy".into(),
                name: "10k resistor".into(),
                supplier_ids: vec![],
                pins: vec![],
            },
        ]))
    }

    fn record(supplier_part: &str, device_name: &str) -> ComponentRecord {
        ComponentRecord {
            supplier_part: supplier_part.into(),
            device_name: device_name.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_supplier_part_wins_without_name_search() {
        let host = host();
        let resolver = DeviceResolver::new(1);

        let (device, stage) = resolver
            .resolve_with_stage(&host, &record("C25804", "10k resistor"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(device.device_uuid, "dev-exact");
        assert_eq!(stage, ResolutionStage::SupplierPart);
        assert_eq!(host.name_search_calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_supplier_part_falls_back_to_name() {
        let host = host();
        let resolver = DeviceResolver::new(1);

        let (device, stage) = resolver
            .resolve_with_stage(&host, &record("C0000", "10k resistor"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(device.device_uuid, "dev-fuzzy");
        assert_eq!(stage, ResolutionStage::NameSearch);
        assert_eq!(host.supplier_lookup_calls(), 1);
    }

    #[tokio::test]
    async fn test_blank_identity_is_not_found_without_queries() {
        let host = host();
        let resolver = DeviceResolver::new(1);

        assert_eq!(resolver.resolve(&host, &record(" ", "")).await, Ok(None));
        assert_eq!(host.supplier_lookup_calls(), 0);
        assert_eq!(host.name_search_calls(), 0);
    }

    #[tokio::test]
    async fn test_cache_answers_repeated_lookups() {
        let host = host();
        let resolver = DeviceResolver::new(1).with_cache();

        for _ in 0..3 {
            let device = resolver
                .resolve(&host, &record("", "10k resistor"))
                .await
                .unwrap();
            assert!(device.is_some());
        }
        assert_eq!(host.name_search_calls(), 1);
    }

    #[tokio::test]
    async fn test_lookup_errors_propagate() {
        let host = host().with_failing_lookups();
        let resolver = DeviceResolver::new(1);

        let result = resolver.resolve(&host, &record("C25804", "")).await;
        assert!(matches!(result, Err(HostError::CallFailed(_))));
    }
}
