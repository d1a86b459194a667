//! Asset index documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `assets/indexes/<id>.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetIndex {
    #[serde(default)]
    pub objects: BTreeMap<String, AssetObject>,
}

/// A content-addressed asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetObject {
    pub hash: String,
    #[serde(default)]
    pub size: u64,
}

impl AssetObject {
    /// URL below the resources base: `<hh>/<hash>`.
    pub fn url(&self, resources_base: &str) -> String {
        let prefix = self.hash.get(..2).unwrap_or(&self.hash);
        format!("{}/{}/{}", resources_base.trim_end_matches('/'), prefix, self.hash)
    }
}

impl AssetIndex {
    /// Distinct objects; several names can share one hash.
    pub fn unique_objects(&self) -> Vec<&AssetObject> {
        let mut seen = std::collections::HashSet::new();
        self.objects
            .values()
            .filter(|object| seen.insert(object.hash.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url() {
        let object = AssetObject {
            hash: "bdf48ef6b5d0d23bbb02e17d04865216179f510a".to_string(),
            size: 3665,
        };
        assert_eq!(
            object.url("http://resources.download.minecraft.net/"),
            "http://resources.download.minecraft.net/bd/bdf48ef6b5d0d23bbb02e17d04865216179f510a"
        );
    }

    #[test]
    fn test_unique_objects() {
        let index: AssetIndex = serde_json::from_str(
            r#"{"objects": {
                "a.ogg": {"hash": "aa11", "size": 1},
                "b.ogg": {"hash": "aa11", "size": 1},
                "c.png": {"hash": "cc22", "size": 2}
            }}"#,
        )
        .unwrap();
        assert_eq!(index.unique_objects().len(), 2);
    }
}
