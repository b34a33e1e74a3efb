//! Model catalog
//!
//! The static list of point-cloud models and warehouse map nodes the
//! viewer UI consumes. The built-in entries cover the pier 41 warehouse
//! deployment; a JSON file named in configuration replaces the catalog
//! wholesale.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Catalog error types
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A selectable point-cloud model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    pub name: String,
    /// Static asset path or gateway URL the viewer loads
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Map node icon shown on the warehouse map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeIcon {
    Warehouse,
    Pointcloud,
    Scan,
    #[default]
    Default,
}

/// A warehouse storage area with an attached model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapNode {
    pub id: String,
    pub model: ModelEntry,
    pub location_name: String,
    #[serde(default)]
    pub icon: NodeIcon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Model catalog served to the viewer UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCatalog {
    models: Vec<ModelEntry>,
    map_nodes: Vec<MapNode>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModelCatalog {
    /// The built-in catalog
    pub fn builtin() -> Self {
        let models = vec![
            model("storeroom", "Storeroom", "/models/storeroom.ply", "Default storeroom model"),
            model("point_cloud", "Point Cloud", "/models/point_cloud.ply", "Basic point cloud visualization"),
            model("point_cloud_1", "Point Cloud Alternative", "/models/point_cloud_1.ply", "Alternative point cloud dataset"),
            model("seg_params", "Segmentation Parameters", "/models/seg_params.ply", "Segmentation parameters model"),
            model("sgs_slam_seg_param", "SGS SLAM Segmentation", "/models/sgs_slam_seg_param.ply", "SLAM segmentation parameters"),
        ];

        let map_nodes = vec![
            MapNode {
                id: "node-area-1".to_string(),
                model: model("storeroom", "倉庫模型", "/models/storeroom.ply", "主要倉庫儲存模型"),
                location_name: "儲存區 1 - 主倉庫".to_string(),
                icon: NodeIcon::Warehouse,
                description: Some("41號碼頭主要儲存設施".to_string()),
            },
            MapNode {
                id: "node-area-2".to_string(),
                model: model("point_cloud", "點雲掃描", "/models/point_cloud.ply", "基礎點雲視覺化"),
                location_name: "儲存區 2 - 掃描數據".to_string(),
                icon: NodeIcon::Pointcloud,
                description: Some("港區點雲掃描數據".to_string()),
            },
            MapNode {
                id: "node-area-3".to_string(),
                model: model("point_cloud_1", "替代點雲", "/models/point_cloud_1.ply", "替代點雲數據集"),
                location_name: "儲存區 3 - 備用掃描".to_string(),
                icon: NodeIcon::Pointcloud,
                description: Some("替代掃描方法結果".to_string()),
            },
            MapNode {
                id: "node-area-4".to_string(),
                model: model("seg_params", "分割參數", "/models/seg_params.ply", "分割參數模型"),
                location_name: "儲存區 4 - 分割數據".to_string(),
                icon: NodeIcon::Scan,
                description: Some("分割倉庫掃描數據".to_string()),
            },
            MapNode {
                id: "node-area-5".to_string(),
                model: model("sgs_slam_seg_param", "SLAM分割", "/models/sgs_slam_seg_param.ply", "SLAM分割參數"),
                location_name: "儲存區 5 - SLAM映射".to_string(),
                icon: NodeIcon::Scan,
                description: Some("SLAM生成的3D映射數據".to_string()),
            },
        ];

        Self { models, map_nodes }
    }

    /// Load a catalog from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let catalog = serde_json::from_str(&content)?;
        Ok(catalog)
    }

    /// The selectable models
    pub fn models(&self) -> &[ModelEntry] {
        &self.models
    }

    /// The warehouse map nodes
    pub fn map_nodes(&self) -> &[MapNode] {
        &self.map_nodes
    }

    /// The model selected when the viewer starts
    pub fn default_model(&self) -> Option<&ModelEntry> {
        self.models.first()
    }
}

fn model(id: &str, name: &str, path: &str, description: &str) -> ModelEntry {
    ModelEntry {
        id: id.to_string(),
        name: name.to_string(),
        path: path.to_string(),
        description: Some(description.to_string()),
    }
}

/// Resolve the URL the viewer should load.
///
/// A `model` parameter (static asset path) wins over a `path` parameter;
/// a bare filesystem path is wrapped as a gateway URL with the path
/// percent-encoded. Returns `None` when neither parameter is usable.
pub fn model_url(model_param: Option<&str>, path_param: Option<&str>) -> Option<String> {
    if let Some(model) = model_param.filter(|value| !value.is_empty()) {
        return Some(model.to_string());
    }
    if let Some(path) = path_param.filter(|value| !value.is_empty()) {
        return Some(format!("/file?path={}", urlencoding::encode(path)));
    }
    None
}

/// Catalog file path helper for deployments that generate one
pub fn catalog_path_in(dir: &Path) -> PathBuf {
    dir.join("models.json")
}
