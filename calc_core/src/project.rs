//! # Project Data Structures
//!
//! The `Project` struct is the root container for one cost estimate.
//! Projects serialize to `.cce` files as human-readable JSON whose field
//! names match the estimator's stored project shape.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── id, version, name, code, type, area, floor, created, modified
//! ├── prices: PriceOverrides (customPrices, customUnits)
//! ├── items: Vec<SummaryCard> (saved line items, display order)
//! ├── customRates: RateOverrides
//! ├── laborExtrasPerFloor / laborFloorLevel / laborPinnedBase
//! └── settings: EstimateSettings (supervision percentage)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use calc_core::project::{Project, ProjectInfo};
//!
//! let info = ProjectInfo::new("فيلا التجمع", "P-101", "سكني", 250.0, 3);
//! let project = Project::create(info).unwrap();
//!
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! assert!(json.contains("\"laborFloorLevel\": 1"));
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::calculations::RateOverrides;
use crate::errors::{CalcError, CalcResult};
use crate::numeric::{lenient, sanitize};
use crate::pricing::floor::clamp_floor;
use crate::pricing::{LaborFloorConfig, PriceOverrides};
use crate::summary::SummaryCard;

/// Current schema version for .cce files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Project file extension
pub const PROJECT_EXTENSION: &str = "cce";

/// Identity fields supplied when a project is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    pub project_type: String,
    /// Built-up area in m2
    pub area: f64,
    /// Number of floors
    pub floor: u32,
}

impl ProjectInfo {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        project_type: impl Into<String>,
        area: f64,
        floor: u32,
    ) -> Self {
        ProjectInfo {
            name: name.into(),
            code: code.into(),
            project_type: project_type.into(),
            area,
            floor,
        }
    }

    /// All fields are required; area and floor count must be positive.
    pub fn validate(&self) -> CalcResult<()> {
        if self.name.trim().is_empty() {
            return Err(CalcError::missing_field("name"));
        }
        if self.code.trim().is_empty() {
            return Err(CalcError::missing_field("code"));
        }
        if self.project_type.trim().is_empty() {
            return Err(CalcError::missing_field("type"));
        }
        if !(sanitize(self.area) > 0.0) {
            return Err(CalcError::invalid_input(
                "area",
                self.area.to_string(),
                "Area must be positive",
            ));
        }
        if self.floor == 0 {
            return Err(CalcError::invalid_input(
                "floor",
                self.floor.to_string(),
                "Floor count must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Per-project settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateSettings {
    /// Supervision markup applied to the selling total, percent
    #[serde(default, deserialize_with = "lenient::f64")]
    pub supervision_percentage: f64,
}

/// Root project container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default = "new_project_id")]
    pub id: String,

    /// Schema version (for migration compatibility)
    #[serde(default = "current_version")]
    pub version: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub code: String,

    #[serde(default, rename = "type")]
    pub project_type: String,

    #[serde(default, deserialize_with = "lenient::f64")]
    pub area: f64,

    /// Number of floors of the building
    #[serde(default = "one", deserialize_with = "floor_count")]
    pub floor: u32,

    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub modified: DateTime<Utc>,

    #[serde(default)]
    pub prices: PriceOverrides,

    /// Saved line items in display order
    #[serde(default)]
    pub items: Vec<SummaryCard>,

    #[serde(default)]
    pub custom_rates: RateOverrides,

    #[serde(default, deserialize_with = "lenient::f64_map")]
    pub labor_extras_per_floor: BTreeMap<String, f64>,

    /// Floor the labor surcharges are currently priced for
    #[serde(default = "one", deserialize_with = "floor_count")]
    pub labor_floor_level: u32,

    #[serde(default, deserialize_with = "lenient::f64_map")]
    pub labor_pinned_base: BTreeMap<String, f64>,

    #[serde(default)]
    pub settings: EstimateSettings,
}

fn new_project_id() -> String {
    Uuid::new_v4().to_string()
}

fn current_version() -> String {
    SCHEMA_VERSION.to_string()
}

fn one() -> u32 {
    1
}

/// Floor numbers stored as numbers or text; invalid values become 1.
fn floor_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(clamp_floor(lenient::f64(deserializer)?))
}

impl Project {
    /// Create an empty project without validating the identity fields.
    pub fn new(info: ProjectInfo) -> Self {
        let now = Utc::now();
        Project {
            id: new_project_id(),
            version: current_version(),
            name: info.name,
            code: info.code,
            project_type: info.project_type,
            area: sanitize(info.area),
            floor: info.floor.max(1),
            created: now,
            modified: now,
            prices: PriceOverrides::default(),
            items: Vec::new(),
            custom_rates: RateOverrides::default(),
            labor_extras_per_floor: BTreeMap::new(),
            labor_floor_level: 1,
            labor_pinned_base: BTreeMap::new(),
            settings: EstimateSettings::default(),
        }
    }

    /// Validate the identity fields and create an empty project.
    pub fn create(info: ProjectInfo) -> CalcResult<Self> {
        info.validate()?;
        Ok(Project::new(info))
    }

    pub fn info(&self) -> ProjectInfo {
        ProjectInfo {
            name: self.name.clone(),
            code: self.code.clone(),
            project_type: self.project_type.clone(),
            area: self.area,
            floor: self.floor,
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Labor floor configuration assembled from the stored fields
    pub fn labor_floor(&self) -> LaborFloorConfig {
        LaborFloorConfig {
            floor_level: self.labor_floor_level.max(1),
            extras_per_floor: self.labor_extras_per_floor.clone(),
            pinned_base: self.labor_pinned_base.clone(),
        }
    }

    pub fn set_labor_floor(&mut self, config: &LaborFloorConfig) {
        self.labor_floor_level = config.floor_level.max(1);
        self.labor_extras_per_floor = config.extras_per_floor.clone();
        self.labor_pinned_base = config.pinned_base.clone();
    }

    /// `"name (code)"`
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new(ProjectInfo::new("", "", "", 0.0, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn villa() -> ProjectInfo {
        ProjectInfo::new("فيلا التجمع", "P-101", "سكني", 250.0, 3)
    }

    #[test]
    fn test_project_creation() {
        let project = Project::create(villa()).unwrap();
        assert_eq!(project.name, "فيلا التجمع");
        assert_eq!(project.code, "P-101");
        assert_eq!(project.floor, 3);
        assert_eq!(project.labor_floor_level, 1);
        assert_eq!(project.version, SCHEMA_VERSION);
        assert_eq!(project.info(), villa());
    }

    #[test]
    fn test_create_validates_fields() {
        let mut info = villa();
        info.code = "  ".to_string();
        assert_eq!(Project::create(info).unwrap_err().error_code(), "MISSING_FIELD");

        let mut info = villa();
        info.area = f64::NAN;
        assert_eq!(Project::create(info).unwrap_err().error_code(), "INVALID_INPUT");

        let mut info = villa();
        info.floor = 0;
        assert!(Project::create(info).is_err());
    }

    #[test]
    fn test_project_serialization() {
        let mut project = Project::create(villa()).unwrap();
        project.prices.set_price("أسمنت أسود", 320.0);
        project.settings.supervision_percentage = 7.5;
        project.items.push(SummaryCard::new("العزل", "سيكا", 10.0, "م2", 100.0, 10.0));

        let json = serde_json::to_string_pretty(&project).unwrap();
        assert!(json.contains("\"customPrices\""));
        assert!(json.contains("\"supervisionPercentage\": 7.5"));
        assert!(json.contains("\"type\": \"سكني\""));

        let roundtrip: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, project);
    }

    #[test]
    fn test_legacy_project_loads() {
        let json = r#"{
            "name": "شقة المعادي",
            "code": "A-7",
            "type": "سكني",
            "area": "140",
            "floor": 5,
            "prices": { "materials": {}, "workmanship": {}, "labor": {},
                        "customPrices": { "تشوين أسمنت": "12" } },
            "items": [],
            "laborExtrasPerFloor": { "تشوين أسمنت": 2 },
            "laborFloorLevel": "3",
            "customRates": { "المباني||طوب||أسمنت أسود": "0.3" }
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.area, 140.0);
        assert_eq!(project.labor_floor_level, 3);
        assert_eq!(project.prices.price("تشوين أسمنت"), Some(12.0));
        assert_eq!(project.custom_rates.get("المباني||طوب||أسمنت أسود"), Some(0.3));
        assert!(project.labor_pinned_base.is_empty());
        assert_eq!(project.version, SCHEMA_VERSION);
        assert!(!project.id.is_empty());
    }

    #[test]
    fn test_labor_floor_round_trip() {
        let mut project = Project::default();
        let mut config = project.labor_floor();
        config.set_extra("تشوين رمل", 5.0, 50.0);
        config.change_floor(2.0, |_| 50.0);
        project.set_labor_floor(&config);

        assert_eq!(project.labor_floor_level, 2);
        assert_eq!(project.labor_extras_per_floor.get("تشوين رمل"), Some(&5.0));
        assert_eq!(project.labor_floor(), config);
    }
}
