//! # Resource Catalog
//!
//! Reference data the engine prices against: three resource lists
//! (materials, workmanship, labor) and the usage rules that say which
//! resources a work item consumes and at what rate.
//!
//! The catalog is supplied by the surrounding application as JSON and is
//! never mutated by the engine. Both the engine's own field names and the
//! field names of the original spreadsheet export are accepted:
//!
//! ```json
//! {
//!   "materials": [
//!     { "Resource": "أسمنت أسود", "Unit": "شيكارة", "Alt Unit": "طن", "Unit Cost": 300.0, "Type": "خامات" }
//!   ],
//!   "workmanship": [],
//!   "labor": [],
//!   "items": [
//!     { "Main Item": "المباني", "Sub Item": "طوب أحمر", "Resource": "أسمنت أسود",
//!       "Type": "خامات", "Quantity per Unit": 0.25, "Unit": "م2" }
//!   ]
//! }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use calc_core::catalog::{Catalog, ResourceType};
//!
//! let json = r#"{
//!   "materials": [{ "name": "سيكا 107", "defaultUnit": "شيكارة", "defaultUnitCost": 1000, "type": "material" }],
//!   "workmanship": [], "labor": [], "items": []
//! }"#;
//! let catalog = Catalog::from_json_str(json).unwrap();
//! let sika = catalog.find_resource("سيكا 107", Some(ResourceType::Material)).unwrap();
//! assert_eq!(sika.unit_cost(), 1000.0);
//! ```

pub mod sectors;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::normalize::normalize_arabic;
use crate::numeric::{lenient, sanitize};

pub use sectors::{Sector, SECTORS};

/// Resource category. Every catalog list holds exactly one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "material", alias = "خامات", alias = "MATERIAL", alias = "Material")]
    Material,
    #[serde(rename = "workmanship", alias = "مصنعيات", alias = "WORKMANSHIP", alias = "Workmanship")]
    Workmanship,
    #[serde(rename = "labor", alias = "عمالة", alias = "LABOR", alias = "Labor")]
    Labor,
}

impl ResourceType {
    /// All categories in display order
    pub const ALL: [ResourceType; 3] = [
        ResourceType::Material,
        ResourceType::Workmanship,
        ResourceType::Labor,
    ];

    /// Arabic label used in the catalogs and reports
    pub fn label(&self) -> &'static str {
        match self {
            ResourceType::Material => "خامات",
            ResourceType::Workmanship => "مصنعيات",
            ResourceType::Labor => "عمالة",
        }
    }

    /// English display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceType::Material => "Materials",
            ResourceType::Workmanship => "Workmanship",
            ResourceType::Labor => "Labor",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> Option<Self> {
        match s.trim() {
            "خامات" => Some(ResourceType::Material),
            "مصنعيات" => Some(ResourceType::Workmanship),
            "عمالة" => Some(ResourceType::Labor),
            other => match other.to_lowercase().as_str() {
                "material" | "materials" => Some(ResourceType::Material),
                "workmanship" => Some(ResourceType::Workmanship),
                "labor" | "labour" => Some(ResourceType::Labor),
                _ => None,
            },
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A priced input consumed by work items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Resource name, the lookup key everywhere
    #[serde(alias = "Resource")]
    pub name: String,

    /// Primary pricing unit; custom prices are always stored in this unit
    #[serde(alias = "Unit")]
    pub default_unit: String,

    /// Optional secondary unit (e.g. ton for cement sold by the bag)
    #[serde(default, alias = "Alt Unit")]
    pub alt_unit: Option<String>,

    /// Catalog price per default unit. Price-less placeholders load as 0.
    #[serde(default, alias = "Unit Cost", deserialize_with = "lenient::f64")]
    pub default_unit_cost: f64,

    /// Category
    #[serde(rename = "type", alias = "Type")]
    pub resource_type: ResourceType,
}

impl Resource {
    /// Create a resource without an alternate unit
    pub fn new(
        name: impl Into<String>,
        default_unit: impl Into<String>,
        default_unit_cost: f64,
        resource_type: ResourceType,
    ) -> Self {
        Resource {
            name: name.into(),
            default_unit: default_unit.into(),
            alt_unit: None,
            default_unit_cost,
            resource_type,
        }
    }

    /// Builder: attach an alternate unit
    pub fn with_alt_unit(mut self, alt_unit: impl Into<String>) -> Self {
        self.alt_unit = Some(alt_unit.into());
        self
    }

    /// Catalog price with NaN/missing treated as 0
    pub fn unit_cost(&self) -> f64 {
        sanitize(self.default_unit_cost)
    }

    /// The alternate unit, if one is configured and non-blank
    pub fn alt_unit(&self) -> Option<&str> {
        self.alt_unit.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// How much of a resource one unit of a work item consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRule {
    #[serde(alias = "Main Item")]
    pub main_item: String,

    #[serde(alias = "Sub Item")]
    pub sub_item: String,

    #[serde(alias = "Resource")]
    pub resource: String,

    #[serde(rename = "type", alias = "Type")]
    pub resource_type: ResourceType,

    /// Consumption per one unit of the work item
    #[serde(default, alias = "Quantity per Unit", deserialize_with = "lenient::f64")]
    pub quantity_per_unit: f64,

    /// Measurement unit recorded for the work item
    #[serde(default, alias = "Unit")]
    pub unit: Option<String>,
}

impl UsageRule {
    pub fn new(
        main_item: impl Into<String>,
        sub_item: impl Into<String>,
        resource: impl Into<String>,
        resource_type: ResourceType,
        quantity_per_unit: f64,
    ) -> Self {
        UsageRule {
            main_item: main_item.into(),
            sub_item: sub_item.into(),
            resource: resource.into(),
            resource_type,
            quantity_per_unit,
            unit: None,
        }
    }

    /// Builder: record the work item's unit
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Catalog rate with NaN treated as 0
    pub fn default_rate(&self) -> f64 {
        sanitize(self.quantity_per_unit)
    }

    pub fn matches(&self, main_item: &str, sub_item: &str) -> bool {
        self.main_item == main_item && self.sub_item == sub_item
    }
}

/// Main items listed first, in this order; everything else follows by name.
const MAIN_ITEM_PRIORITY: [&str; 11] = [
    "الهدم",
    "المباني",
    "تأسيس كهرباء",
    "تأسيس سباكة",
    "العزل",
    "تأسيس تكييفات",
    "المحارة",
    "جبسوم بورد",
    "بورسلين",
    "رخام",
    "نقاشة",
];

/// Immutable catalog of resources and usage rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub materials: Vec<Resource>,

    #[serde(default)]
    pub workmanship: Vec<Resource>,

    #[serde(default)]
    pub labor: Vec<Resource>,

    /// Usage rules keyed by (main item, sub item)
    #[serde(default, rename = "items", alias = "usageRules")]
    pub usage_rules: Vec<UsageRule>,
}

impl Catalog {
    pub fn new(
        materials: Vec<Resource>,
        workmanship: Vec<Resource>,
        labor: Vec<Resource>,
        usage_rules: Vec<UsageRule>,
    ) -> Self {
        Catalog {
            materials,
            workmanship,
            labor,
            usage_rules,
        }
    }

    /// Parse a catalog from JSON text.
    pub fn from_json_str(json: &str) -> CalcResult<Self> {
        let catalog: Catalog = serde_json::from_str(json)
            .map_err(|e| CalcError::serialization(format!("Invalid catalog JSON: {}", e)))?;
        tracing::debug!(
            materials = catalog.materials.len(),
            workmanship = catalog.workmanship.len(),
            labor = catalog.labor.len(),
            rules = catalog.usage_rules.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> CalcResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read catalog", path.display().to_string(), e.to_string()))?;
        Catalog::from_json_str(&contents)
    }

    /// The list holding one category
    pub fn list(&self, resource_type: ResourceType) -> &[Resource] {
        match resource_type {
            ResourceType::Material => &self.materials,
            ResourceType::Workmanship => &self.workmanship,
            ResourceType::Labor => &self.labor,
        }
    }

    /// All resources in merged order: materials, workmanship, labor
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.materials
            .iter()
            .chain(self.workmanship.iter())
            .chain(self.labor.iter())
    }

    /// Look up a resource by name.
    ///
    /// With a preferred type the matching list is searched first, so a
    /// material and a labor task that share a name resolve independently.
    /// Falls back to the merged catalog.
    pub fn find_resource(&self, name: &str, preferred: Option<ResourceType>) -> Option<&Resource> {
        preferred
            .and_then(|ty| self.list(ty).iter().find(|r| r.name == name))
            .or_else(|| self.resources().find(|r| r.name == name))
    }

    /// Usage rules for a work item, in catalog order
    pub fn usage_rules_for<'a>(&'a self, main_item: &'a str, sub_item: &'a str) -> impl Iterator<Item = &'a UsageRule> + 'a {
        self.usage_rules
            .iter()
            .filter(move |rule| rule.matches(main_item, sub_item))
    }

    /// First non-blank unit recorded for the work item
    pub fn item_unit<'s>(&'s self, main_item: &str, sub_item: &str) -> Option<&'s str> {
        self.usage_rules
            .iter()
            .filter(|rule| rule.matches(main_item, sub_item))
            .filter_map(|rule| rule.unit.as_deref())
            .find(|unit| !unit.is_empty())
    }

    /// Distinct main items, priority items first then by normalized name
    pub fn main_items(&self) -> Vec<&str> {
        let mut items: Vec<&str> = Vec::new();
        for rule in &self.usage_rules {
            if !items.contains(&rule.main_item.as_str()) {
                items.push(&rule.main_item);
            }
        }

        let rank = |name: &str| {
            MAIN_ITEM_PRIORITY
                .iter()
                .position(|p| *p == name)
                .unwrap_or(usize::MAX)
        };
        items.sort_by_cached_key(|name| (rank(name), normalize_arabic(name), name.to_string()));
        items
    }

    /// Distinct sub items of a main item, in catalog order
    pub fn sub_items(&self, main_item: &str) -> Vec<&str> {
        let mut subs: Vec<&str> = Vec::new();
        for rule in self.usage_rules.iter().filter(|r| r.main_item == main_item) {
            if !subs.contains(&rule.sub_item.as_str()) {
                subs.push(&rule.sub_item);
            }
        }
        subs
    }

    /// Case-insensitive substring search over resource names
    pub fn search(&self, term: &str) -> Vec<&Resource> {
        let needle = term.trim().to_lowercase();
        self.resources()
            .filter(|r| r.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Resources of a named sector, in catalog order
    pub fn sector_resources(&self, sector: &Sector) -> Vec<&Resource> {
        self.list(sector.resource_type)
            .iter()
            .filter(|r| sector.members.contains(&r.name.as_str()))
            .collect()
    }
}
