//! Shared fixtures for unit tests.

use crate::catalog::{Catalog, Resource, ResourceType, UsageRule};

pub const MASONRY: &str = "المباني";
pub const BRICK_WALL: &str = "طوب أحمر 20 10 5";
pub const INSULATION: &str = "العزل";
pub const BATHROOM_SIKA: &str = "سيكا 107 للحمامات";
pub const PORCELAIN: &str = "بورسلين";
pub const HDF_FLOOR: &str = "بلاط HDF";

/// A small catalog covering every resource type.
///
/// | work item                  | resource            | rate  | unit cost |
/// |----------------------------|---------------------|-------|-----------|
/// | المباني / طوب أحمر 20 10 5  | أسمنت أسود          | 0.25  | 300       |
/// |                            | رمل مونة            | 0.03  | 600       |
/// |                            | طوب أحمر 20 10 5    | 60    | 2.5       |
/// |                            | مصنعية طوب أحمر     | 1     | 120       |
/// |                            | تشوين أسمنت         | 0.25  | 10        |
/// | العزل / سيكا 107 للحمامات   | سيكا 107            | 0.2   | 1000      |
/// |                            | مصنعية سيكا 107     | 1     | 50        |
/// |                            | نظافة               | 1     | 5         |
/// | بورسلين / بلاط HDF          | بلاط HDF            | 1.05  | 400       |
pub fn sample_catalog() -> Catalog {
    let materials = vec![
        Resource::new("أسمنت أسود", "شيكارة", 300.0, ResourceType::Material).with_alt_unit("طن"),
        Resource::new("رمل مونة", "م3", 600.0, ResourceType::Material).with_alt_unit("نقلة"),
        Resource::new(BRICK_WALL, "طوبة", 2.5, ResourceType::Material).with_alt_unit("1000 طوبة"),
        Resource::new("سيكا 107", "شيكارة", 1000.0, ResourceType::Material),
        Resource::new(HDF_FLOOR, "م2", 400.0, ResourceType::Material),
    ];
    let workmanship = vec![
        Resource::new("مصنعية طوب أحمر 20 10 5", "م2", 120.0, ResourceType::Workmanship),
        Resource::new("مصنعية سيكا 107", "م2", 50.0, ResourceType::Workmanship),
    ];
    let labor = vec![
        Resource::new("تشوين أسمنت", "شيكارة", 10.0, ResourceType::Labor),
        Resource::new("تشوين رمل", "م3", 50.0, ResourceType::Labor),
        Resource::new("نظافة", "م2", 5.0, ResourceType::Labor),
    ];

    let rules = vec![
        UsageRule::new(MASONRY, BRICK_WALL, "أسمنت أسود", ResourceType::Material, 0.25).with_unit("م2"),
        UsageRule::new(MASONRY, BRICK_WALL, "رمل مونة", ResourceType::Material, 0.03).with_unit("م2"),
        UsageRule::new(MASONRY, BRICK_WALL, BRICK_WALL, ResourceType::Material, 60.0).with_unit("م2"),
        UsageRule::new(MASONRY, BRICK_WALL, "مصنعية طوب أحمر 20 10 5", ResourceType::Workmanship, 1.0)
            .with_unit("م2"),
        UsageRule::new(MASONRY, BRICK_WALL, "تشوين أسمنت", ResourceType::Labor, 0.25).with_unit("م2"),
        UsageRule::new(INSULATION, BATHROOM_SIKA, "سيكا 107", ResourceType::Material, 0.2).with_unit("م2"),
        UsageRule::new(INSULATION, BATHROOM_SIKA, "مصنعية سيكا 107", ResourceType::Workmanship, 1.0)
            .with_unit("م2"),
        UsageRule::new(INSULATION, BATHROOM_SIKA, "نظافة", ResourceType::Labor, 1.0).with_unit("م2"),
        UsageRule::new(PORCELAIN, HDF_FLOOR, HDF_FLOOR, ResourceType::Material, 1.05).with_unit("م2"),
        UsageRule::new("أعمال متنوعة", "بند ناقص", "غير موجود", ResourceType::Material, 1.0),
    ];

    Catalog::new(materials, workmanship, labor, rules)
}
