//! Named groupings of catalog resources for price-list screens.
//!
//! A sector lists resource names; resources that are not in the loaded
//! catalog are simply absent from [`Catalog::sector_resources`](super::Catalog::sector_resources).

use serde::Serialize;

use super::ResourceType;

/// A titled group of resources of a single type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sector {
    pub title: &'static str,
    pub resource_type: ResourceType,
    pub members: &'static [&'static str],
}

impl Sector {
    /// Sectors of one type, in display order
    pub fn for_type(resource_type: ResourceType) -> impl Iterator<Item = &'static Sector> {
        SECTORS.iter().filter(move |s| s.resource_type == resource_type)
    }

    /// Look up a sector by title
    pub fn by_title(title: &str) -> Option<&'static Sector> {
        SECTORS.iter().find(|s| s.title == title)
    }
}

pub static SECTORS: &[Sector] = &[
    Sector {
        title: "خامات أساسية",
        resource_type: ResourceType::Material,
        members: &[
            "أسمنت أسود", "أسمنت أبيض", "رمل مونة", "رمل ردم", "مادة لاصقة",
            "طوب أحمر 20 10 5", "طوب طفلي 20 9 5", "طوب طفلي 24 11 6", "طوب مصمت دبل 24 11 11",
            "عتبة", "زوايا", "شبك",
        ],
    },
    Sector {
        title: "خامات بورسلين",
        resource_type: ResourceType::Material,
        members: &["بلاط HDF", "إكسسوارات"],
    },
    Sector {
        title: "خامات عزل",
        resource_type: ResourceType::Material,
        members: &["أديبوند", "ألواح ميمبرين", "برايمر", "سيكا 107", "فوم"],
    },
    Sector {
        title: "خامات نقاشة",
        resource_type: ResourceType::Material,
        members: &[
            "مشمع", "سيلر حراري", "سيلر مائي", "معجون أكريلك", "معجون دايتون",
            "صنفرة", "تيب", "كرتون", "بلاستيك 7070", "دهانات بلاستيك",
        ],
    },
    Sector {
        title: "خامات كهرباء",
        resource_type: ResourceType::Material,
        members: &[
            "انتركم", "بريزة دفاية", "بريزة عادية", "بريزة قوي", "بواط",
            "تكييف", "تلفاز", "تليفون", "ثرموستات تكييف", "جاكوزي",
            "جرس أو شفاط", "داتا", "دفياتير 3 طرف", "دفياتير 4 طرف",
            "سخان", "سخان فوري", "شيش حصيرة", "صواعد 16 مل", "صواعد تليفون",
            "صواعد دش", "صواعد نت", "لوحة 12 خط", "لوحة 18 خط", "لوحة 24 خط",
            "لوحة 36 خط", "لوحة 48 خط", "مخرج إضاءة", "مخرج إضاءة درج", "مخرج سماعة",
        ],
    },
    Sector {
        title: "خامات سباكة",
        resource_type: ResourceType::Material,
        members: &[
            "بارد", "بيبة 15 سم", "بيبة 30 سم", "بيبة 65 سم", "تأسيس خزان",
            "تأسيس غلاية", "تأسيس موتور", "جيت شاور", "جيت شاور دفن",
            "خزان دفن", "خلاط دفن 1 مخرج", "خلاط دفن 2 مخرج", "خلاط دفن 3 مخرج",
            "ساخن بارد", "صرف تكييف", "محبس دفن",
        ],
    },
    Sector {
        title: "مصنعيات مدنية",
        resource_type: ResourceType::Workmanship,
        members: &[
            "مصنعية طوب طفلي 20 9 5", "مصنعية طوب طفلي 24 11 6", "مصنعية طوب مصمت دبل 24 11 11",
            "مصنعية طوب أحمر 20 10 5", "مصنعية نحاتة", "مصنعية بياض",
        ],
    },
    Sector {
        title: "مصنعية تأسيس تكييف",
        resource_type: ResourceType::Workmanship,
        members: &["مصنعية 1.5/2.25 HP", "مصنعية 3/4 HP", "مصنعية 5 HP", "مصنعية صاج"],
    },
    Sector {
        title: "مصنعية عزل",
        resource_type: ResourceType::Workmanship,
        members: &["مصنعية أنسومات", "مصنعية سيكا 107", "مصنعية حراري"],
    },
    Sector {
        title: "مصنعية بورسلين",
        resource_type: ResourceType::Workmanship,
        members: &["مصنعية بورسلين 120*60", "مصنعية HDF", "مصنعية وزر"],
    },
    Sector {
        title: "مصنعية جبسوم بورد",
        resource_type: ResourceType::Workmanship,
        members: &[
            "مصنعية أبيض مسطح", "مصنعية أخضر مسطح", "مصنعية أبيض طولي", "مصنعية أخضر طولي",
            "مصنعية تجاليد أبيض", "مصنعية تجاليد أخضر", "مصنعية قواطيع أبيض", "مصنعية قواطيع أخضر",
            "مصنعية بيوت ستائر و نور", "مصنعية تراك ماجنتك",
        ],
    },
    Sector {
        title: "مصنعية نقاشة",
        resource_type: ResourceType::Workmanship,
        members: &[
            "مصنعية تأسيس نقاشة حوائط", "مصنعية تأسيس نقاشة أسقف", "مصنعية تشطيب نقاشة",
        ],
    },
    Sector {
        title: "مصنعية كهرباء",
        resource_type: ResourceType::Workmanship,
        members: &[
            "مصنعية مخرج إضاءة", "مصنعية مخرج إضاءة درج", "مصنعية دفياتير 3 طرف", "مصنعية دفياتير 4 طرف",
            "مصنعية مخرج سماعة", "مصنعية جرس أو شفاط", "مصنعية بريزة عادية", "مصنعية بريزة قوي",
            "مصنعية بريزة دفاية", "مصنعية جاكوزي", "مصنعية سخان", "مصنعية سخان فوري", "مصنعية تكييف",
            "مصنعية تليفون", "مصنعية تلفاز", "مصنعية داتا", "مصنعية شيش حصيرة", "مصنعية ثرموستات تكييف",
            "مصنعية انتركم", "مصنعية لوحة 12 خط", "مصنعية لوحة 18 خط", "مصنعية لوحة 24 خط",
            "مصنعية لوحة 36 خط", "مصنعية لوحة 48 خط", "مصنعية صواعد 16 مل", "مصنعية صواعد نت",
            "مصنعية صواعد تليفون", "مصنعية صواعد دش",
        ],
    },
    Sector {
        title: "مصنعية سباكة",
        resource_type: ResourceType::Workmanship,
        members: &[
            "مصنعية ساخن بارد", "مصنعية بارد", "مصنعية بيبة 15 سم", "مصنعية بيبة 30 سم", "مصنعية بيبة 65 سم",
            "مصنعية خزان دفن", "مصنعية خلاط دفن 1 مخرج", "مصنعية خلاط دفن 2 مخرج", "مصنعية خلاط دفن 3 مخرج",
            "مصنعية جيت شاور", "مصنعية جيت شاور دفن", "مصنعية صرف تكييف", "مصنعية محبس دفن",
            "مصنعية تأسيس موتور", "مصنعية تأسيس غلاية", "مصنعية تأسيس خزان",
        ],
    },
    Sector {
        title: "معدات",
        resource_type: ResourceType::Labor,
        members: &["عربية رتش", "هيلتي"],
    },
    Sector {
        title: "عمالة",
        resource_type: ResourceType::Labor,
        members: &[
            "نظافة", "تشوين", "تشوين رمل", "تشوين أسمنت", "تشوين طوب",
            "تنزيل رتش", "تشوين بورسلين", "تشوين مادة لاصقة", "لياسة",
        ],
    },
];
