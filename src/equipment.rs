//! Weapon and equipment identification.

/// Broad category of an [`EquipmentType`], derived from its numeric range.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EquipmentClass {
    Unknown,
    Pistol,
    Smg,
    Heavy,
    Rifle,
    Equipment,
    Grenade,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u16)]
pub enum EquipmentType {
    Unknown = 0,

    P2000 = 101,
    Glock = 102,
    P250 = 103,
    Deagle = 104,
    FiveSeven = 105,
    DualBerettas = 106,
    Tec9 = 107,
    Cz75 = 108,
    Usp = 109,
    Revolver = 110,

    Mp7 = 201,
    Mp9 = 202,
    Bizon = 203,
    Mac10 = 204,
    Ump = 205,
    P90 = 206,
    Mp5 = 207,

    SawedOff = 301,
    Nova = 302,
    Mag7 = 303,
    Xm1014 = 304,
    M249 = 305,
    Negev = 306,

    Galil = 401,
    Famas = 402,
    Ak47 = 403,
    M4A4 = 404,
    M4A1 = 405,
    Ssg08 = 406,
    Sg556 = 407,
    Aug = 408,
    Awp = 409,
    Scar20 = 410,
    G3sg1 = 411,

    Zeus = 501,
    Kevlar = 502,
    Helmet = 503,
    Bomb = 504,
    Knife = 505,
    DefuseKit = 506,
    World = 507,
    HealthShot = 508,

    Decoy = 601,
    Molotov = 602,
    Incendiary = 603,
    Flash = 604,
    Smoke = 605,
    HE = 606,
}

use EquipmentType::*;

/// Game-event weapon names (with any `weapon_` prefix already stripped).
static EQUIPMENT_NAMES: phf::Map<&'static str, EquipmentType> = phf::phf_map! {
    "hkp2000" => P2000,
    "usp_silencer" => Usp,
    "usp_silencer_off" => Usp,
    "glock" => Glock,
    "p250" => P250,
    "deagle" => Deagle,
    "fiveseven" => FiveSeven,
    "elite" => DualBerettas,
    "tec9" => Tec9,
    "cz75a" => Cz75,
    "revolver" => Revolver,

    "mp7" => Mp7,
    "mp9" => Mp9,
    "bizon" => Bizon,
    "mac10" => Mac10,
    "ump45" => Ump,
    "p90" => P90,
    "mp5sd" => Mp5,

    "sawedoff" => SawedOff,
    "nova" => Nova,
    "mag7" => Mag7,
    "xm1014" => Xm1014,
    "m249" => M249,
    "negev" => Negev,

    "galilar" => Galil,
    "famas" => Famas,
    "ak47" => Ak47,
    "m4a1" => M4A4,
    "m4a1_silencer" => M4A1,
    "m4a1_silencer_off" => M4A1,
    "ssg08" => Ssg08,
    "sg556" => Sg556,
    "aug" => Aug,
    "awp" => Awp,
    "scar20" => Scar20,
    "g3sg1" => G3sg1,

    "taser" => Zeus,
    "vest" => Kevlar,
    "vesthelm" => Helmet,
    "c4" => Bomb,
    "planted_c4" => Bomb,
    "knife" => Knife,
    "knife_t" => Knife,
    "bayonet" => Knife,
    "defuser" => DefuseKit,
    "world" => World,
    "worldspawn" => World,
    "healthshot" => HealthShot,

    "decoy" => Decoy,
    "molotov" => Molotov,
    "incgrenade" => Incendiary,
    "flashbang" => Flash,
    "smokegrenade" => Smoke,
    "hegrenade" => HE,
    "inferno" => Incendiary,
};

/// Model-precache substrings that identify grenade models.
pub static GRENADE_MODEL_SUBSTRINGS: phf::Map<&'static str, EquipmentType> = phf::phf_map! {
    "flashbang" => Flash,
    "fraggrenade" => HE,
    "smokegrenade" => Smoke,
    "molotov" => Molotov,
    "incendiarygrenade" => Incendiary,
    "decoy" => Decoy,
};

impl EquipmentType {
    /// Maps a game-event weapon name (`"weapon_ak47"`, `"ak47"`, ...) to the
    /// equipment type.
    pub fn from_name(name: &str) -> Self {
        let mut name = name.to_ascii_lowercase();
        if let Some(stripped) = name.strip_prefix("weapon_") {
            name = stripped.to_string();
        }
        if let Some(stripped) = name.strip_prefix("item_") {
            name = stripped.to_string();
        }
        if name.starts_with("knife") || name.starts_with("bayonet") {
            return Knife;
        }

        EQUIPMENT_NAMES.get(name.as_str()).copied().unwrap_or(Unknown)
    }

    /// Maps a networked entity class name (`"CAK47"`, `"CWeaponAWP"`,
    /// `"CSmokeGrenadeProjectile"`, ...) to the equipment type.
    pub fn from_entity_class(class_name: &str) -> Self {
        let mut name = class_name;
        for prefix in ["CWeapon", "C"] {
            if let Some(stripped) = name.strip_prefix(prefix) {
                name = stripped;
                break;
            }
        }
        for suffix in ["Projectile", "Grenade"] {
            if let Some(stripped) = name.strip_suffix(suffix) {
                name = stripped;
            }
        }

        match name {
            "AK47" => Ak47,
            "DEagle" => Deagle,
            "C4" => Bomb,
            "Flashbang" => Flash,
            "HE" | "HEGrenade" => HE,
            "Smoke" | "SmokeGrenade" => Smoke,
            "Molotov" => Molotov,
            "Incendiary" | "IncendiaryGrenade" => Incendiary,
            "Decoy" => Decoy,
            other => Self::from_name(other),
        }
    }

    pub fn class(&self) -> EquipmentClass {
        match (*self as u16) / 100 {
            1 => EquipmentClass::Pistol,
            2 => EquipmentClass::Smg,
            3 => EquipmentClass::Heavy,
            4 => EquipmentClass::Rifle,
            5 => EquipmentClass::Equipment,
            6 => EquipmentClass::Grenade,
            _ => EquipmentClass::Unknown,
        }
    }

    /// Molotovs and incendiaries are interchangeable in several game events.
    pub fn alternative(&self) -> EquipmentType {
        match self {
            Molotov => Incendiary,
            Incendiary => Molotov,
            _ => Unknown,
        }
    }

    pub fn is_grenade(&self) -> bool {
        self.class() == EquipmentClass::Grenade
    }
}

/// A concrete piece of equipment, possibly bound to an owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Equipment {
    pub equipment_type: EquipmentType,
    pub entity_id: Option<i32>,
    pub owner_user_id: Option<i32>,
}

impl Equipment {
    pub fn new(equipment_type: EquipmentType) -> Self {
        Self {
            equipment_type,
            entity_id: None,
            owner_user_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_event_names() {
        assert_eq!(Ak47, EquipmentType::from_name("ak47"));
        assert_eq!(Ak47, EquipmentType::from_name("weapon_ak47"));
        assert_eq!(Knife, EquipmentType::from_name("weapon_knife_butterfly"));
        assert_eq!(Unknown, EquipmentType::from_name("chicken"));
    }

    #[test]
    fn maps_entity_classes() {
        assert_eq!(Ak47, EquipmentType::from_entity_class("CAK47"));
        assert_eq!(Awp, EquipmentType::from_entity_class("CWeaponAWP"));
        assert_eq!(Flash, EquipmentType::from_entity_class("CFlashbangProjectile"));
        assert_eq!(Smoke, EquipmentType::from_entity_class("CSmokeGrenadeProjectile"));
        assert_eq!(Molotov, EquipmentType::from_entity_class("CMolotovProjectile"));
        assert_eq!(Bomb, EquipmentType::from_entity_class("CC4"));
    }

    #[test]
    fn classes_follow_numeric_ranges() {
        assert_eq!(EquipmentClass::Rifle, Ak47.class());
        assert_eq!(EquipmentClass::Grenade, Flash.class());
        assert_eq!(EquipmentClass::Equipment, Bomb.class());
        assert_eq!(EquipmentClass::Unknown, Unknown.class());
    }

    #[test]
    fn molotov_incendiary_alias() {
        assert_eq!(Incendiary, Molotov.alternative());
        assert_eq!(Molotov, Incendiary.alternative());
        assert_eq!(Unknown, Ak47.alternative());
    }
}
