//! Categorical vocabularies of the mortality records.
//! Sex encoding, age buckets and the homicide classification.

use serde::Serialize;
use std::fmt;

/// Filter sentinel meaning "no restriction".
pub const ALL_VALUE: &str = "ALL";

/// Manner of death that qualifies a record as a homicide.
pub const HOMICIDE_MANNER: &str = "HOMICIDIO";

/// ICD-10 code family counted as homicide (assault by firearm discharge).
pub const HOMICIDE_CODE_PREFIX: &str = "X95";

/// Normalized sex of the deceased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    /// Map the raw `SEXO` code; anything other than 1 or 2 is unknown.
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            Some(1) => Sex::Male,
            Some(2) => Sex::Female,
            _ => Sex::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "Masculino",
            Sex::Female => "Femenino",
            Sex::Unknown => "Sin información",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordinal age bucket derived from the DANE `GRUPO_EDAD1` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AgeCategory {
    Neonatal,
    Infant,
    EarlyChildhood,
    Childhood,
    Adolescence,
    Youth,
    EarlyAdulthood,
    MiddleAdulthood,
    OldAge,
    Longevity,
    Unknown,
}

impl AgeCategory {
    /// Display order of the histogram.
    pub const ORDER: [AgeCategory; 11] = [
        AgeCategory::Neonatal,
        AgeCategory::Infant,
        AgeCategory::EarlyChildhood,
        AgeCategory::Childhood,
        AgeCategory::Adolescence,
        AgeCategory::Youth,
        AgeCategory::EarlyAdulthood,
        AgeCategory::MiddleAdulthood,
        AgeCategory::OldAge,
        AgeCategory::Longevity,
        AgeCategory::Unknown,
    ];

    /// Bucket a raw age-group code. Total: every input maps to one bucket.
    pub fn from_group_code(code: Option<i32>) -> Self {
        match code {
            Some(0..=4) => AgeCategory::Neonatal,
            Some(5..=6) => AgeCategory::Infant,
            Some(7..=8) => AgeCategory::EarlyChildhood,
            Some(9..=10) => AgeCategory::Childhood,
            Some(11) => AgeCategory::Adolescence,
            Some(12..=13) => AgeCategory::Youth,
            Some(14..=16) => AgeCategory::EarlyAdulthood,
            Some(17..=19) => AgeCategory::MiddleAdulthood,
            Some(20..=24) => AgeCategory::OldAge,
            Some(25..=28) => AgeCategory::Longevity,
            _ => AgeCategory::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeCategory::Neonatal => "Mortalidad neonatal",
            AgeCategory::Infant => "Mortalidad infantil",
            AgeCategory::EarlyChildhood => "Primera infancia",
            AgeCategory::Childhood => "Niñez",
            AgeCategory::Adolescence => "Adolescencia",
            AgeCategory::Youth => "Juventud",
            AgeCategory::EarlyAdulthood => "Adultez temprana",
            AgeCategory::MiddleAdulthood => "Adultez intermedia",
            AgeCategory::OldAge => "Vejez",
            AgeCategory::Longevity => "Longevidad / Centenarios",
            AgeCategory::Unknown => "Edad desconocida",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|cat| cat.label() == label)
    }

    /// Position in [`AgeCategory::ORDER`].
    pub fn rank(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Homicide = manner of death HOMICIDIO intersected with the X95 code family.
pub fn is_homicide(manner: Option<&str>, cause_code: Option<&str>) -> bool {
    let manner_matches = manner
        .map(|m| m.trim().eq_ignore_ascii_case(HOMICIDE_MANNER))
        .unwrap_or(false);
    let code_matches = cause_code
        .map(|c| c.trim().to_uppercase().starts_with(HOMICIDE_CODE_PREFIX))
        .unwrap_or(false);
    manner_matches && code_matches
}
