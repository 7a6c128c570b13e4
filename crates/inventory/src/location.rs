//! Storage locations.

use serde::{Deserialize, Serialize};

use freshguard_core::{DomainError, DomainResult, Entity, LocationId};

/// Coldest/warmest target temperatures accepted, in °C.
pub const MIN_TARGET_TEMP_C: i16 = -60;
pub const MAX_TARGET_TEMP_C: i16 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Refrigerated,
    Frozen,
    AmbientPantry,
}

impl LocationKind {
    pub const ALL: [LocationKind; 3] = [
        LocationKind::Refrigerated,
        LocationKind::Frozen,
        LocationKind::AmbientPantry,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LocationKind::Refrigerated => "Fridge",
            LocationKind::Frozen => "Freezer",
            LocationKind::AmbientPantry => "Pantry",
        }
    }

    /// Shelf-life window (days) used for batch progress when none is given.
    pub fn default_window_days(self) -> i32 {
        match self {
            LocationKind::Refrigerated => 7,
            LocationKind::Frozen => 90,
            LocationKind::AmbientPantry => 30,
        }
    }
}

impl core::fmt::Display for LocationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Parses display labels ("Fridge") case-insensitively.
impl core::str::FromStr for LocationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LocationKind::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::invalid_field(format!("unknown location kind: {wanted:?}")))
    }
}

/// Fields accepted when adding a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLocation {
    pub name: String,
    pub kind: LocationKind,
    pub target_temp_c: Option<i16>,
}

impl NewLocation {
    pub fn new(name: impl Into<String>, kind: LocationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            target_temp_c: None,
        }
    }

    pub fn with_target_temp(mut self, celsius: i16) -> Self {
        self.target_temp_c = Some(celsius);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    id: LocationId,
    name: String,
    kind: LocationKind,
    target_temp_c: Option<i16>,
}

impl Location {
    /// Validate and build. Empty names are rejected; temperatures are clamped.
    pub fn create(id: LocationId, fields: &NewLocation) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: validated_name(&fields.name)?,
            kind: fields.kind,
            target_temp_c: fields.target_temp_c.map(clamp_temp),
        })
    }

    pub fn id_typed(&self) -> LocationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> LocationKind {
        self.kind
    }

    pub fn target_temp_c(&self) -> Option<i16> {
        self.target_temp_c
    }

    /// Signed temperature label, e.g. "+4°C" or "-18°C".
    pub fn temperature_label(&self) -> Option<String> {
        self.target_temp_c.map(|t| format!("{t:+}°C"))
    }

    /// Copy with a new name and/or target temperature.
    pub(crate) fn edited(
        &self,
        name: Option<&str>,
        target_temp_c: Option<Option<i16>>,
    ) -> DomainResult<Self> {
        let mut next = self.clone();
        if let Some(name) = name {
            next.name = validated_name(name)?;
        }
        if let Some(temp) = target_temp_c {
            next.target_temp_c = temp.map(clamp_temp);
        }
        Ok(next)
    }
}

impl Entity for Location {
    type Id = LocationId;
    const KIND: &'static str = "location";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

pub(crate) fn validated_name(name: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_field("name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn clamp_temp(celsius: i16) -> i16 {
    celsius.clamp(MIN_TARGET_TEMP_C, MAX_TARGET_TEMP_C)
}
