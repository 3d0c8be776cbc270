use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Column-name maps and ingestion knobs. Immutable once constructed; every
/// field carries the registries' canonical name as its default, so an empty
/// TOML file (or no file at all) is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReconConfig {
    #[serde(default)]
    pub facility: FacilityColumns,
    #[serde(default)]
    pub provider: ProviderColumns,
    #[serde(default)]
    pub ingest: IngestConfig,
}

// ---------------------------------------------------------------------------
// Column maps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FacilityColumns {
    pub name: String,
    pub license: String,
    pub expiration: String,
    pub beds: String,
}

impl Default for FacilityColumns {
    fn default() -> Self {
        Self {
            name: "Name".into(),
            license: "License Number".into(),
            expiration: "License Expiration Date".into(),
            beds: "Licensed Beds".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderColumns {
    pub name: String,
    pub license: String,
    pub expiration: String,
    pub business_entity: String,
    pub bed_count: String,
    pub provider_id: String,
    pub fb_number: String,
    pub category: String,
}

impl Default for ProviderColumns {
    fn default() -> Self {
        Self {
            name: "NAME".into(),
            license: "LICENSE_NB".into(),
            expiration: "EXPIRATION_DATE".into(),
            business_entity: "BUSINESS_ENTITY_NAME".into(),
            bed_count: "FACILITY_BED_COUNT".into(),
            provider_id: "PROVIDER_ID".into(),
            fb_number: "FB_NUMBER".into(),
            category: "PROVIDER_CATEGORY_CD".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Loader-side knobs. The engine itself never reads these; the CLI passes
/// them to the file loaders.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Worksheet holding provider rows when the provider input is a workbook.
    pub provider_sheet: String,
    /// Column the specialty filter tests.
    pub specialty_column: String,
    /// Keep only provider rows whose specialty is listed. Empty = keep all.
    pub specialties: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            provider_sheet: "PROV".into(),
            specialty_column: "SPECIALTY_DE".into(),
            specialties: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let required = [
            ("facility.name", &self.facility.name),
            ("facility.license", &self.facility.license),
            ("facility.expiration", &self.facility.expiration),
            ("facility.beds", &self.facility.beds),
            ("provider.name", &self.provider.name),
            ("provider.license", &self.provider.license),
            ("provider.expiration", &self.provider.expiration),
            ("provider.business_entity", &self.provider.business_entity),
            ("provider.bed_count", &self.provider.bed_count),
            ("provider.provider_id", &self.provider.provider_id),
            ("provider.fb_number", &self.provider.fb_number),
            ("provider.category", &self.provider.category),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "{field} column name must not be blank"
                )));
            }
        }

        if self.ingest.provider_sheet.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "ingest.provider_sheet must not be blank".into(),
            ));
        }
        if !self.ingest.specialties.is_empty() && self.ingest.specialty_column.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "ingest.specialty_column must not be blank when specialties are set".into(),
            ));
        }

        Ok(())
    }

    /// Column names both registries must carry for a run to proceed.
    pub fn facility_required(&self) -> [&str; 4] {
        [
            &self.facility.name,
            &self.facility.license,
            &self.facility.expiration,
            &self.facility.beds,
        ]
    }

    pub fn provider_required(&self) -> [&str; 5] {
        [
            &self.provider.name,
            &self.provider.license,
            &self.provider.expiration,
            &self.provider.business_entity,
            &self.provider.bed_count,
        ]
    }

    /// Identifier columns carried only into the bed-change tables. Optional:
    /// their absence empties the bed tables, never the run.
    pub fn provider_passthrough(&self) -> [&str; 3] {
        [
            &self.provider.provider_id,
            &self.provider.fb_number,
            &self.provider.category,
        ]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
