use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Descriptor for one domain module.
///
/// Loaded once at startup from static configuration and read-only
/// thereafter. `name` is the lowercase identifier every file path and
/// generated symbol is derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub name: String,

    /// File name of a pre-existing service implementation under the legacy
    /// services directory. Absent means no migration step for this module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_source: Option<String>,

    /// Whether paginated-listing artifacts (edge/connection shapes) are
    /// generated for this module.
    #[serde(default)]
    pub supports_paged_connection: bool,

    /// Field names, documentation only; not further interpreted.
    #[serde(default)]
    pub fields: Vec<String>,
}

impl ModuleSpec {
    /// Symbol prefix derived from the module name (`customer` -> `Customer`).
    pub fn capitalized(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Validation errors for the module registry.
///
/// All of these are fatal and surface before any file I/O happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("module name must not be empty")]
    EmptyName,

    #[error("module name '{0}' must be lowercase")]
    NotLowercase(String),

    #[error("duplicate module name '{0}'")]
    DuplicateName(String),
}

/// Validated, read-only table of module descriptors.
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    modules: Vec<ModuleSpec>,
}

impl ModuleRegistry {
    /// Validate and freeze a set of module specs.
    pub fn new(modules: Vec<ModuleSpec>) -> Result<Self, ConfigError> {
        let mut seen = std::collections::BTreeSet::new();
        for spec in &modules {
            if spec.name.is_empty() {
                return Err(ConfigError::EmptyName);
            }
            if spec.name.chars().any(|c| c.is_ascii_uppercase()) {
                return Err(ConfigError::NotLowercase(spec.name.clone()));
            }
            if !seen.insert(spec.name.clone()) {
                return Err(ConfigError::DuplicateName(spec.name.clone()));
            }
        }
        Ok(Self { modules })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleSpec> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ModuleSpec> {
        self.modules.iter().find(|m| m.name == name)
    }
}

/// The stock registry: the six domain modules the backend migration covers.
pub fn default_modules() -> Vec<ModuleSpec> {
    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    vec![
        ModuleSpec {
            name: "solution".to_string(),
            legacy_source: Some("SolutionService.ts".to_string()),
            supports_paged_connection: true,
            fields: fields(&[
                "name",
                "description",
                "customAttrs",
                "products",
                "tasks",
                "completionPercentage",
                "customers",
                "licenses",
                "releases",
                "outcomes",
                "tags",
            ]),
        },
        ModuleSpec {
            name: "customer".to_string(),
            legacy_source: Some("CustomerService.ts".to_string()),
            supports_paged_connection: false,
            fields: fields(&[
                "name",
                "description",
                "customAttrs",
                "createdAt",
                "updatedAt",
                "products",
                "solutions",
            ]),
        },
        ModuleSpec {
            name: "license".to_string(),
            legacy_source: None,
            supports_paged_connection: false,
            fields: fields(&[
                "name",
                "description",
                "level",
                "isActive",
                "product",
                "productId",
                "solution",
                "solutionId",
                "customAttrs",
            ]),
        },
        ModuleSpec {
            name: "release".to_string(),
            legacy_source: None,
            supports_paged_connection: false,
            fields: fields(&[
                "name",
                "description",
                "level",
                "isActive",
                "product",
                "productId",
                "tasks",
                "inheritedTasks",
                "customAttrs",
            ]),
        },
        ModuleSpec {
            name: "outcome".to_string(),
            legacy_source: None,
            supports_paged_connection: false,
            fields: fields(&[
                "name",
                "description",
                "product",
                "solution",
                "productId",
                "solutionId",
            ]),
        },
        ModuleSpec {
            name: "task".to_string(),
            legacy_source: None,
            supports_paged_connection: true,
            fields: fields(&[
                "name",
                "description",
                "estMinutes",
                "notes",
                "weight",
                "sequenceNumber",
                "licenseLevel",
                "howToDoc",
                "howToVideo",
                "product",
                "solution",
                "outcomes",
                "license",
                "releases",
                "availableInReleases",
                "telemetryAttributes",
                "isCompleteBasedOnTelemetry",
                "telemetryCompletionPercentage",
                "deletedAt",
                "tags",
                "solutionTags",
            ]),
        },
    ]
}
