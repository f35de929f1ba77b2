//! Reference data loaded once at startup: the pathway catalog and the router spec.
//!
//! Both documents are YAML. The crate bundles a default copy of each under `data/`; deployments
//! can point at their own files through [`crate::config::RouterSourceConfig`].

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{Priority, Source, Status};

const BUNDLED_CATALOG: &str = include_str!("../data/sources.yaml");
const BUNDLED_ROUTER_SPEC: &str = include_str!("../data/master_router.yaml");

/// Reference record describing one clinical pathway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathwayCatalogEntry {
    pub id: String,
    pub title: String,
    pub publisher: String,
    pub url: String,
}

impl PathwayCatalogEntry {
    pub fn source(&self) -> Source {
        if self.publisher.eq_ignore_ascii_case("chop") {
            Source::Chop
        } else {
            Source::NonChop
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDocument {
    #[serde(default)]
    pathways: Vec<PathwayCatalogEntry>,
}

/// Immutable, id-keyed view over the catalog entries in their declared order.
#[derive(Debug, Clone)]
pub struct PathwayCatalog {
    entries: Vec<PathwayCatalogEntry>,
    index: HashMap<String, usize>,
}

impl PathwayCatalog {
    pub fn new(entries: Vec<PathwayCatalogEntry>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if index.insert(entry.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicatePathway(entry.id.clone()));
            }
        }
        Ok(Self { entries, index })
    }

    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUNDLED_CATALOG, Path::new("bundled:sources.yaml"))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = read_document(path)?;
        Self::from_yaml_str(&raw, path)
    }

    pub fn from_yaml_str(raw: &str, origin: &Path) -> Result<Self, CatalogError> {
        let document: CatalogDocument =
            serde_yaml::from_str(raw).map_err(|source| CatalogError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;
        Self::new(document.pathways)
    }

    pub fn get(&self, id: &str) -> Option<&PathwayCatalogEntry> {
        self.index.get(id).map(|&position| &self.entries[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn entries(&self) -> &[PathwayCatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgeCutoffs {
    pub infant_days_max: u32,
    pub kawasaki_min_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InfantTargets {
    pub ill_appearing: String,
    pub well_appearing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InfantSplit {
    pub targets: InfantTargets,
}

/// Ordering applied to the final activation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SortOrder {
    #[serde(default = "default_priority_order")]
    pub priority: Vec<Priority>,
    #[serde(default = "default_status_order")]
    pub status: Vec<Status>,
    #[serde(default = "default_chop_first")]
    pub chop_first: bool,
}

impl SortOrder {
    /// Position in the configured order; values missing from it sort last.
    pub fn priority_rank(&self, priority: Priority) -> usize {
        self.priority
            .iter()
            .position(|candidate| *candidate == priority)
            .unwrap_or(self.priority.len())
    }

    pub fn status_rank(&self, status: Status) -> usize {
        self.status
            .iter()
            .position(|candidate| *candidate == status)
            .unwrap_or(self.status.len())
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            priority: default_priority_order(),
            status: default_status_order(),
            chop_first: default_chop_first(),
        }
    }
}

fn default_priority_order() -> Vec<Priority> {
    Priority::ALL.to_vec()
}

fn default_status_order() -> Vec<Status> {
    Status::ALL.to_vec()
}

fn default_chop_first() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CriticalOverrides {
    #[serde(default)]
    pub forced_critical_pathways: BTreeSet<String>,
}

/// Defaults applied to partially filled UTICalc inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UticalcDefaults {
    /// Used when a UTICalc block omits `other_source`.
    #[serde(default = "default_other_source")]
    pub other_source_default: bool,
}

impl Default for UticalcDefaults {
    fn default() -> Self {
        Self {
            other_source_default: default_other_source(),
        }
    }
}

fn default_other_source() -> bool {
    true
}

/// Router configuration: age cutoffs, infant targets, sort order, and critical overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterSpec {
    pub age_cutoffs: AgeCutoffs,
    pub infant_split: InfantSplit,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub critical_overrides: CriticalOverrides,
    #[serde(default)]
    pub uticalc: UticalcDefaults,
}

impl RouterSpec {
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUNDLED_ROUTER_SPEC, Path::new("bundled:master_router.yaml"))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = read_document(path)?;
        Self::from_yaml_str(&raw, path)
    }

    pub fn from_yaml_str(raw: &str, origin: &Path) -> Result<Self, CatalogError> {
        serde_yaml::from_str(raw).map_err(|source| CatalogError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }
}

fn read_document(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// One inconsistency between the catalog and the router spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.message)
    }
}

/// Cross-check the router spec and rule references against the catalog.
///
/// `rule_refs` pairs each rule id with the pathway ids it may register.
pub fn validate(
    catalog: &PathwayCatalog,
    spec: &RouterSpec,
    rule_refs: &[(&str, &[&str])],
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut require = |context: String, id: &str| {
        if !catalog.contains(id) {
            issues.push(ValidationIssue {
                context,
                message: format!("references unknown pathway id '{id}'"),
            });
        }
    };

    let targets = &spec.infant_split.targets;
    require("infant_split.targets.ill_appearing".into(), &targets.ill_appearing);
    require("infant_split.targets.well_appearing".into(), &targets.well_appearing);
    for id in &spec.critical_overrides.forced_critical_pathways {
        require("critical_overrides.forced_critical_pathways".into(), id);
    }
    for (rule_id, pathways) in rule_refs {
        for id in pathways.iter() {
            require(format!("rule {rule_id}"), id);
        }
    }

    check_order(&mut issues, "sort_order.priority", &spec.sort_order.priority, &Priority::ALL);
    check_order(&mut issues, "sort_order.status", &spec.sort_order.status, &Status::ALL);

    issues
}

fn check_order<T: Copy + Ord + fmt::Debug>(
    issues: &mut Vec<ValidationIssue>,
    context: &str,
    configured: &[T],
    expected: &[T],
) {
    let unique: BTreeSet<T> = configured.iter().copied().collect();
    if unique.len() != configured.len() {
        issues.push(ValidationIssue {
            context: context.to_string(),
            message: "contains duplicate values".to_string(),
        });
    }
    for value in expected {
        if !unique.contains(value) {
            issues.push(ValidationIssue {
                context: context.to_string(),
                message: format!("missing {value:?}"),
            });
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("duplicate pathway id in catalog: {0}")]
    DuplicatePathway(String),
    #[error("router configuration is inconsistent: {}", join_issues(.0))]
    Inconsistent(Vec<ValidationIssue>),
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
