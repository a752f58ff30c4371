// Party stance table
//
// The fixed set of real parties the user is compared against. Loaded once at
// startup (built-in or from a file) and read-only afterwards.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::stance::Stance;

/// Stance assumed for any category a party does not list
pub const DEFAULT_PARTY_STANCE: Stance = Stance::Neutral;

/// A real political party and its per-category stances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealParty {
    pub id: String,
    pub name: String,
    /// Display colour, e.g. "#E3000F"
    pub color: String,
    /// Category -> stance. Missing categories are neutral.
    #[serde(default)]
    pub stances: HashMap<String, Stance>,
}

impl RealParty {
    /// Stance on `category`, falling back to [`DEFAULT_PARTY_STANCE`]
    pub fn stance_on(&self, category: &str) -> Stance {
        self.stances
            .get(category)
            .copied()
            .unwrap_or(DEFAULT_PARTY_STANCE)
    }
}

/// Ordered party table. Order is significant: it breaks score ties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyStanceTable {
    parties: Vec<RealParty>,
}

static BUILTIN: Lazy<PartyStanceTable> = Lazy::new(swedish_parties);

impl PartyStanceTable {
    pub fn new(parties: Vec<RealParty>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for party in &parties {
            if !seen.insert(party.id.as_str()) {
                bail!("Duplicate party id '{}' in stance table", party.id);
            }
        }
        Ok(Self { parties })
    }

    /// The built-in Swedish Riksdag table
    pub fn builtin() -> &'static PartyStanceTable {
        &BUILTIN
    }

    /// Load a table from a TOML or JSON file (picked by extension).
    ///
    /// TOML layout:
    /// ```toml
    /// [[parties]]
    /// id = "s"
    /// name = "Socialdemokraterna"
    /// color = "#E3000F"
    /// stances = { Environment = "support", Defense = "support" }
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read party table from {}", path.display()))?;

        let table: PartyStanceTable = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse party table JSON {}", path.display()))?,
            _ => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse party table TOML {}", path.display()))?,
        };

        if table.parties.is_empty() {
            bail!("Party table {} lists no parties", path.display());
        }

        Self::new(table.parties)
    }

    /// The table at `path` if one is configured, otherwise the built-in one
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let table = Self::load(path)?;
                tracing::info!(path = %path.display(), parties = table.len(), "Loaded party table");
                Ok(table)
            }
            None => Ok(Self::builtin().clone()),
        }
    }

    pub fn parties(&self) -> &[RealParty] {
        &self.parties
    }

    pub fn get(&self, id: &str) -> Option<&RealParty> {
        self.parties.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }
}

fn party(id: &str, name: &str, color: &str, stances: &[(&str, Stance)]) -> RealParty {
    RealParty {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        stances: stances
            .iter()
            .map(|(category, stance)| (category.to_string(), *stance))
            .collect(),
    }
}

fn swedish_parties() -> PartyStanceTable {
    use Stance::*;

    PartyStanceTable {
        parties: vec![
            party(
                "s",
                "Socialdemokraterna",
                "#E3000F",
                &[
                    ("Environment", Support),
                    ("Education", Support),
                    ("Healthcare", Support),
                    ("Defense", Support),
                    ("Infrastructure", Support),
                ],
            ),
            party(
                "m",
                "Moderaterna",
                "#52BDEC",
                &[
                    ("Environment", Neutral),
                    ("Education", Support),
                    ("Healthcare", Support), // private provision
                    ("Defense", Support),
                    ("Infrastructure", Support),
                ],
            ),
            party(
                "sd",
                "Sverigedemokraterna",
                "#DDDD00",
                &[
                    ("Environment", Oppose),
                    ("Education", Neutral),
                    ("Healthcare", Support),
                    ("Defense", Support),
                    ("Infrastructure", Neutral),
                ],
            ),
            party(
                "mp",
                "Miljöpartiet",
                "#53A045",
                &[
                    ("Environment", Support),
                    ("Education", Support),
                    ("Healthcare", Support),
                    ("Defense", Oppose),
                    ("Infrastructure", Support), // rail
                ],
            ),
            party(
                "v",
                "Vänsterpartiet",
                "#DA291C",
                &[
                    ("Environment", Support),
                    ("Education", Support),
                    ("Healthcare", Support), // public provision
                    ("Defense", Oppose),
                    ("Infrastructure", Support),
                ],
            ),
        ],
    }
}
