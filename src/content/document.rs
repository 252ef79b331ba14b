//! Content document types
//!
//! Field names follow the camelCase document shape. Spanish keys from
//! existing election `content.json` files are accepted as aliases.

use super::texts::Texts;
use crate::menu::{KeyboardLayout, MenuEntry};
use serde::{Deserialize, Serialize};

/// Root of the static content file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    /// Selectable entities (careers, or faculties in the faculty-first layout)
    #[serde(alias = "carreras", alias = "faculties", alias = "facultades")]
    pub careers: Vec<Entity>,
    #[serde(default, alias = "process_dates", alias = "fechas_proceso")]
    pub process_dates: ProcessDates,
    #[serde(default, alias = "voting_rules", alias = "reglas")]
    pub voting_rules: VotingRules,
    #[serde(default, alias = "inquiry_link", alias = "consultas_link")]
    pub inquiry_link: Option<String>,
    /// Fallback proposals link for ballots that carry none of their own
    #[serde(
        default,
        alias = "proposals_url",
        alias = "propuestas_plataforma_url"
    )]
    pub proposals_url: Option<String>,
    #[serde(default)]
    pub menu: MenuSettings,
    #[serde(default)]
    pub texts: Texts,
}

/// A career or faculty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "planillas")]
    pub ballots: Vec<Ballot>,
    #[serde(default, alias = "candidatos")]
    pub candidates: Vec<Candidate>,
    #[serde(default, alias = "proposals_url", alias = "propuestas_url")]
    pub proposals_url: Option<String>,
    /// Careers grouped under a faculty. Navigation is one level deep, so
    /// the store refuses documents that fill this in.
    #[serde(default, alias = "carreras", skip_serializing_if = "Vec::is_empty")]
    pub careers: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(
        default,
        alias = "image_ref",
        alias = "imageUrl",
        alias = "imagen_url"
    )]
    pub image_ref: Option<String>,
    #[serde(default, alias = "proposals_url", alias = "propuestas_url")]
    pub proposals_url: Option<String>,
}

/// Candidate card fields; everything except the name may be missing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(
        default,
        alias = "year_or_term",
        alias = "anio_carrera",
        alias = "anio"
    )]
    pub year_or_term: Option<String>,
    #[serde(default, alias = "intereses")]
    pub interests: Option<String>,
    #[serde(default, alias = "experiencias", alias = "experiencia")]
    pub experience: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDates {
    #[serde(default, alias = "descripcion")]
    pub description: Option<String>,
    #[serde(
        default,
        alias = "image_ref",
        alias = "imageUrl",
        alias = "imagen_url"
    )]
    pub image_ref: Option<String>,
}

/// Voting rules. Accepts either the full object or a bare list of rule lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RulesRepr")]
pub struct VotingRules {
    pub requirements: Vec<String>,
    pub disqualifiers: Vec<String>,
    pub image_ref: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RulesRepr {
    Lines(Vec<String>),
    Full(RulesObject),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RulesObject {
    #[serde(default, alias = "texto")]
    requirements: Vec<String>,
    #[serde(default, alias = "impedimentos")]
    disqualifiers: Vec<String>,
    #[serde(
        default,
        alias = "image_ref",
        alias = "imageUrl",
        alias = "imagen_url"
    )]
    image_ref: Option<String>,
}

impl From<RulesRepr> for VotingRules {
    fn from(repr: RulesRepr) -> Self {
        match repr {
            RulesRepr::Lines(requirements) => Self {
                requirements,
                ..Self::default()
            },
            RulesRepr::Full(obj) => Self {
                requirements: obj.requirements,
                disqualifiers: obj.disqualifiers,
                image_ref: obj.image_ref,
            },
        }
    }
}

/// Menu taxonomy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSettings {
    /// Main menu entries, in display order
    pub entries: Vec<MenuEntry>,
    pub layout: KeyboardLayout,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            entries: MenuEntry::ALL.to_vec(),
            layout: KeyboardLayout::Inline,
        }
    }
}
