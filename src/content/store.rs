//! Read-only content snapshot

use super::document::{ContentDocument, Entity, MenuSettings};
use super::texts::Texts;
use crate::menu::MenuCatalog;
use crate::state_machine::Flow;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Telegram rejects callback data longer than this many bytes.
pub const MAX_CALLBACK_DATA_BYTES: usize = 64;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Failed to read content file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed content document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Content document has no careers or faculties")]
    NoEntities,
    #[error("Entity at position {0} has an empty id")]
    EmptyId(usize),
    #[error("Entity id contains ':': {0}")]
    IdWithColon(String),
    #[error("Duplicate entity id: {0}")]
    DuplicateId(String),
    #[error("Entity {0} has a blank name")]
    BlankName(String),
    #[error("Entity {0} groups nested careers; list careers at the top level")]
    NestedCareers(String),
    #[error("Entity name {0:?} is also a menu word and could not be typed to select it")]
    NameShadowsMenu(String),
    #[error("Entity {entity} has a ballot with a blank name")]
    BlankBallotName { entity: String },
    #[error("Entity {entity} has a candidate with a blank name")]
    BlankCandidateName { entity: String },
    #[error("Entity id too long for a callback token: {0}")]
    IdTooLong(String),
    #[error("Main menu has no entries")]
    EmptyMenu,
    #[error("Duplicate main menu entry: {0}")]
    DuplicateMenuEntry(String),
}

/// Borrowed `{id, name}` pair for building selection menus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySummary<'a> {
    pub id: &'a str,
    pub name: &'a str,
}

/// Immutable, validated content document. Shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ContentStore {
    document: ContentDocument,
}

impl ContentStore {
    /// Read and validate the content file. Failure is a startup error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.display(),
            entities = store.entities().len(),
            "Content loaded"
        );
        Ok(store)
    }

    pub fn from_json(raw: &str) -> Result<Self, ContentError> {
        let document: ContentDocument = serde_json::from_str(raw)?;
        Self::from_document(document)
    }

    pub fn from_document(document: ContentDocument) -> Result<Self, ContentError> {
        validate(&document)?;
        let store = Self { document };

        // Typed text is matched against menu words before entity names
        let catalog = MenuCatalog::new(&store);
        if let Some(entity) = store
            .entities()
            .iter()
            .find(|e| catalog.action_for_text(&e.name).is_some())
        {
            return Err(ContentError::NameShadowsMenu(entity.name.clone()));
        }

        Ok(store)
    }

    pub fn document(&self) -> &ContentDocument {
        &self.document
    }

    pub fn entities(&self) -> &[Entity] {
        &self.document.careers
    }

    pub fn texts(&self) -> &Texts {
        &self.document.texts
    }

    pub fn menu_settings(&self) -> &MenuSettings {
        &self.document.menu
    }

    pub fn find_entity_by_id(&self, id: &str) -> Option<&Entity> {
        self.document.careers.iter().find(|e| e.id == id)
    }

    /// Case-insensitive match on the display name, ignoring surrounding whitespace
    pub fn find_entity_by_name(&self, name: &str) -> Option<&Entity> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.document
            .careers
            .iter()
            .find(|e| e.name.trim().to_lowercase() == wanted)
    }

    /// Entities in declared order
    pub fn main_menu_entries(&self) -> Vec<EntitySummary<'_>> {
        self.document
            .careers
            .iter()
            .map(|e| EntitySummary {
                id: &e.id,
                name: &e.name,
            })
            .collect()
    }
}

fn validate(document: &ContentDocument) -> Result<(), ContentError> {
    if document.careers.is_empty() {
        return Err(ContentError::NoEntities);
    }

    let longest_prefix = [Flow::Ballots, Flow::Candidates]
        .iter()
        .map(|f| f.token_prefix().len() + 1)
        .max()
        .unwrap_or(0);

    let mut seen = HashSet::new();
    for (index, entity) in document.careers.iter().enumerate() {
        if entity.id.is_empty() {
            return Err(ContentError::EmptyId(index));
        }
        if entity.id.contains(':') {
            return Err(ContentError::IdWithColon(entity.id.clone()));
        }
        if longest_prefix + entity.id.len() > MAX_CALLBACK_DATA_BYTES {
            return Err(ContentError::IdTooLong(entity.id.clone()));
        }
        if !seen.insert(entity.id.as_str()) {
            return Err(ContentError::DuplicateId(entity.id.clone()));
        }
        if entity.name.trim().is_empty() {
            return Err(ContentError::BlankName(entity.id.clone()));
        }
        if !entity.careers.is_empty() {
            return Err(ContentError::NestedCareers(entity.id.clone()));
        }
        if entity.ballots.iter().any(|b| b.name.trim().is_empty()) {
            return Err(ContentError::BlankBallotName {
                entity: entity.id.clone(),
            });
        }
        if entity.candidates.iter().any(|c| c.name.trim().is_empty()) {
            return Err(ContentError::BlankCandidateName {
                entity: entity.id.clone(),
            });
        }
    }

    let entries = &document.menu.entries;
    if entries.is_empty() {
        return Err(ContentError::EmptyMenu);
    }
    let mut seen_entries = HashSet::new();
    for entry in entries {
        if !seen_entries.insert(*entry) {
            return Err(ContentError::DuplicateMenuEntry(entry.token().to_string()));
        }
    }

    Ok(())
}
