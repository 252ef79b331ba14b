//! User-visible strings
//!
//! Every field can be overridden from the `texts` section of the content
//! document; missing fields keep their default.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Texts {
    pub welcome: String,
    pub main_menu_prompt: String,
    pub fallback_prompt: String,
    pub choose_entity_ballots: String,
    pub choose_entity_candidates: String,
    pub choose_another_entity: String,
    pub back_label: String,
    pub not_found: String,
    pub no_ballots: String,
    pub no_candidates: String,

    // Main menu labels (numbered by position when rendered)
    pub label_ballots: String,
    pub label_candidates: String,
    pub label_dates: String,
    pub label_rules: String,
    pub label_inquiry: String,

    pub ballot_prefix: String,
    pub proposals_prefix: String,
    pub dates_default: String,
    pub rules_caption: String,
    pub rules_heading: String,
    pub disqualifiers_heading: String,
    pub inquiry_prefix: String,
    pub interests_label: String,
    pub experience_label: String,
}

impl Default for Texts {
    fn default() -> Self {
        Self {
            welcome: "¡Bienvenido/a al Bot de Elecciones Estudiantiles! Elige una opción 👇"
                .to_string(),
            main_menu_prompt: "Menú principal 👇".to_string(),
            fallback_prompt: "Elige una opción 👇".to_string(),
            choose_entity_ballots: "1.1 Localiza tu carrera:".to_string(),
            choose_entity_candidates: "2.1 Localiza tu carrera:".to_string(),
            choose_another_entity: "¿Ver otra carrera o volver al menú?".to_string(),
            back_label: "⬅️ Menú principal".to_string(),
            not_found: "Carrera no encontrada.".to_string(),
            no_ballots: "Esta carrera no tiene planillas registradas.".to_string(),
            no_candidates: "Esta carrera no tiene candidatos registrados.".to_string(),
            label_ballots: "Planilla por carrera".to_string(),
            label_candidates: "Información de candidatos".to_string(),
            label_dates: "Fechas del proceso".to_string(),
            label_rules: "Reglas para votar".to_string(),
            label_inquiry: "Link de consultas".to_string(),
            ballot_prefix: "Planilla: ".to_string(),
            proposals_prefix: "Conoce las propuestas: ".to_string(),
            dates_default: "Fechas del proceso".to_string(),
            rules_caption: "Reglas para ejercer tu voto".to_string(),
            rules_heading: "Reglas:".to_string(),
            disqualifiers_heading: "No podrás votar si:".to_string(),
            inquiry_prefix: "Más información: ".to_string(),
            interests_label: "Intereses:".to_string(),
            experience_label: "Experiencias:".to_string(),
        }
    }
}
