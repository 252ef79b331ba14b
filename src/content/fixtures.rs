//! Shared content fixtures for tests

use super::ContentStore;

pub const SAMPLE_JSON: &str = r#"{
    "careers": [
        {
            "id": "law",
            "name": "Derecho",
            "ballots": [
                {
                    "id": "law-a",
                    "name": "Lista Azul",
                    "imageRef": "https://img.example/law-a.png",
                    "proposalsUrl": "https://propuestas.example/law-a"
                },
                { "id": "law-b", "name": "Lista Verde" }
            ],
            "candidates": [
                {
                    "name": "Ana_María (Presidenta)",
                    "yearOrTerm": "3er año",
                    "interests": "Becas. Transporte!",
                    "experience": "Consejo 2023-2024"
                },
                { "name": "Luis" }
            ]
        },
        {
            "id": "med",
            "name": "Medicina",
            "ballots": [],
            "candidates": []
        },
        {
            "id": "eng",
            "name": "Ingeniería",
            "proposalsUrl": "https://propuestas.example/eng",
            "ballots": [{ "name": "Lista Roja" }]
        }
    ],
    "processDates": {
        "description": "Votación: 12 de mayo",
        "imageRef": "https://img.example/dates.png"
    },
    "votingRules": {
        "requirements": ["Carné vigente", "Estar inscrito"],
        "disqualifiers": ["Sanción disciplinaria"],
        "imageRef": "https://img.example/rules.png"
    },
    "inquiryLink": "https://vida-estudiantil.example/"
}"#;

pub fn sample_store() -> ContentStore {
    ContentStore::from_json(SAMPLE_JSON).expect("sample content is valid")
}

/// Sample content with a document-level proposals link
pub fn store_with_platform_link() -> ContentStore {
    let mut doc = sample_store().document().clone();
    doc.proposals_url = Some("https://plataforma.example/propuestas".to_string());
    ContentStore::from_document(doc).expect("sample content is valid")
}

/// Sample content with nothing optional: no images, no links
pub fn minimal_store() -> ContentStore {
    ContentStore::from_json(
        r#"{
            "careers": [{ "id": "law", "name": "Derecho" }],
            "processDates": {},
            "votingRules": []
        }"#,
    )
    .expect("minimal content is valid")
}
