use std::path::Path;

use serde::{Deserialize, Serialize};

/// Placeholder art used for prizes whose image is missing.
pub const PLACEHOLDER_PRIZE_ART: &str = "heart";

/// Unique identifier for a selectable character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub String);

impl CharacterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the character catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    pub id: CharacterId,
    pub player_name: String,
    pub image: String,
    #[serde(default)]
    pub prize: Option<String>,
    pub prize_type: String,
}

/// Sizes and rates shared by every round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameSettings {
    /// Edge length of a character sprite (px).
    pub character_size: f32,
    /// Edge length of a prize sprite (px).
    pub prize_size: f32,
    /// Distance moved per frame per held direction (px).
    pub move_speed: f32,
    /// Prizes kept on the canvas per participating prize type.
    pub num_prizes: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            character_size: 200.0,
            prize_size: 50.0,
            move_speed: 10.0,
            num_prizes: 5,
        }
    }
}

#[derive(Debug)]
pub enum CatalogError {
    Io(String),
    Parse(String),
    Empty,
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read catalog: {e}"),
            Self::Parse(e) => write!(f, "failed to parse catalog: {e}"),
            Self::Empty => write!(f, "catalog contains no characters"),
        }
    }
}

impl std::error::Error for CatalogError {}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFile {
    #[serde(default)]
    game_settings: GameSettings,
    characters: Vec<CharacterRecord>,
}

/// Static list of selectable characters, loaded once at startup.
///
/// `available` keeps catalog order and only lists characters whose image
/// loaded. Selection and auto-assignment never look past it.
#[derive(Debug, Clone)]
pub struct Catalog {
    characters: Vec<CharacterRecord>,
    available: Vec<CharacterId>,
    missing_prize_art: Vec<String>,
    settings: GameSettings,
}

impl Catalog {
    /// Build a catalog where every character counts as available.
    pub fn new(characters: Vec<CharacterRecord>, settings: GameSettings) -> Self {
        let available = characters.iter().map(|c| c.id.clone()).collect();
        Self {
            characters,
            available,
            missing_prize_art: Vec::new(),
            settings,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        if file.characters.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self::new(file.characters, file.game_settings))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&contents)
    }

    /// Narrow availability to characters whose image the probe can load, and
    /// switch prizes with a missing image over to the placeholder art.
    pub fn resolve_assets(&mut self, mut image_loads: impl FnMut(&str) -> bool) {
        self.available.clear();
        self.missing_prize_art.clear();
        for record in &self.characters {
            if image_loads(&record.image) {
                self.available.push(record.id.clone());
            } else {
                tracing::warn!(
                    character = %record.id,
                    image = %record.image,
                    "Character image not found, excluding from selection"
                );
            }
            if let Some(prize) = &record.prize
                && !self.missing_prize_art.contains(prize)
                && !image_loads(prize)
            {
                tracing::warn!(prize = %prize, "Prize image not found, using placeholder");
                self.missing_prize_art.push(prize.clone());
            }
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn characters(&self) -> &[CharacterRecord] {
        &self.characters
    }

    pub fn get(&self, id: &CharacterId) -> Option<&CharacterRecord> {
        self.characters.iter().find(|c| &c.id == id)
    }

    /// Characters that may be selected, in catalog order.
    pub fn available(&self) -> &[CharacterId] {
        &self.available
    }

    pub fn is_available(&self, id: &CharacterId) -> bool {
        self.available.contains(id)
    }

    pub fn prize_type(&self, id: &CharacterId) -> Option<&str> {
        self.get(id).map(|c| c.prize_type.as_str())
    }

    pub fn player_name(&self, id: &CharacterId) -> Option<&str> {
        self.get(id).map(|c| c.player_name.as_str())
    }

    /// Art id for this character's prizes: the prize file stem, the prize type
    /// when no file is configured, or the placeholder when the file is missing.
    pub fn prize_art(&self, id: &CharacterId) -> String {
        let Some(record) = self.get(id) else {
            return PLACEHOLDER_PRIZE_ART.to_string();
        };
        match &record.prize {
            Some(file) if self.missing_prize_art.contains(file) => {
                PLACEHOLDER_PRIZE_ART.to_string()
            },
            Some(file) => file
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .unwrap_or(file)
                .to_string(),
            None => record.prize_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_JSON: &str = r#"{
        "gameSettings": { "characterSize": 120, "numPrizes": 3 },
        "characters": [
            { "id": "aria", "playerName": "Aria", "image": "aria.png", "prize": "star.png", "prizeType": "star" },
            { "id": "bo", "playerName": "Bo", "image": "bo.png", "prize": null, "prizeType": "bone" },
            { "id": "cy", "playerName": "Cy", "image": "cy.png", "prize": "moon.png", "prizeType": "moon" }
        ]
    }"#;

    #[test]
    fn parses_camel_case_with_setting_defaults() {
        let catalog = Catalog::from_json(CATALOG_JSON).unwrap();
        assert_eq!(catalog.characters().len(), 3);
        assert_eq!(catalog.settings().character_size, 120.0);
        assert_eq!(catalog.settings().num_prizes, 3);
        // Absent fields fall back to defaults
        assert_eq!(catalog.settings().prize_size, 50.0);
        assert_eq!(catalog.settings().move_speed, 10.0);
        assert_eq!(catalog.player_name(&CharacterId::new("bo")), Some("Bo"));
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let err = Catalog::from_json(r#"{ "characters": [] }"#).unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
    }

    #[test]
    fn malformed_catalog_is_parse_error() {
        let err = Catalog::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn missing_images_narrow_availability() {
        let mut catalog = Catalog::from_json(CATALOG_JSON).unwrap();
        catalog.resolve_assets(|file| file != "bo.png" && file != "moon.png");

        assert_eq!(
            catalog.available(),
            &[CharacterId::new("aria"), CharacterId::new("cy")]
        );
        assert!(!catalog.is_available(&CharacterId::new("bo")));
        // Cy is selectable but its prize art falls back to the placeholder
        assert_eq!(catalog.prize_art(&CharacterId::new("cy")), PLACEHOLDER_PRIZE_ART);
    }

    #[test]
    fn prize_art_uses_file_stem_or_type() {
        let catalog = Catalog::from_json(CATALOG_JSON).unwrap();
        assert_eq!(catalog.prize_art(&CharacterId::new("aria")), "star");
        assert_eq!(catalog.prize_art(&CharacterId::new("bo")), "bone");
        assert_eq!(
            catalog.prize_art(&CharacterId::new("nobody")),
            PLACEHOLDER_PRIZE_ART
        );
    }
}
