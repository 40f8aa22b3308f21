pub mod catalog;
pub mod config;
pub mod events;
pub mod game_mode;
pub mod input;
pub mod player;
pub mod prize;
pub mod session;
pub mod simulation;
pub mod store;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::sync::{Arc, Mutex};

    use glam::Vec2;

    use crate::catalog::{Catalog, CharacterId, CharacterRecord, GameSettings};
    use crate::config::SessionConfig;
    use crate::events::UiEvent;
    use crate::session::Session;
    use crate::simulation::{RenderSink, RenderSnapshot};
    use crate::store::SessionState;

    /// Canvas size used by test sessions.
    pub const TEST_CANVAS: Vec2 = Vec2::new(800.0, 600.0);

    fn record(id: &str, prize_type: &str) -> CharacterRecord {
        CharacterRecord {
            id: CharacterId::new(id),
            player_name: id.to_uppercase(),
            image: format!("{id}.png"),
            prize: Some(format!("{prize_type}.png")),
            prize_type: prize_type.to_string(),
        }
    }

    /// Four characters: aria (star), bram (coin), cleo (gem) are available;
    /// dax (star) is in the catalog but its image failed to load.
    pub fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new(
            vec![
                record("aria", "star"),
                record("bram", "coin"),
                record("cleo", "gem"),
                record("dax", "star"),
            ],
            GameSettings::default(),
        );
        catalog.resolve_assets(|file| file != "dax.png");
        catalog
    }

    /// Seeded session over [`sample_catalog`] with default timings.
    pub fn test_session() -> Session {
        test_session_with(SessionConfig::default())
    }

    pub fn test_session_with(config: SessionConfig) -> Session {
        Session::with_seed(sample_catalog(), config, TEST_CANVAS, 42)
    }

    /// Subscribe an observer that keeps every emitted event.
    pub fn record_events(session: &mut Session) -> Arc<Mutex<Vec<UiEvent>>> {
        let events: Arc<Mutex<Vec<UiEvent>>> = Arc::default();
        let sink = Arc::clone(&events);
        session.subscribe(move |_: &SessionState, batch: &[UiEvent]| {
            if let Ok(mut events) = sink.lock() {
                events.extend_from_slice(batch);
            }
        });
        events
    }

    /// Keeps every frame it is handed.
    #[derive(Debug, Default)]
    pub struct RecordingRenderer {
        pub frames: Vec<RenderSnapshot>,
    }

    impl RenderSink for RecordingRenderer {
        fn draw(&mut self, frame: &RenderSnapshot) {
            self.frames.push(frame.clone());
        }
    }

    /// Discards frames.
    #[derive(Debug, Default)]
    pub struct NullRenderer;

    impl RenderSink for NullRenderer {
        fn draw(&mut self, _frame: &RenderSnapshot) {}
    }
}
