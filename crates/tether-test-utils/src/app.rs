//! Bevy test app builders.

use bevy::app::Plugins;
use bevy::prelude::*;

/// Create a minimal test app with only the core plugin.
///
/// Provides `TetherSet` system ordering and `PhysicsConfig` but no host;
/// add `TetherPhysicsPlugin` with the backend under test.
pub fn minimal_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(tether_core::TetherCorePlugin);
    app.finish();
    app.cleanup();
    app
}

/// Create a test app with the core plugin followed by `plugins`.
///
/// Plugins cannot be added once an app is finished, so host plugins go
/// through here rather than onto [`minimal_test_app`].
pub fn test_app_with<M>(plugins: impl Plugins<M>) -> App {
    let mut app = App::new();
    app.add_plugins(tether_core::TetherCorePlugin);
    app.add_plugins(plugins);
    app.finish();
    app.cleanup();
    app
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_app_builds() {
        let app = minimal_test_app();
        assert!(
            app.world()
                .get_resource::<tether_core::config::PhysicsConfig>()
                .is_some()
        );
    }

    struct Marker;

    impl Plugin for Marker {
        fn build(&self, app: &mut App) {
            app.insert_resource(Flag);
        }
    }

    #[derive(Resource)]
    struct Flag;

    #[test]
    fn test_app_with_adds_plugins() {
        let app = test_app_with(Marker);
        assert!(app.world().get_resource::<Flag>().is_some());
    }

    #[test]
    fn minimal_app_can_update() {
        let mut app = minimal_test_app();
        app.update();
        app.update();
    }
}
