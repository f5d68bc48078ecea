//! Chain systems, generic over the physics host resource.

use bevy::prelude::*;

use tether_core::TetherSet;

use crate::components::{Chain, ChainViewer};
use crate::host::ChainHost;

/// Register the chain systems and the release observer for host `H`.
pub fn add_chain_systems<H: ChainHost + Resource>(app: &mut App) {
    app.add_systems(
        Update,
        (chain_init_system::<H>, chain_lod_system::<H>)
            .chain()
            .in_set(TetherSet::Rebuild),
    )
    .add_observer(chain_release_observer::<H>);
}

/// Initial build of chains still waiting for one.
///
/// A chain waits while it has no profile or its owner is not authoritative,
/// and is built on the first frame both hold.
pub fn chain_init_system<H: ChainHost + Resource>(
    mut host: ResMut<H>,
    mut chains: Query<&mut Chain>,
) {
    for mut chain in &mut chains {
        if !chain.pending_build
            || chain.instance.profile().is_none()
            || !chain.instance.is_authoritative()
        {
            continue;
        }
        chain.pending_build = false;
        chain.instance.initialize_from_profile(&mut *host);
    }
}

/// Feed the viewer's distance to each chain's start anchor into its LOD.
///
/// Does nothing unless exactly one [`ChainViewer`] exists.
pub fn chain_lod_system<H: ChainHost + Resource>(
    mut host: ResMut<H>,
    viewers: Query<&Transform, With<ChainViewer>>,
    mut chains: Query<&mut Chain>,
) {
    let Ok(viewer) = viewers.single() else {
        return;
    };
    for mut chain in &mut chains {
        let Some(start) = chain.instance.start_anchor().resolve(&*host) else {
            continue;
        };
        let distance = viewer.translation.distance(start);
        chain.instance.update_lod(&mut *host, distance);
    }
}

/// Release a chain's links and joints when its [`Chain`] is removed or its
/// entity despawned.
pub fn chain_release_observer<H: ChainHost + Resource>(
    remove: On<Remove, Chain>,
    mut host: ResMut<H>,
    mut chains: Query<&mut Chain>,
) {
    let Ok(mut chain) = chains.get_mut(remove.entity) else {
        return;
    };
    chain.instance.clear(&mut *host);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
