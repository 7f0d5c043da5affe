//! SHA-256 fingerprint of the observable world state.

use sha2::{Digest, Sha256};
use tower_defence_world::{query, World};

/// Hashes everything a renderer could observe, in deterministic order.
pub(crate) fn replay_digest(world: &World) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query::tick_index(world).to_le_bytes());
    hasher.update(query::money(world).to_le_bytes());
    hasher.update(query::health(world).to_le_bytes());
    hasher.update([u8::from(query::is_defeated(world))]);

    for monster in query::monster_view(world).iter() {
        hasher.update(monster.kind.get().to_le_bytes());
        for value in [
            monster.position.x,
            monster.position.y,
            monster.health,
            monster.distance,
            monster.speed,
        ] {
            hasher.update(value.to_bits().to_le_bytes());
        }
    }

    for tower in query::tower_view(world).iter() {
        hasher.update(tower.id.get().to_le_bytes());
        hasher.update(tower.kind.get().to_le_bytes());
        hasher.update(tower.cell.column().to_le_bytes());
        hasher.update(tower.cell.row().to_le_bytes());
        hasher.update(tower.level.to_le_bytes());
        hasher.update(tower.angle.to_bits().to_le_bytes());
        hasher.update([u8::from(tower.sticky), u8::from(tower.target.is_some())]);
    }

    for projectile in query::projectile_view(world).iter() {
        hasher.update(projectile.source.get().to_le_bytes());
        for value in [
            projectile.position.x,
            projectile.position.y,
            projectile.angle,
            projectile.travelled,
        ] {
            hasher.update(value.to_bits().to_le_bytes());
        }
    }

    format!("{:x}", hasher.finalize())
}
