//! Quickslot Engine - layout inspector.
//!
//! Prints a summary of the stored layout for each owner id given on the
//! command line, restored through the same path the session uses.
//!
//! ```text
//! quickslot-engine Actor.abc123 Actor.def456
//! ```

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quickslot_domain::{ContainerSet, OwnerId};
use quickslot_engine::infrastructure::persistence::FileLayoutStore;
use quickslot_engine::infrastructure::ports::LayoutStore;
use quickslot_engine::infrastructure::settings::{load_dotenv_from_repo_root, PanelSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root before the filter reads RUST_LOG.
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quickslot_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = PanelSettings::from_env();
    let dir = settings.storage_dir();
    tracing::info!(dir = %dir.display(), "Starting Quickslot inspector");
    let store = FileLayoutStore::new(dir);

    let owners: Vec<String> = std::env::args().skip(1).collect();
    if owners.is_empty() {
        tracing::warn!("No owner ids given; nothing to inspect");
        return Ok(());
    }

    for raw in owners {
        let owner = OwnerId::new(raw.as_str()).with_context(|| format!("bad owner id {raw:?}"))?;
        let Some(record) = store
            .load(&owner)
            .await
            .with_context(|| format!("loading layout of {owner}"))?
        else {
            tracing::info!(owner = %owner, "No stored layout");
            continue;
        };

        let restored = record
            .restore(owner.clone(), &settings.layout)
            .with_context(|| format!("restoring layout of {owner}"))?;
        for rejected in &restored.rejected {
            tracing::warn!(
                owner = %owner,
                stable_id = %rejected.stable_id,
                location = %rejected.location,
                reason = %rejected.reason,
                "Entry would be dropped on load"
            );
        }
        summarize(&owner, &restored.set, record.saved_at);
    }

    Ok(())
}

fn summarize(
    owner: &OwnerId,
    set: &ContainerSet,
    saved_at: Option<chrono::DateTime<chrono::Utc>>,
) {
    tracing::info!(
        owner = %owner,
        saved_at = ?saved_at,
        items = set.stable_ids().len(),
        active_weapon_set = set.active_weapon_set(),
        portrait_visible = set.portrait_visible(),
        "Layout"
    );
    for grid in set.grids() {
        tracing::info!(
            grid = %grid.key(),
            size = %format!("{}x{}", grid.cols(), grid.rows()),
            used = grid.len(),
            locked = grid.is_locked(),
            allow_duplicate = grid.allows_duplicates(),
            "Grid"
        );
        for (address, reference) in grid.iter() {
            tracing::debug!(
                grid = %grid.key(),
                address = %address,
                stable_id = %reference.stable_id,
                name = reference.name().unwrap_or("?"),
                "Slot"
            );
        }
    }
}
