use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::join_all;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower::limit::ConcurrencyLimit;
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::ImageRef;
use crate::pipeline::{ColorExtractor, Palette};
use crate::source::ImageSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: Uuid,
    pub artwork: ImageRef,
}

impl Track {
    pub fn new(id: Uuid, artwork: ImageRef) -> Self {
        Self { id, artwork }
    }
}

/// A palette tied back to the track it was extracted for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackColors {
    pub track_id: Uuid,
    pub artwork: String,
    pub palette: Palette,
}

#[derive(Default)]
struct Slot {
    generation: u64,
    cancel: CancellationToken,
    applied: Option<TrackColors>,
}

/// Runs extractions for many tracks at once and keeps each display slot
/// showing only the colors of its most recent request.
pub struct TrackColorCoordinator<S> {
    service: ConcurrencyLimit<ColorExtractor<S>>,
    slots: Arc<Mutex<HashMap<Uuid, Slot>>>,
}

impl<S> Clone for TrackColorCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<S> TrackColorCoordinator<S>
where
    S: ImageSource + 'static,
{
    pub fn new(extractor: ColorExtractor<S>, concurrency_limit: usize) -> Self {
        Self {
            service: ConcurrencyLimit::new(extractor, concurrency_limit.max(1)),
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn resolve(&self, track: &Track) -> TrackColors {
        extract_colors(self.service.clone(), track).await
    }

    /// Palettes for every track, in input order.
    pub async fn resolve_all(&self, tracks: &[Track]) -> Vec<TrackColors> {
        join_all(
            tracks
                .iter()
                .map(|track| extract_colors(self.service.clone(), track)),
        )
        .await
    }

    /// Starts extraction for the track now shown in `slot`, superseding any
    /// request still in flight for it. The handle yields `None` when this
    /// request was itself superseded before it could be applied.
    pub fn display(&self, slot: Uuid, track: Track) -> JoinHandle<Option<TrackColors>> {
        let (generation, cancel) = {
            let mut slots = lock(&self.slots);
            let entry = slots.entry(slot).or_default();
            entry.cancel.cancel();
            entry.generation += 1;
            entry.cancel = CancellationToken::new();
            (entry.generation, entry.cancel.clone())
        };

        let service = self.service.clone();
        let slots = Arc::clone(&self.slots);
        tokio::spawn(async move {
            let colors = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Request for track {} in slot {} was superseded", track.id, slot);
                    return None;
                }
                colors = extract_colors(service, &track) => colors,
            };

            let mut slots = lock(&slots);
            match slots.get_mut(&slot) {
                Some(entry) if entry.generation == generation => {
                    entry.applied = Some(colors.clone());
                    Some(colors)
                }
                _ => {
                    tracing::debug!("Discarding stale colors for track {} in slot {}", track.id, slot);
                    None
                }
            }
        })
    }

    /// Latest colors applied to `slot`.
    pub fn current(&self, slot: Uuid) -> Option<TrackColors> {
        lock(&self.slots)
            .get(&slot)
            .and_then(|entry| entry.applied.clone())
    }

    /// Forgets `slot`, cancelling anything in flight for it.
    pub fn clear(&self, slot: Uuid) {
        if let Some(entry) = lock(&self.slots).remove(&slot) {
            entry.cancel.cancel();
        }
    }
}

async fn extract_colors<S>(service: ConcurrencyLimit<ColorExtractor<S>>, track: &Track) -> TrackColors
where
    S: ImageSource + 'static,
{
    let color = match service.oneshot(track.artwork.clone()).await {
        Ok(color) => color,
        Err(never) => match never {},
    };
    TrackColors {
        track_id: track.id,
        artwork: track.artwork.to_string(),
        palette: Palette::generate(color),
    }
}

fn lock(slots: &Mutex<HashMap<Uuid, Slot>>) -> MutexGuard<'_, HashMap<Uuid, Slot>> {
    slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
