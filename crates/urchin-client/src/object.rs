//! Behavior shared by every remote object proxy.

use urchin_core::config::RepeatDelete;
use urchin_core::{IdMap, OneOrMany, RendererEvent};

use crate::client::Client;
use crate::error::ClientError;
use crate::session::Category;

/// Identity and liveness of one renderer object.
pub struct ObjectHandle {
    client: Client,
    category: Category,
    id: String,
    live: bool,
}

impl ObjectHandle {
    pub(crate) fn new(client: Client, category: Category, id: String) -> Self {
        Self {
            client,
            category,
            id,
            live: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn mark_live(&mut self) {
        self.live = true;
    }

    pub(crate) fn stale(&self) -> ClientError {
        ClientError::StaleObject {
            category: self.category,
            id: self.id.clone(),
        }
    }

    pub(crate) fn ensure_live(&self) -> Result<(), ClientError> {
        if self.live {
            Ok(())
        } else {
            Err(self.stale())
        }
    }

    /// Liveness check, then emit.
    pub(crate) fn emit(&self, event: RendererEvent) -> Result<(), ClientError> {
        self.ensure_live()?;
        self.client.emit(event)
    }

    /// Emit the deletion event and clear liveness. Repeated deletes follow
    /// `objects.repeat_delete`.
    pub(crate) fn delete_with(&mut self, event: RendererEvent) -> Result<(), ClientError> {
        if !self.live {
            match self.client.config().objects.repeat_delete {
                RepeatDelete::Reemit => {
                    tracing::debug!(category = %self.category, id = %self.id, "deleting again");
                }
                RepeatDelete::Skip => {
                    tracing::warn!(category = %self.category, id = %self.id, "already deleted, skipping");
                    return Ok(());
                }
                RepeatDelete::Error => return Err(self.stale()),
            }
        }
        self.client.emit(event)?;
        self.live = false;
        Ok(())
    }
}

impl std::fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectHandle")
            .field("category", &self.category)
            .field("id", &self.id)
            .field("live", &self.live)
            .finish()
    }
}

/// Implemented by every proxy type.
pub trait RemoteObject {
    fn handle(&self) -> &ObjectHandle;
    fn handle_mut(&mut self) -> &mut ObjectHandle;

    fn id(&self) -> &str {
        self.handle().id()
    }

    fn is_live(&self) -> bool {
        self.handle().is_live()
    }
}

/// Which objects a batch call touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub applied: Vec<String>,
    /// Not live; nothing stored or emitted for these.
    pub skipped: Vec<String>,
}

/// Allocate one handle and emit its creation event.
pub(crate) fn create_handle(
    client: &Client,
    category: Category,
    event: impl FnOnce(Vec<String>) -> RendererEvent,
) -> Result<ObjectHandle, ClientError> {
    let id = client.next_id(category);
    client.emit(event(vec![id.clone()]))?;
    tracing::debug!(%category, %id, "created");
    let mut handle = ObjectHandle::new(client.clone(), category, id);
    handle.mark_live();
    Ok(handle)
}

/// Allocate `n` handles and emit one creation event for all of them.
pub(crate) fn create_handles(
    client: &Client,
    category: Category,
    n: usize,
    event: impl FnOnce(Vec<String>) -> RendererEvent,
) -> Result<Vec<ObjectHandle>, ClientError> {
    if n == 0 {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = (0..n).map(|_| client.next_id(category)).collect();
    client.emit(event(ids.clone()))?;
    tracing::debug!(%category, count = n, "created");
    Ok(ids
        .into_iter()
        .map(|id| {
            let mut h = ObjectHandle::new(client.clone(), category, id);
            h.mark_live();
            h
        })
        .collect())
}

/// Sanitize every value, store it on each live object, and emit a single
/// `{id: value}` event. Non-live objects are skipped with a warning.
/// Nothing is stored or emitted if any value fails to sanitize.
pub(crate) fn apply_batch<O, V, T>(
    client: &Client,
    objects: &mut [O],
    values: OneOrMany<V>,
    sanitize: impl Fn(V) -> Result<T, ClientError>,
    store: impl Fn(&mut O, &T),
    event: impl FnOnce(IdMap<T>) -> RendererEvent,
) -> Result<BatchReport, ClientError>
where
    O: RemoteObject,
    V: Clone,
{
    let values = values.for_count(objects.len())?;
    let sanitized = values
        .into_iter()
        .take(objects.len())
        .map(sanitize)
        .collect::<Result<Vec<_>, _>>()?;

    let mut map = IdMap::new();
    let mut report = BatchReport::default();
    for (obj, value) in objects.iter_mut().zip(sanitized) {
        let id = obj.id().to_string();
        if !obj.is_live() {
            tracing::warn!(
                category = %obj.handle().category(),
                %id,
                "object does not exist in the renderer, skipping"
            );
            report.skipped.push(id);
            continue;
        }
        store(obj, &value);
        map.insert(id.clone(), value);
        report.applied.push(id);
    }
    if !map.is_empty() {
        client.emit(event(map))?;
    }
    Ok(report)
}

/// Delete objects with one event. Already-deleted members follow
/// `objects.repeat_delete`, checked before anything is sent.
pub(crate) fn delete_batch<O: RemoteObject>(
    client: &Client,
    objects: &mut [O],
    event: impl FnOnce(Vec<String>) -> RendererEvent,
) -> Result<BatchReport, ClientError> {
    let policy = client.config().objects.repeat_delete;
    let mut report = BatchReport::default();
    for obj in objects.iter() {
        let handle = obj.handle();
        if obj.is_live() {
            report.applied.push(obj.id().to_string());
            continue;
        }
        match policy {
            RepeatDelete::Reemit => {
                tracing::debug!(category = %handle.category, id = %handle.id, "deleting again");
                report.applied.push(obj.id().to_string());
            }
            RepeatDelete::Skip => {
                tracing::warn!(category = %handle.category, id = %handle.id, "already deleted, skipping");
                report.skipped.push(obj.id().to_string());
            }
            RepeatDelete::Error => return Err(handle.stale()),
        }
    }
    if report.applied.is_empty() {
        return Ok(report);
    }
    client.emit(event(report.applied.clone()))?;
    for obj in objects.iter_mut() {
        obj.handle_mut().live = false;
    }
    Ok(report)
}
