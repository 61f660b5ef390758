use std::sync::Arc;

use diagnostics::{log_debug, log_info};
use tokio::sync::{Mutex, broadcast};

use tinytree::{EntryKind, Tree, path as tree_path};

use crate::client::HttpResourceStore;
use crate::config::{ConnectionContext, EngineConfig, FilterSet};
use crate::error::{Error, Result};
use crate::events::{self, ChangeEvent};
use crate::resource_type::ResourceType;
use crate::store::ResourceStore;

/// Options accepted by `write_file`
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    /// Allow creating the file when the path does not resolve
    pub create: bool,
    /// Allow replacing an existing file
    pub overwrite: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            create: true,
            overwrite: true,
        }
    }
}

/// Options accepted by `rename`
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameOptions {
    /// Allow replacing an existing destination
    pub overwrite: bool,
    /// Caller has confirmed a recursive directory rename, which recreates
    /// and deletes every descendant resource remotely
    pub confirmed: bool,
}

struct Connection {
    host: String,
    store: Arc<dyn ResourceStore>,
}

struct State {
    tree: Tree,
    filter: FilterSet,
    conn: Option<Connection>,
}

/// The remote sync engine: presents a flat resource store as a hierarchical,
/// editable virtual filesystem.
///
/// Read-only operations are served from the tree cache (content is fetched
/// on demand); mutating operations issue REST calls first and commit into
/// the cache only after the store confirms them. One mutex serializes every
/// resolve-mutate-commit span, so concurrent callers cannot interleave
/// structural mutations.
pub struct StoreFs {
    state: Mutex<State>,
    events: broadcast::Sender<ChangeEvent>,
    config: EngineConfig,
}

impl StoreFs {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        StoreFs {
            state: Mutex::new(State {
                tree: Tree::new(),
                filter: FilterSet::default(),
                conn: None,
            }),
            events: events::channel(),
            config,
        }
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: ChangeEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.config.read_only {
            Err(Error::NoPermission)
        } else {
            Ok(())
        }
    }

    fn store_of(state: &State) -> Result<Arc<dyn ResourceStore>> {
        state
            .conn
            .as_ref()
            .map(|c| c.store.clone())
            .ok_or_else(|| Error::unavailable("not connected"))
    }

    /// Attach an authenticated connection over HTTP.
    ///
    /// Connecting to a different host discards the cached tree; the host is
    /// expected to call `reload` before serving reads.
    pub async fn connect(&self, ctx: &ConnectionContext) -> Result<()> {
        let store = Arc::new(HttpResourceStore::new(ctx)?);
        self.connect_store(&ctx.host, store).await;
        Ok(())
    }

    /// Seam for alternative store implementations (in-memory, instrumented)
    pub async fn connect_store(&self, host: &str, store: Arc<dyn ResourceStore>) {
        let mut state = self.state.lock().await;
        let switching = state.conn.as_ref().map(|c| c.host != host).unwrap_or(true);
        if switching {
            state.tree.clear();
        }
        state.conn = Some(Connection {
            host: host.to_string(),
            store,
        });
        log_info!("Connected to resource store {host}", host: host);
    }

    pub async fn connected(&self) -> bool {
        self.state.lock().await.conn.is_some()
    }

    pub async fn host(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .conn
            .as_ref()
            .map(|c| c.host.clone())
    }

    /// Replace the allowed-extension filter; takes effect on the next reload
    pub async fn set_filter<I, S>(&self, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.state.lock().await.filter = FilterSet::from_extensions(extensions);
    }

    /// Repopulate the tree from a fresh paginated listing.
    ///
    /// Every page is fetched before the cache is touched, so a failed page
    /// leaves the previous tree intact. Returns the number of entries
    /// inserted after exclusion and filtering.
    pub async fn reload(&self) -> Result<usize> {
        let mut state = self.state.lock().await;
        let store = Self::store_of(&state)?;

        let mut records = Vec::new();
        let mut next_link: Option<String> = None;
        loop {
            let page = store.list_page(next_link.as_deref()).await?;
            records.extend(page.value);
            match page.next_link {
                Some(link) => next_link = Some(link),
                None => break,
            }
        }

        let mut fresh = Tree::new();
        let mut inserted = 0;
        for record in records {
            if self.config.is_reserved(&record.name) {
                log_debug!("Skipping reserved name {name}", name: record.name);
                continue;
            }
            if !state.filter.allows(&record.name) {
                continue;
            }
            if fresh.insert(&record.name, Some(record.id)) {
                inserted += 1;
            }
        }
        state.tree = fresh;
        drop(state);

        self.emit(ChangeEvent::Changed("/".to_string()));
        log_info!("Reloaded {inserted} resources", inserted: inserted);
        Ok(inserted)
    }

    pub async fn stat(&self, path: &str) -> Result<EntryKind> {
        Ok(self.state.lock().await.tree.kind(path)?)
    }

    pub async fn read_dir(&self, path: &str) -> Result<Vec<(String, EntryKind)>> {
        Ok(self.state.lock().await.tree.list(path)?)
    }

    /// Fetch and decode a file's content.
    ///
    /// A file without an identifier is a pending local create; it reads as
    /// empty without any remote call.
    pub async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let state = self.state.lock().await;
        match state.tree.identifier(path)? {
            None => Ok(Vec::new()),
            Some(id) => {
                let store = Self::store_of(&state)?;
                drop(state);
                store.fetch_content(&id).await
            }
        }
    }

    /// Directories are a purely local grouping artifact; nothing is created
    /// remotely until a file is written beneath them.
    pub async fn create_dir(&self, path: &str) -> Result<()> {
        self.ensure_writable()?;
        let mut state = self.state.lock().await;
        state.tree.insert_dir(path)?;
        drop(state);
        self.emit(ChangeEvent::Changed(path.to_string()));
        Ok(())
    }

    pub async fn write_file(&self, path: &str, data: &[u8], options: WriteOptions) -> Result<()> {
        self.ensure_writable()?;
        let mut state = self.state.lock().await;

        let existing = match state.tree.resolve(path) {
            Ok(node_id) => Some(state.tree.node(node_id).kind()),
            Err(tinytree::Error::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };

        match existing {
            Some(EntryKind::Directory) => {
                return Err(tinytree::Error::not_a_file(path).into());
            }
            Some(EntryKind::File) => {
                if !options.overwrite {
                    return Err(tinytree::Error::already_exists(path).into());
                }
                match state.tree.identifier(path)? {
                    Some(id) => {
                        if data.is_empty() {
                            // policy: never clobber remote content with emptiness
                            log_debug!("Ignoring zero-length write to {path}", path: path);
                            return Ok(());
                        }
                        let store = Self::store_of(&state)?;
                        store.update(&id, data).await?;
                    }
                    None => {
                        if !data.is_empty() {
                            let id = Self::create_remote(&state, path, data).await?;
                            state.tree.set_identifier(path, Some(id))?;
                        }
                        // an empty write keeps the local-only placeholder
                    }
                }
            }
            None => {
                if !options.create {
                    return Err(tinytree::Error::not_found(path).into());
                }
                // reject paths routed through a file before any remote call
                state.tree.validate_insert(path)?;
                if data.is_empty() {
                    // local-only placeholder, no remote call
                    state.tree.insert(path, None);
                } else {
                    let id = Self::create_remote(&state, path, data).await?;
                    state.tree.insert(path, Some(id));
                }
            }
        }
        drop(state);
        self.emit(ChangeEvent::Changed(path.to_string()));
        Ok(())
    }

    async fn create_remote(state: &State, path: &str, data: &[u8]) -> Result<String> {
        let store = Self::store_of(state)?;
        let name = remote_name(path);
        let display_name = tree_path::basename(path);
        let resource_type = ResourceType::from_name(&name);
        log_debug!("Creating {name} as {kind}", name: name, kind: resource_type.as_str());
        store.create(&name, display_name, resource_type, data).await
    }

    /// Delete a path.
    ///
    /// Remote-backed files are deleted in the store and the removal is
    /// published before the node is detached. Directories and pending local
    /// creates are detached locally only; descendants of a directory are NOT
    /// deleted remotely.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.ensure_writable()?;
        let mut state = self.state.lock().await;

        let node_id = state.tree.resolve(path)?;
        if let Some(identifier) = state.tree.node(node_id).as_file() {
            if let Some(id) = identifier.clone() {
                let store = Self::store_of(&state)?;
                store.delete(&id).await?;
                // publish finalizes the pending removal; failure surfaces
                // before the local detach
                store.publish(&id).await?;
            }
        }
        state.tree.remove(path)?;
        drop(state);

        self.emit(ChangeEvent::Deleted(path.to_string()));
        Ok(())
    }

    /// Rename a file or directory.
    ///
    /// The store has no rename primitive, so a remote-backed file is
    /// recreated under the new name, the old resource deleted, and the
    /// replacement published, in that order. With `options.overwrite` an
    /// existing destination is displaced first, before the source sequence
    /// runs. A directory rename applies the file sequence to every descendant
    /// file, recreates empty subdirectories, and requires
    /// `options.confirmed`; it is at-least-once and non-atomic, so a
    /// descendant failure leaves earlier descendants renamed.
    pub async fn rename(&self, old: &str, new: &str, options: RenameOptions) -> Result<()> {
        self.ensure_writable()?;
        let mut state = self.state.lock().await;

        let kind = state.tree.kind(old)?;
        if kind.is_dir() && !options.confirmed {
            return Err(Error::confirmation_required(old));
        }
        state.tree.validate_insert(new)?;
        if state.tree.contains(new) && !options.overwrite {
            return Err(tinytree::Error::already_exists(new).into());
        }
        Self::displace_destination(&mut state, new).await?;

        match kind {
            EntryKind::File => {
                self.rename_file(&mut state, old, new).await?;
            }
            EntryKind::Directory => {
                for rel in state.tree.walk_files(old)? {
                    let from = tree_path::join(old, &rel);
                    let to = tree_path::join(new, &rel);
                    self.rename_file(&mut state, &from, &to).await?;
                }
                for rel in state.tree.walk_dirs(old)? {
                    let to = tree_path::join(new, &rel);
                    if !state.tree.contains(&to) {
                        state.tree.insert_dir(&to)?;
                    }
                }
                if !state.tree.contains(new) {
                    state.tree.insert_dir(new)?;
                }
                state.tree.remove(old)?;
            }
        }
        drop(state);

        self.emit(ChangeEvent::Renamed {
            old: old.to_string(),
            new: new.to_string(),
        });
        Ok(())
    }

    /// Remove an existing rename destination before the source sequence runs.
    ///
    /// A remote-backed file is deleted in the store and the deletion
    /// published; its tree entry is detached only after both calls succeed.
    /// Pending local creates and directories have no remote identity of their
    /// own and are detached locally, the same policy as `delete`.
    async fn displace_destination(state: &mut State, new: &str) -> Result<()> {
        if !state.tree.contains(new) {
            return Ok(());
        }
        let identifier = match state.tree.kind(new)? {
            EntryKind::File => state.tree.identifier(new)?,
            EntryKind::Directory => None,
        };
        if let Some(id) = identifier {
            let store = Self::store_of(state)?;
            store.delete(&id).await?;
            store.publish(&id).await?;
        }
        state.tree.remove(new)?;
        Ok(())
    }

    /// Recreate-then-delete emulation of a single file rename.
    ///
    /// The new path is committed as soon as the create succeeds: from that
    /// point the replacement exists remotely, and a failed delete must leave
    /// the old path resolvable as well (both resources then exist until the
    /// host reconciles via reload).
    async fn rename_file(&self, state: &mut State, old: &str, new: &str) -> Result<()> {
        let Some(old_id) = state.tree.identifier(old)? else {
            // pending local create, pure tree move
            state.tree.remove(old)?;
            state.tree.insert(new, None);
            return Ok(());
        };

        let store = Self::store_of(state)?;
        let (content, resource_type) = store.fetch_source(&old_id).await?;
        let name = remote_name(new);
        let display_name = tree_path::basename(new);
        let new_id = store
            .create(&name, display_name, resource_type, &content)
            .await?;
        state.tree.insert(new, Some(new_id.clone()));

        store.delete(&old_id).await?;
        state.tree.remove(old)?;

        store.publish(&new_id).await?;
        Ok(())
    }

    /// Publish the resource backing `path`, finalizing any staged change.
    ///
    /// Best-effort for save flows; hosts may ignore the error here but must
    /// not for delete/rename, where publish is part of the sequence.
    pub async fn publish_path(&self, path: &str) -> Result<()> {
        let state = self.state.lock().await;
        match state.tree.identifier(path)? {
            Some(id) => {
                let store = Self::store_of(&state)?;
                drop(state);
                store.publish(&id).await
            }
            None => Err(Error::unavailable("resource has not been saved remotely")),
        }
    }
}

impl Default for StoreFs {
    fn default() -> Self {
        Self::new()
    }
}

/// Remote name of a path: the slash-joined segments without a leading slash
fn remote_name(path: &str) -> String {
    tree_path::segments(path).join("/")
}
