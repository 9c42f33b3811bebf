//! Root lookup from language servers that are already attached.
//!
//! No server communication happens here. The host reports attachments as they
//! occur, and the lookup is a scan over what it reported.

use std::collections::HashMap;
use std::path::PathBuf;

/// Identifies a buffer in the host (an editor buffer number, a tab, ...).
pub type BufferId = u64;

/// What the host knows about one attached server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    pub root_dir: Option<PathBuf>,
    /// Filetypes the server handles. Empty means any.
    pub filetypes: Vec<String>,
}

impl ServerInfo {
    pub fn new(name: impl Into<String>, root_dir: Option<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root_dir,
            filetypes: Vec::new(),
        }
    }

    pub fn with_filetypes(mut self, filetypes: &[&str]) -> Self {
        self.filetypes = filetypes.iter().map(|ft| ft.to_string()).collect();
        self
    }

    fn handles(&self, filetype: &str) -> bool {
        self.filetypes.is_empty() || self.filetypes.iter().any(|ft| ft == filetype)
    }
}

/// Servers attached to each buffer, in attachment order.
#[derive(Debug, Default)]
pub struct AttachedServers {
    by_buffer: HashMap<BufferId, Vec<ServerInfo>>,
}

impl AttachedServers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a server for `buffer`. Re-attaching a server replaces its entry.
    pub fn attach(&mut self, buffer: BufferId, server: ServerInfo) {
        let servers = self.by_buffer.entry(buffer).or_default();
        match servers.iter_mut().find(|s| s.name == server.name) {
            Some(existing) => *existing = server,
            None => servers.push(server),
        }
    }

    pub fn detach(&mut self, buffer: BufferId, name: &str) {
        if let Some(servers) = self.by_buffer.get_mut(&buffer) {
            servers.retain(|s| s.name != name);
            if servers.is_empty() {
                self.by_buffer.remove(&buffer);
            }
        }
    }

    pub fn forget_buffer(&mut self, buffer: BufferId) {
        self.by_buffer.remove(&buffer);
    }

    pub fn servers(&self, buffer: BufferId) -> &[ServerInfo] {
        self.by_buffer.get(&buffer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Root of the first suitable server attached to `buffer`, with the server name.
    ///
    /// A server is suitable if it is not in `ignore`, handles `filetype`, and
    /// reported a root directory.
    pub fn lsp_root(
        &self,
        buffer: BufferId,
        filetype: &str,
        ignore: &[String],
    ) -> Option<(PathBuf, String)> {
        self.servers(buffer)
            .iter()
            .filter(|server| !ignore.iter().any(|name| *name == server.name))
            .filter(|server| server.handles(filetype))
            .find_map(|server| {
                server
                    .root_dir
                    .clone()
                    .map(|root| (root, server.name.clone()))
            })
    }
}
