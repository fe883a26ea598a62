//! Tiny HTTP server that hands icons to the GNTP server in `httpurl` mode

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::debug;
use warp::Filter;
use warp::http::header::{CONTENT_TYPE, HeaderValue};
use warp::http::{Response, StatusCode};

use crate::icon::Icon;

/// Icons kept available for download
const MAX_ICONS: usize = 16;

#[derive(Debug, Default)]
struct IconStore {
    icons: HashMap<String, Icon>,
    order: VecDeque<String>,
}

impl IconStore {
    fn insert(&mut self, id: String, icon: Icon) {
        if self.icons.insert(id.clone(), icon).is_none() {
            self.order.push_back(id);
        }
        while self.order.len() > MAX_ICONS {
            if let Some(oldest) = self.order.pop_front() {
                self.icons.remove(&oldest);
            }
        }
    }
}

/// Serves registered icons at `http://<addr>/<identifier>`
pub struct ArtworkServer {
    port: u16,
    store: Arc<Mutex<IconStore>>,
    handle: JoinHandle<()>,
}

impl ArtworkServer {
    /// Bind on all interfaces with an ephemeral port and start serving
    pub async fn start() -> std::io::Result<Self> {
        Self::bind("0.0.0.0:0").await
    }

    pub async fn bind(addr: &str) -> std::io::Result<Self> {
        debug!(%addr, "ArtworkServer::bind: called");
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{}: {}", addr, e)))?;
        let store = Arc::new(Mutex::new(IconStore::default()));

        let (bound, server) = warp::serve(routes(store.clone()))
            .try_bind_ephemeral(addr)
            .map_err(std::io::Error::other)?;
        debug!(%bound, "ArtworkServer::bind: listening");
        let handle = tokio::spawn(server);

        Ok(Self {
            port: bound.port(),
            store,
            handle,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Make `icon` downloadable and return its URL on the interface `local_addr` belongs to
    pub fn publish(&self, icon: &Icon, local_addr: SocketAddr) -> String {
        let id = icon.identifier();
        debug!(%id, "ArtworkServer::publish: called");
        if let Ok(mut store) = self.store.lock() {
            store.insert(id.clone(), icon.clone());
        }
        let host = match local_addr {
            SocketAddr::V4(v4) => v4.ip().to_string(),
            SocketAddr::V6(v6) => format!("[{}]", v6.ip()),
        };
        format!("http://{}:{}/{}", host, self.port, id)
    }
}

impl Drop for ArtworkServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// `GET /<id>` and `HEAD /<id>`; anything else falls through to warp's rejections
fn routes(
    store: Arc<Mutex<IconStore>>,
) -> impl Filter<Extract = (Response<Vec<u8>>,), Error = warp::Rejection> + Clone + Send + Sync + 'static {
    warp::get()
        .or(warp::head())
        .unify()
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .map(move |id: String| lookup(&store, &id))
}

fn lookup(store: &Mutex<IconStore>, id: &str) -> Response<Vec<u8>> {
    debug!(%id, "ArtworkServer::lookup: called");
    let icon = store.lock().ok().and_then(|s| s.icons.get(id).cloned());
    match icon {
        Some(icon) => {
            let mime = HeaderValue::from_str(&icon.mime)
                .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
            let mut response = Response::new(icon.data);
            response.headers_mut().insert(CONTENT_TYPE, mime);
            response
        }
        None => {
            let mut response = Response::new(Vec::new());
            *response.status_mut() = StatusCode::NOT_FOUND;
            response
        }
    }
}
