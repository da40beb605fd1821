//! Test utilities shared by the executor, lifecycle and HTTP suites
//!
//! `FakeBackend` stands in for Chrome. Its pages behave according to the URL:
//! - contains `hang`: never finishes loading
//! - contains `fail`: navigation error
//! - contains `panic`: panics mid-navigation
//! - contains `redirect`: ends up on `http://final.test/`
//! - `delay=<ms>` anywhere: sleeps that long before completing

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use render_proxy::{
    ExecutorConfig, HeaderMap, HeaderPolicy, LaunchError, LifecycleManager, Navigation,
    NavigationError, RenderBackend, RenderingContext,
};

pub const REDIRECT_TARGET: &str = "http://final.test/";

/// Everything the fake browser observed
#[derive(Debug, Default)]
pub struct Recorder {
    active: AtomicUsize,
    peak: AtomicUsize,
    started: Mutex<Vec<String>>,
    headers_seen: Mutex<Vec<(String, HeaderMap)>>,
    pub contexts_opened: AtomicUsize,
    pub contexts_closed: AtomicUsize,
    pub stop_loading_calls: AtomicUsize,
    pub backend_shut_down: AtomicBool,
}

#[allow(dead_code)]
impl Recorder {
    /// Navigations currently in progress
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Highest number of overlapping navigations seen
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// URLs in the order navigation started
    pub fn started(&self) -> Vec<String> {
        self.started.lock().clone()
    }

    /// Extra headers installed on the page when each navigation started
    pub fn headers_seen(&self) -> Vec<(String, HeaderMap)> {
        self.headers_seen.lock().clone()
    }

    pub fn is_shut_down(&self) -> bool {
        self.backend_shut_down.load(Ordering::SeqCst)
    }
}

struct ActiveGuard(Arc<Recorder>);

impl ActiveGuard {
    fn enter(recorder: &Arc<Recorder>) -> Self {
        let now = recorder.active.fetch_add(1, Ordering::SeqCst) + 1;
        recorder.peak.fetch_max(now, Ordering::SeqCst);
        Self(Arc::clone(recorder))
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct FakeBackend {
    recorder: Arc<Recorder>,
    fail_open_at: Option<usize>,
}

#[allow(dead_code)]
impl FakeBackend {
    pub fn new() -> (Self, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        (
            Self {
                recorder: Arc::clone(&recorder),
                fail_open_at: None,
            },
            recorder,
        )
    }

    /// Make opening the context for `worker_id` fail
    pub fn failing_at(worker_id: usize) -> (Self, Arc<Recorder>) {
        let (mut backend, recorder) = Self::new();
        backend.fail_open_at = Some(worker_id);
        (backend, recorder)
    }
}

impl RenderBackend for FakeBackend {
    type Context = FakePage;

    async fn open_context(&mut self, worker_id: usize) -> Result<FakePage, LaunchError> {
        if self.fail_open_at == Some(worker_id) {
            return Err(LaunchError::Context {
                worker: worker_id,
                message: "target crashed".to_string(),
            });
        }
        self.recorder.contexts_opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakePage {
            recorder: Arc::clone(&self.recorder),
            headers: HeaderMap::new(),
        })
    }

    async fn shutdown(self) {
        self.recorder.backend_shut_down.store(true, Ordering::SeqCst);
    }
}

pub struct FakePage {
    recorder: Arc<Recorder>,
    headers: HeaderMap,
}

impl RenderingContext for FakePage {
    async fn apply_headers(&mut self, headers: &HeaderMap) -> Result<(), NavigationError> {
        // Installed before the hang, like a CDP call that never acknowledges
        self.headers = headers.clone();
        if headers.contains_key("X-Hang") {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<Navigation, NavigationError> {
        self.recorder.started.lock().push(url.to_string());
        self.recorder
            .headers_seen
            .lock()
            .push((url.to_string(), self.headers.clone()));
        let _active = ActiveGuard::enter(&self.recorder);

        if let Some(delay) = delay_of(url) {
            tokio::time::sleep(delay).await;
        }
        if url.contains("hang") {
            std::future::pending::<()>().await;
        }
        if url.contains("panic") {
            panic!("renderer crashed on {url}");
        }
        if url.contains("fail") {
            return Err(NavigationError::new(format!(
                "net::ERR_NAME_NOT_RESOLVED at {url}"
            )));
        }

        let final_url = if url.contains("redirect") {
            REDIRECT_TARGET.to_string()
        } else {
            url.to_string()
        };
        Ok(Navigation {
            status_code: 200,
            final_url,
            content: format!("<html><head></head><body>{url}</body></html>"),
            headers: HeaderMap::from([("content-type".to_string(), "text/html".to_string())]),
        })
    }

    async fn stop_loading(&mut self) {
        self.recorder.stop_loading_calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn close(self) {
        self.recorder.contexts_closed.fetch_add(1, Ordering::SeqCst);
    }
}

fn delay_of(url: &str) -> Option<Duration> {
    let (_, rest) = url.split_once("delay=")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok().map(Duration::from_millis)
}

#[allow(dead_code)]
pub fn executor_config(max_concurrency: usize) -> ExecutorConfig {
    ExecutorConfig {
        max_concurrency,
        navigation_timeout: Duration::from_secs(5),
        header_policy: HeaderPolicy::Reset,
        stats_interval: Duration::from_secs(60),
    }
}

/// Launch an executor over a fresh fake backend
#[allow(dead_code)]
pub async fn launch(config: ExecutorConfig) -> (Arc<LifecycleManager<FakeBackend>>, Arc<Recorder>) {
    let (backend, recorder) = FakeBackend::new();
    let executor = LifecycleManager::launch(backend, &config)
        .await
        .expect("fake backend launches");
    (Arc::new(executor), recorder)
}

/// Poll `condition` until it holds or a second passes
#[allow(dead_code)]
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached within a second");
}

#[allow(dead_code)]
pub fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
