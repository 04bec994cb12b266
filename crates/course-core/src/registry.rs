// course-core/src/registry.rs
//! 索引句柄 - 在查询与重建之间共享已发布的索引
//!
//! 重建在后台完成后整体替换；正在执行的查询继续使用它拿到的旧快照。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;
use crate::error::{CoreError, Result};
use crate::indexer::{build_index_with_progress, SearchIndex};

/// 已发布索引的概况
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub documents: usize,
    pub tokens: usize,
    /// 每次发布 +1，从未构建时为 0
    pub generation: u64,
}

/// 线程安全的索引句柄，克隆后共享同一份索引
#[derive(Clone, Default)]
pub struct IndexHandle {
    inner: Arc<HandleInner>,
}

#[derive(Default)]
struct HandleInner {
    published: RwLock<Option<Arc<SearchIndex>>>,
    /// 同一时间只允许一个构建
    build_lock: Mutex<()>,
    generation: AtomicU64,
}

impl IndexHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前索引快照；尚未构建时返回 `IndexNotReady`
    pub fn snapshot(&self) -> Result<Arc<SearchIndex>> {
        self.current().ok_or(CoreError::IndexNotReady)
    }

    pub fn is_ready(&self) -> bool {
        self.current().is_some()
    }

    fn current(&self) -> Option<Arc<SearchIndex>> {
        self.inner
            .published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 发布新索引
    pub fn publish(&self, index: SearchIndex) -> Arc<SearchIndex> {
        let index = Arc::new(index);
        let mut published = self
            .inner
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *published = Some(Arc::clone(&index));
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("索引已发布，第 {} 代", generation);
        index
    }

    /// 没有索引时构建一次；并发调用只会触发一次构建
    pub fn ensure_built(&self, config: &SiteConfig) -> Arc<SearchIndex> {
        if let Some(index) = self.current() {
            return index;
        }

        let _guard = self
            .inner
            .build_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // 等锁期间可能已经有人构建完成
        if let Some(index) = self.current() {
            return index;
        }

        tracing::info!("索引尚未构建，开始冷启动构建");
        self.build_and_publish(config, |_, _| {})
    }

    /// 全量重建并替换当前索引
    pub fn rebuild(&self, config: &SiteConfig) -> Arc<SearchIndex> {
        self.rebuild_with_progress(config, |_, _| {})
    }

    /// 全量重建（带进度回调）
    pub fn rebuild_with_progress<F>(&self, config: &SiteConfig, progress_callback: F) -> Arc<SearchIndex>
    where
        F: Fn(usize, usize),
    {
        let _guard = self
            .inner
            .build_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.build_and_publish(config, progress_callback)
    }

    fn build_and_publish<F>(&self, config: &SiteConfig, progress_callback: F) -> Arc<SearchIndex>
    where
        F: Fn(usize, usize),
    {
        self.publish(build_index_with_progress(config, progress_callback))
    }

    pub fn stats(&self) -> IndexStats {
        let published = self
            .inner
            .published
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let generation = self.inner.generation.load(Ordering::SeqCst);
        match published.as_ref() {
            Some(index) => IndexStats {
                documents: index.len(),
                tokens: index.token_count(),
                generation,
            },
            None => IndexStats {
                documents: 0,
                tokens: 0,
                generation,
            },
        }
    }
}

impl std::fmt::Debug for IndexHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexHandle").field("stats", &self.stats()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("intro.md"), "OpenGL rendering pipeline basics").unwrap();
        dir
    }

    #[test]
    fn test_not_ready_before_first_build() {
        let handle = IndexHandle::new();
        assert!(!handle.is_ready());
        assert!(matches!(handle.snapshot(), Err(CoreError::IndexNotReady)));
        assert_eq!(
            handle.stats(),
            IndexStats {
                documents: 0,
                tokens: 0,
                generation: 0
            }
        );
    }

    #[test]
    fn test_ensure_built_builds_once() {
        let dir = fixture();
        let config = SiteConfig::with_root(dir.path());
        let handle = IndexHandle::new();

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let handle = handle.clone();
                let config = config.clone();
                thread::spawn(move || handle.ensure_built(&config).len())
            })
            .collect();
        for t in threads {
            assert_eq!(t.join().unwrap(), 1);
        }

        assert!(handle.is_ready());
        assert_eq!(handle.stats().generation, 1);
    }

    #[test]
    fn test_rebuild_leaves_old_snapshot_intact() {
        let dir = fixture();
        let config = SiteConfig::with_root(dir.path());
        let handle = IndexHandle::new();

        handle.ensure_built(&config);
        let old = handle.snapshot().unwrap();

        fs::write(dir.path().join("shaders.md"), "Vertex shader transforms geometry").unwrap();
        handle.rebuild(&config);

        assert_eq!(old.len(), 1);
        assert!(old.posting("shader").is_none());

        let new = handle.snapshot().unwrap();
        assert_eq!(new.len(), 2);
        assert!(new.posting("shader").is_some());
        assert_eq!(handle.stats().generation, 2);
    }

    #[test]
    fn test_rebuild_reports_progress() {
        let dir = fixture();
        let config = SiteConfig::with_root(dir.path());
        let handle = IndexHandle::new();

        let calls = std::cell::RefCell::new(Vec::new());
        handle.rebuild_with_progress(&config, |done, total| calls.borrow_mut().push((done, total)));
        assert_eq!(calls.into_inner(), vec![(1, 1)]);
    }
}
