use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Потокобезопасный кэш с TTL. Просроченные записи удаляются лениво, при чтении.
#[derive(Clone)]
pub struct TtlCache<V> {
    entries: Arc<Mutex<HashMap<String, (V, Instant)>>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Возвращает копию значения, если запись есть и ещё не истекла
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some((value, inserted_at)) if inserted_at.elapsed() < self.ttl => {
                return Some(value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
            tracing::debug!(key, "Запись кэша истекла и удалена");
        }
        None
    }

    pub async fn set(&self, key: impl Into<String>, value: V) {
        let mut entries = self.entries.lock().await;
        entries.insert(key.into(), (value, Instant::now()));
    }

    pub async fn size(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.len()
    }
}
