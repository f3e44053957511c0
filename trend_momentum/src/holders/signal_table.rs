use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::errors::{Result, TrendAnalysisError};

/// Строка CSV, привязанная к ключевому слову
pub trait KeywordRow: DeserializeOwned {
    fn keyword(&self) -> &str;
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceRow {
    pub keyword: String,
    pub rank_today: i64,
    pub rank_7d_ago: i64,
    pub weekly_sales_units: f64,
    pub sales_4w_avg: f64,
}

impl KeywordRow for MarketplaceRow {
    fn keyword(&self) -> &str {
        &self.keyword
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PinterestRow {
    pub keyword: String,
    pub weekly_saves: f64,
    pub saves_4w_avg: f64,
    pub board_count: f64,
    pub boards_4w_avg: f64,
}

impl KeywordRow for PinterestRow {
    fn keyword(&self) -> &str {
        &self.keyword
    }
}

/// Неизменяемый снимок таблицы сигналов: загружается один раз при старте
#[derive(Clone)]
pub struct SignalTable<R> {
    rows: Arc<HashMap<String, R>>,
}

impl<R: KeywordRow> SignalTable<R> {
    pub fn empty() -> Self {
        SignalTable {
            rows: Arc::new(HashMap::new()),
        }
    }

    pub fn from_reader<T: Read>(reader: T) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = HashMap::new();
        for record in csv_reader.deserialize::<R>() {
            let row = record?;
            // При дубликатах побеждает первая строка
            rows.entry(row.keyword().to_string()).or_insert(row);
        }

        Ok(SignalTable {
            rows: Arc::new(rows),
        })
    }

    /// Загружает таблицу из файла. Ошибки чтения не фатальны: таблица остаётся пустой,
    /// и все запросы получают нейтральные значения.
    pub fn load(path: impl AsRef<Path>, label: &str) -> Self {
        let path = path.as_ref();
        let table = std::fs::File::open(path)
            .map_err(|e| TrendAnalysisError::CsvError(csv::Error::from(e)))
            .and_then(Self::from_reader);

        match table {
            Ok(table) => {
                tracing::info!(source = label, rows = table.len(), "Загружена таблица сигналов");
                table
            }
            Err(e) => {
                tracing::error!(source = label, path = %path.display(), "Ошибка загрузки CSV: {}", e);
                Self::empty()
            }
        }
    }

    pub fn get(&self, keyword: &str) -> Option<&R> {
        self.rows.get(keyword)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
