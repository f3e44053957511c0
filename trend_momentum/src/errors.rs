// errors.rs
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinError;

#[derive(Error, Debug)]
pub enum TrendAnalysisError {
    #[error("Ошибка HTTP запроса: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Превышено время ожидания трендов: {0:?}")]
    Timeout(Duration),

    #[error("Ошибка выполнения задачи: {0}")]
    TaskError(#[from] JoinError),

    #[error("Ошибка парсинга JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Некорректный ответ источника трендов: {0}")]
    ProtocolError(String),

    #[error("Ошибка чтения CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Некорректная конфигурация: {0}")]
    InvalidConfig(String),

    #[error("Не указан параметр keyword")]
    MissingKeyword,

    #[error("Ключевое слово не поддерживается: {0}")]
    UnsupportedKeyword(String),
}

/// Грубая классификация ошибок для логов и ответов API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Protocol,
    Configuration,
}

impl TrendAnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HttpError(_) | Self::Timeout(_) | Self::TaskError(_) => ErrorKind::Transport,
            Self::JsonError(_) | Self::ProtocolError(_) | Self::CsvError(_) => ErrorKind::Protocol,
            Self::InvalidConfig(_) | Self::MissingKeyword | Self::UnsupportedKeyword(_) => {
                ErrorKind::Configuration
            }
        }
    }
}

// Псевдоним Result с фиксированным типом ошибки
pub type Result<T> = std::result::Result<T, TrendAnalysisError>;
