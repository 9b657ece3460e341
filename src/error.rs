use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),

    #[allow(dead_code)]
    #[error("Ошибка отрисовки: {0}")]
    Render(String),
}

impl IndicatorError {
    pub fn service_unavailable<T>(msg: impl Into<String>) -> Result<T> {
        Err(IndicatorError::ServiceUnavailable(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, IndicatorError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! indicator_error {
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::IndicatorError::ServiceUnavailable(format!($($arg)*))
    };
    (render, $($arg:tt)*) => {
        $crate::error::IndicatorError::Render(format!($($arg)*))
    };
}
