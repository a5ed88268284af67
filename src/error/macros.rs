//! # 错误处理宏

/// 快速创建资源未找到错误的宏
#[macro_export]
macro_rules! not_found {
    ($msg:expr) => {
        $crate::error::AppError::not_found($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::AppError::not_found(format!($fmt, $($arg)*))
    };
}

/// 快速创建配置错误的宏
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::error::AppError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::AppError::config(format!($fmt, $($arg)*))
    };
}

/// 确保条件成立，否则返回配置错误
#[macro_export]
macro_rules! ensure_config {
    ($cond:expr, $msg:expr) => {
        if !($cond) {
            return Err($crate::config_error!($msg));
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !($cond) {
            return Err($crate::config_error!($fmt, $($arg)*));
        }
    };
}
