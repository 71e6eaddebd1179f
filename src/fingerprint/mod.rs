//! 指纹定位核心算法模块
//!
//! 该模块提供：
//! - 信号与参考点数据结构
//! - 加权指纹匹配
//! - 训练路径插值生成参考点
//! - 训练会话状态机

pub mod matcher;
pub mod reference;
pub mod results;
pub mod session;
pub mod signal;
pub mod trainer;

pub use matcher::*;
pub use reference::*;
pub use results::*;
pub use session::*;
pub use signal::*;
pub use trainer::*;
