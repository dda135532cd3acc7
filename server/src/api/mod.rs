//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单与行项目操作
//! - [`tables`] - 桌台目录与占用状态
//! - [`invoices`] - 发票签发与历史
//! - [`cash_desk`] - 收银场次 (cuadre)
//! - [`discounts`] - 折扣目录 (只读输入)
//! - [`payment_methods`] - 支付方式目录
//! - [`events`] - SSE 变更推送

pub mod cash_desk;
pub mod discounts;
pub mod events;
pub mod health;
pub mod invoices;
pub mod orders;
pub mod payment_methods;
pub mod tables;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
