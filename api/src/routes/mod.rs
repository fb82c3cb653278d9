pub mod feishu;
pub mod health;
pub mod review;
