#![allow(dead_code)]

pub mod payment_worker;
pub mod redis_container;
